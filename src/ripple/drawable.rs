use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Instant;

use super::{RippleBackground, RippleForeground, RADIUS_AUTO};
use crate::animation::{FrameClock, SystemClock};
use crate::canvas::{BlendMode, Canvas, ColorFilter, MaskBuffer, MaskCanvas, Paint, Shader};
use crate::color::{Color, ColorStateList};
use crate::config::RenderConfig;
use crate::density::{scale_size_from_density, DENSITY_DEFAULT};
use crate::drawable::{
    ChildLayer, ConstantState, Drawable, DrawableBase, DrawableCallback, LayerDrawable, LayerId,
    LayerState,
};
use crate::error::Result;
use crate::geometry::Rect;
use crate::state::{ConfigChanges, LayoutDirection, Opacity, StateSet};
use crate::theme::{Theme, ThemeAttr};

/// What the ripple is masked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskType {
    /// Clipping to the bounds is enough.
    None,
    /// The non-mask layers act as the mask.
    Content,
    /// The layer with [`LayerId::MASK`] is the mask.
    Explicit,
}

#[derive(Debug, Clone)]
pub struct RippleState {
    pub layers: Rc<LayerState>,
    pub color: ColorStateList,
    /// Pixels, or [`RADIUS_AUTO`] to cover the hotspot bounds
    pub max_radius: i32,
    pub color_attr: Option<ThemeAttr>,
    pub radius_attr: Option<ThemeAttr>,
    pub density: u32,
    pub config: RenderConfig,
    pub clock: Rc<dyn FrameClock>,
}

impl Default for RippleState {
    fn default() -> Self {
        Self {
            layers: Rc::new(LayerState::default()),
            color: ColorStateList::value_of(Color::MAGENTA),
            max_radius: RADIUS_AUTO,
            color_attr: None,
            radius_attr: None,
            density: DENSITY_DEFAULT,
            config: RenderConfig::default(),
            clock: Rc::new(SystemClock),
        }
    }
}

impl ConstantState for RippleState {
    fn new_drawable(self: Rc<Self>) -> Box<dyn Drawable> {
        Box::new(RippleDrawable::from_state(self))
    }

    fn changing_configurations(&self) -> ConfigChanges {
        let mut changes = self.layers.changing_configurations();
        if self.color_attr.is_some() || self.radius_attr.is_some() {
            changes |= ConfigChanges::THEME;
        }
        if self.max_radius != RADIUS_AUTO {
            changes |= ConfigChanges::DENSITY;
        }
        changes
    }

    fn can_apply_theme(&self) -> bool {
        self.color_attr.is_some() || self.radius_attr.is_some() || self.layers.can_apply_theme()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Callback the layers invalidate through. Records that the content changed
/// so the mask is rebuilt, then forwards to the host.
#[derive(Default)]
struct ContentWatcher {
    host: RefCell<Option<Weak<dyn DrawableCallback>>>,
    changed: Cell<bool>,
}

impl ContentWatcher {
    fn take_changed(&self) -> bool {
        self.changed.replace(false)
    }
}

impl DrawableCallback for ContentWatcher {
    fn invalidate_drawable(&self) {
        self.changed.set(true);
        let host = self.host.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(host) = host {
            host.invalidate_drawable();
        }
    }
}

impl fmt::Debug for ContentWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentWatcher")
            .field("changed", &self.changed.get())
            .field("has_host", &self.host.borrow().is_some())
            .finish()
    }
}

/// Layers with touch feedback on top.
///
/// Pressing (enabled and pressed) starts a [`RippleForeground`] at the
/// hotspot; releasing moves it to the exiting pool where it fades out.
/// Focus and hover show a [`RippleBackground`] glow. Both are drawn after
/// the content layers, masked by the explicit mask layer or the content
/// itself when either is not opaque. A drawable without layers is
/// unbounded and projects its ripple past its own bounds.
#[derive(Debug)]
pub struct RippleDrawable {
    base: DrawableBase,
    state: Rc<RippleState>,
    layers: LayerDrawable,
    content: Rc<ContentWatcher>,
    hotspot_bounds: Rect,
    override_bounds: bool,
    pending: Option<(f32, f32)>,
    ripple: Option<RippleForeground>,
    ripple_active: bool,
    exiting: Vec<RippleForeground>,
    background: Option<RippleBackground>,
    mask: Option<Arc<MaskBuffer>>,
    has_valid_mask: bool,
    ripple_paint: Paint,
    drawing_bounds: Rect,
    mutated: bool,
}

impl RippleDrawable {
    /// A ripple over optional content, masked by an optional mask layer.
    pub fn new(
        color: ColorStateList,
        content: Option<Box<dyn Drawable>>,
        mask: Option<Box<dyn Drawable>>,
    ) -> Self {
        let mut layers = Vec::new();
        if let Some(content) = content {
            layers.push(ChildLayer::boxed(content));
        }
        if let Some(mask) = mask {
            layers.push(ChildLayer::boxed(mask).with_id(LayerId::MASK));
        }
        Self::with_layers(color, layers)
    }

    /// A ripple over an arbitrary layer stack. A layer with
    /// [`LayerId::MASK`] is the mask and is never drawn as content.
    pub fn with_layers(color: ColorStateList, layers: Vec<ChildLayer>) -> Self {
        let layers = LayerDrawable::new(layers);
        let state = RippleState {
            layers: layers.layer_state().clone(),
            color,
            ..RippleState::default()
        };
        Self::assemble(Rc::new(state), layers)
    }

    /// A ripple whose color comes from [`ThemeAttr::COLOR_CONTROL_HIGHLIGHT`]
    /// and whose radius may come from [`ThemeAttr::RIPPLE_RADIUS`].
    pub fn themed(content: Option<Box<dyn Drawable>>, mask: Option<Box<dyn Drawable>>) -> Self {
        let mut drawable = Self::new(ColorStateList::value_of(Color::MAGENTA), content, mask);
        let state = Rc::make_mut(&mut drawable.state);
        state.color_attr = Some(ThemeAttr::COLOR_CONTROL_HIGHLIGHT);
        state.radius_attr = Some(ThemeAttr::RIPPLE_RADIUS);
        drawable
    }

    pub fn from_state(state: Rc<RippleState>) -> Self {
        let layers = LayerDrawable::from_state(state.layers.clone());
        Self::assemble(state, layers)
    }

    fn assemble(state: Rc<RippleState>, layers: LayerDrawable) -> Self {
        let mut drawable = Self {
            base: DrawableBase::new(),
            state,
            layers,
            content: Rc::new(ContentWatcher::default()),
            hotspot_bounds: Rect::EMPTY,
            override_bounds: false,
            pending: None,
            ripple: None,
            ripple_active: false,
            exiting: Vec::new(),
            background: None,
            mask: None,
            has_valid_mask: false,
            ripple_paint: Paint::default(),
            drawing_bounds: Rect::EMPTY,
            mutated: false,
        };
        let watcher: Weak<dyn DrawableCallback> = Rc::downgrade(&drawable.content) as Weak<ContentWatcher>;
        drawable.layers.set_callback(Some(watcher));
        drawable.sync_layer_state();
        drawable
    }

    /// Adopt rendering options. Pixel radii are rescaled to the new density.
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        Rc::make_mut(&mut self.state).config = config;
        self.set_density(config.density_dpi);
        self
    }

    pub fn with_clock(mut self, clock: Rc<dyn FrameClock>) -> Self {
        Rc::make_mut(&mut self.state).clock = clock;
        self
    }

    pub fn ripple_state(&self) -> &Rc<RippleState> {
        &self.state
    }

    pub fn config(&self) -> &RenderConfig {
        &self.state.config
    }

    fn now(&self) -> Instant {
        self.state.clock.now()
    }

    /// Ask the host to redraw. Content changes pass `invalidate_mask` so the
    /// mask is rebuilt on the next draw; animation frames do not.
    fn invalidate(&mut self, invalidate_mask: bool) {
        if invalidate_mask {
            self.has_valid_mask = false;
        }
        self.base.invalidate();
    }

    fn sync_layer_state(&mut self) {
        if !Rc::ptr_eq(&self.state.layers, self.layers.layer_state()) {
            Rc::make_mut(&mut self.state).layers = self.layers.layer_state().clone();
        }
    }

    pub fn set_color(&mut self, color: ColorStateList) {
        let state = Rc::make_mut(&mut self.state);
        state.color = color;
        state.color_attr = None;
        self.invalidate(false);
    }

    pub fn color(&self) -> &ColorStateList {
        &self.state.color
    }

    /// Pin the ripple radius in pixels, or pass [`RADIUS_AUTO`].
    /// Ripples that already started keep their radius.
    pub fn set_radius(&mut self, radius: i32) {
        let state = Rc::make_mut(&mut self.state);
        state.max_radius = radius;
        state.radius_attr = None;
        self.invalidate(false);
    }

    pub fn radius(&self) -> i32 {
        self.state.max_radius
    }

    pub fn layer_drawable(&self) -> &LayerDrawable {
        &self.layers
    }

    pub fn number_of_layers(&self) -> usize {
        self.layers.number_of_layers()
    }

    pub fn find_drawable_by_layer_id(&self, id: LayerId) -> Option<&dyn Drawable> {
        self.layers.find_drawable_by_layer_id(id)
    }

    /// Changes made through the returned drawable invalidate the mask.
    pub fn find_drawable_by_layer_id_mut(&mut self, id: LayerId) -> Option<&mut dyn Drawable> {
        self.layers.find_drawable_by_layer_id_mut(id)
    }

    /// Replace a layer's drawable; the mask is rebuilt on the next draw.
    /// Returns false if there is no layer with `id`.
    pub fn set_drawable_by_layer_id(&mut self, id: LayerId, drawable: Box<dyn Drawable>) -> bool {
        if !self.layers.set_drawable_by_layer_id(id, drawable) {
            return false;
        }
        self.sync_layer_state();
        self.invalidate(true);
        true
    }

    fn is_bounded(&self) -> bool {
        self.layers.number_of_layers() > 0
    }

    /// Whether the host must draw this ripple outside the drawable's bounds.
    pub fn is_projected(&self) -> bool {
        if self.is_bounded() {
            return false;
        }
        let radius = self.state.max_radius;
        let bounds = self.bounds();
        let hotspot = self.hotspot_bounds;
        let contained = radius != RADIUS_AUTO
            && radius as f32 <= (hotspot.width / 2.0).trunc()
            && radius as f32 <= (hotspot.height / 2.0).trunc()
            && (bounds == hotspot || bounds.contains_rect(&hotspot));
        !contained
    }

    pub fn is_ripple_active(&self) -> bool {
        self.ripple_active
    }

    pub fn active_ripple(&self) -> Option<&RippleForeground> {
        self.ripple.as_ref()
    }

    pub fn exiting_ripples(&self) -> &[RippleForeground] {
        &self.exiting
    }

    pub fn exiting_ripple_count(&self) -> usize {
        self.exiting.len()
    }

    pub fn background(&self) -> Option<&RippleBackground> {
        self.background.as_ref()
    }

    /// The last mask rendered, if masking was needed.
    pub fn mask_buffer(&self) -> Option<&Arc<MaskBuffer>> {
        self.mask.as_ref()
    }

    /// Paint the ripples were last drawn with.
    pub fn ripple_paint(&self) -> &Paint {
        &self.ripple_paint
    }

    /// Whether another frame is needed to advance an animation.
    pub fn is_animating(&self) -> bool {
        self.is_animating_at(self.now())
    }

    fn is_animating_at(&self, now: Instant) -> bool {
        self.ripple.as_ref().is_some_and(|r| r.is_animating(now))
            || self
                .exiting
                .iter()
                .any(|r| !r.has_finished_exit(now) || r.is_animating(now))
            || self.background.as_ref().is_some_and(|b| b.is_animating(now))
    }

    fn set_ripple_active(&mut self, active: bool) {
        if self.ripple_active != active {
            self.ripple_active = active;
            if active {
                self.try_ripple_enter();
            } else {
                self.try_ripple_exit();
            }
        }
    }

    fn set_background_active(&mut self, focused: bool, hovered: bool, pressed: bool) {
        if self.background.is_none() && (focused || hovered) {
            self.background = Some(RippleBackground::new(
                self.hotspot_bounds,
                self.state.max_radius,
                self.state.density,
            ));
        }
        let now = self.now();
        let (max_radius, density) = (self.state.max_radius, self.state.density);
        if let Some(background) = self.background.as_mut() {
            background.setup(max_radius, density);
            background.set_state(focused, hovered, pressed, now);
        }
    }

    fn try_ripple_enter(&mut self) {
        let limit = self.state.config.ripple_limit();
        if self.exiting.len() >= limit {
            log::debug!("Dropping ripple enter, {} ripples still exiting", self.exiting.len());
            return;
        }
        let now = self.now();
        if self.ripple.is_none() {
            let (x, y) = self
                .pending
                .take()
                .unwrap_or_else(|| self.hotspot_bounds.center());
            self.ripple = Some(RippleForeground::new(
                self.hotspot_bounds,
                x,
                y,
                self.state.max_radius,
                self.state.density,
                self.state.config.force_software,
            ));
        }
        if let Some(ripple) = self.ripple.as_mut() {
            ripple.enter(now);
        }
        self.invalidate(false);
    }

    fn try_ripple_exit(&mut self) {
        let now = self.now();
        if let Some(mut ripple) = self.ripple.take() {
            ripple.exit(&self.ripple_paint, now);
            self.exiting.push(ripple);
        }
        self.invalidate(false);
    }

    /// End every ripple and fade out the background.
    fn clear_hotspots(&mut self) {
        if let Some(mut ripple) = self.ripple.take() {
            ripple.end();
            self.ripple_active = false;
        }
        let now = self.now();
        if let Some(background) = self.background.as_mut() {
            background.set_state(false, false, false, now);
            background.jump_to_final();
        }
        self.cancel_exiting_ripples();
    }

    fn cancel_exiting_ripples(&mut self) {
        for ripple in &mut self.exiting {
            ripple.end();
        }
        self.exiting.clear();
        self.invalidate(false);
    }

    /// Drop exiting ripples that have faded out, keeping the rest in order.
    fn prune_ripples(&mut self, now: Instant) {
        let before = self.exiting.len();
        self.exiting.retain(|ripple| !ripple.has_finished_exit(now));
        if self.exiting.len() != before {
            log::trace!("Pruned {} finished ripple(s)", before - self.exiting.len());
        }
    }

    fn on_hotspot_bounds_changed(&mut self) {
        let bounds = self.hotspot_bounds;
        for ripple in &mut self.exiting {
            ripple.on_bounds_change(bounds);
        }
        if let Some(ripple) = self.ripple.as_mut() {
            ripple.on_bounds_change(bounds);
        }
        if let Some(background) = self.background.as_mut() {
            background.on_bounds_change(bounds);
        }
    }

    /// The mask needed right now, or `None` while nothing is visible.
    fn resolve_mask_type(&self, now: Instant) -> Option<MaskType> {
        let background_visible = self.background.as_ref().is_some_and(|b| b.is_visible(now));
        if self.ripple.is_none() && self.exiting.is_empty() && !background_visible {
            return None;
        }
        if let Some(mask) = self.layers.find_drawable_by_layer_id(LayerId::MASK) {
            return Some(if mask.opacity() == Opacity::Opaque {
                MaskType::None
            } else {
                MaskType::Explicit
            });
        }
        let translucent = self
            .layers
            .layers()
            .any(|(_, drawable)| drawable.opacity() != Opacity::Opaque);
        Some(if translucent {
            MaskType::Content
        } else {
            MaskType::None
        })
    }

    /// How ripples would be masked if drawn now. Idle drawables report
    /// [`MaskType::None`].
    pub fn mask_type(&self) -> MaskType {
        self.resolve_mask_type(self.now()).unwrap_or(MaskType::None)
    }

    fn update_mask_if_needed(&mut self, now: Instant) {
        if self.content.take_changed() {
            self.has_valid_mask = false;
        }
        if self.has_valid_mask {
            return;
        }
        let Some(mask_type) = self.resolve_mask_type(now) else {
            return;
        };
        self.has_valid_mask = true;

        let bounds = self.bounds();
        // The paint holds the only other handle on the buffer.
        self.ripple_paint.shader = None;
        if mask_type == MaskType::None || bounds.is_empty() {
            self.mask = None;
            return;
        }

        let width = bounds.width.ceil() as u32;
        let height = bounds.height.ceil() as u32;
        let mut buffer = match self.mask.take() {
            Some(buffer) if buffer.width() == width && buffer.height() == height => buffer,
            _ => Arc::new(MaskBuffer::new(width, height)),
        };
        let pixels = Arc::make_mut(&mut buffer);
        pixels.clear();
        let mut canvas = MaskCanvas::new(pixels);
        canvas.translate(-bounds.left(), -bounds.top());
        match mask_type {
            MaskType::Explicit => {
                if let Some(mask) = self.layers.find_drawable_by_layer_id_mut(LayerId::MASK) {
                    mask.draw(&mut canvas);
                }
            }
            MaskType::Content => {
                self.layers
                    .draw_filtered(&mut canvas, |id| id != Some(LayerId::MASK));
            }
            MaskType::None => {}
        }
        log::debug!("Rebuilt {:?} ripple mask ({}x{})", mask_type, width, height);
        self.mask = Some(buffer);
    }

    /// Build the paint for the current state. `(cx, cy)` is the hotspot
    /// center the canvas is translated to.
    fn update_ripple_paint(&mut self, cx: f32, cy: f32) {
        let color = self.state.color.color_for_state(self.base.state(), Color::BLACK);
        // Ripple and background together reach the color's full alpha.
        let half_alpha = color.alpha() / 2;
        let mut paint = Paint::new(color.with_alpha(half_alpha));
        if let Some(buffer) = &self.mask {
            let bounds = self.bounds();
            paint.color = Color::BLACK.with_alpha(half_alpha);
            paint.color_filter = Some(ColorFilter::PorterDuff {
                color: color.with_alpha(255),
                mode: BlendMode::SrcIn,
            });
            paint.shader = Some(Shader::Mask {
                buffer: buffer.clone(),
                offset: (bounds.left() - cx, bounds.top() - cy),
            });
        }
        self.ripple_paint = paint;
    }

    fn draw_background_and_ripples(&mut self, canvas: &mut dyn Canvas, now: Instant) {
        let background_visible = self.background.as_ref().is_some_and(|b| b.is_visible(now));
        if self.ripple.is_none() && self.exiting.is_empty() && !background_visible {
            return;
        }

        let (x, y) = self.hotspot_bounds.center();
        canvas.translate(x, y);
        self.update_mask_if_needed(now);
        self.update_ripple_paint(x, y);

        if background_visible {
            if let Some(background) = self.background.as_mut() {
                background.draw(canvas, &self.ripple_paint, now);
            }
        }
        for ripple in &mut self.exiting {
            ripple.draw(canvas, &self.ripple_paint, now);
        }
        if let Some(ripple) = self.ripple.as_mut() {
            ripple.draw(canvas, &self.ripple_paint, now);
        }
        canvas.translate(-x, -y);
    }
}

impl Drawable for RippleDrawable {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn draw(&mut self, canvas: &mut dyn Canvas) {
        let now = self.now();
        self.prune_ripples(now);

        let count = canvas.save();
        if self.is_bounded() {
            canvas.clip_rect(self.bounds());
        }
        self.layers
            .draw_filtered(canvas, |id| id != Some(LayerId::MASK));
        self.draw_background_and_ripples(canvas, now);
        canvas.restore_to_count(count);

        if self.is_animating_at(now) {
            self.invalidate(false);
        }
    }

    fn opacity(&self) -> Opacity {
        Opacity::Translucent
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.layers.set_alpha(alpha);
        self.has_valid_mask = false;
    }

    fn alpha(&self) -> u8 {
        self.layers.alpha()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_bounds_change(&mut self, bounds: Rect) {
        self.layers.set_bounds(bounds);
        if !self.override_bounds {
            self.hotspot_bounds = bounds;
            self.on_hotspot_bounds_changed();
        }
        self.invalidate(true);
    }

    fn on_state_change(&mut self, state: StateSet) -> bool {
        let changed = self.layers.set_state(state);
        if changed {
            self.has_valid_mask = false;
        }
        let enabled = state.contains(StateSet::ENABLED);
        let pressed = state.contains(StateSet::PRESSED);
        let focused = state.contains(StateSet::FOCUSED);
        let hovered = state.contains(StateSet::HOVERED);

        let was_active = self.ripple_active;
        self.set_ripple_active(enabled && pressed);
        self.set_background_active(focused, hovered, pressed);
        changed
            || was_active != self.ripple_active
            || self.background.is_some()
            || self.state.color.is_stateful()
    }

    fn on_level_change(&mut self, level: i32) -> bool {
        let changed = self.layers.set_level(level);
        if changed {
            self.invalidate(true);
        }
        changed
    }

    fn on_layout_direction_changed(&mut self, direction: LayoutDirection) -> bool {
        self.layers.set_layout_direction(direction)
    }

    fn set_visible(&mut self, visible: bool, restart: bool) -> bool {
        let changed = self.base.set_visible(visible);
        self.layers.set_visible(visible, restart);
        if !visible {
            self.clear_hotspots();
        } else if changed {
            if self.ripple_active {
                self.try_ripple_enter();
            }
            self.jump_to_current_state();
        }
        changed
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn set_callback(&mut self, callback: Option<Weak<dyn DrawableCallback>>) {
        // The layers keep reporting to the content watcher.
        *self.content.host.borrow_mut() = callback.clone();
        self.base.set_callback(callback);
    }

    fn set_hotspot(&mut self, x: f32, y: f32) {
        self.layers.set_hotspot(x, y);
        match self.ripple.as_mut() {
            Some(ripple) => ripple.move_to(x, y),
            None => self.pending = Some((x, y)),
        }
    }

    fn set_hotspot_bounds(&mut self, bounds: Rect) {
        self.override_bounds = true;
        if self.hotspot_bounds != bounds {
            self.hotspot_bounds = bounds;
            self.on_hotspot_bounds_changed();
        }
        self.layers.set_hotspot_bounds(bounds);
    }

    fn hotspot_bounds(&self) -> Rect {
        self.hotspot_bounds
    }

    fn dirty_bounds(&mut self) -> Rect {
        if self.is_bounded() {
            return self.bounds();
        }
        let mut dirty = self.drawing_bounds;
        let (cx, cy) = self.hotspot_bounds.center();
        let (cx, cy) = (cx.trunc(), cy.trunc());

        let mut drawing = Rect::EMPTY;
        for ripple in self.exiting.iter().chain(self.ripple.as_ref()) {
            drawing = drawing.union(&ripple.component().local_bounds().offset(cx, cy));
        }
        if let Some(background) = &self.background {
            drawing = drawing.union(&background.component().local_bounds().offset(cx, cy));
        }
        self.drawing_bounds = drawing;

        dirty = dirty.union(&drawing);
        dirty.union(&self.bounds())
    }

    fn jump_to_current_state(&mut self) {
        self.layers.jump_to_current_state();
        if let Some(ripple) = self.ripple.as_mut() {
            ripple.end();
        }
        if let Some(background) = self.background.as_mut() {
            background.jump_to_final();
        }
        self.cancel_exiting_ripples();
    }

    fn mutate(&mut self) {
        if self.mutated {
            return;
        }
        self.layers.mutate();
        let mut state = (*self.state).clone();
        state.layers = self.layers.layer_state().clone();
        self.state = Rc::new(state);
        self.has_valid_mask = false;
        self.mutated = true;
        log::debug!("Ripple drawable mutated");
    }

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        Some(self.state.clone())
    }

    fn can_apply_theme(&self) -> bool {
        self.state.can_apply_theme()
    }

    fn apply_theme(&mut self, theme: &Theme) -> Result<()> {
        self.layers.apply_theme(theme)?;
        self.sync_layer_state();

        if let Some(attr) = self.state.color_attr {
            let color = theme.resolve_color_list(attr).map_err(|err| {
                log::warn!("Ripple color attribute left unresolved: {}", err);
                err
            })?;
            let state = Rc::make_mut(&mut self.state);
            state.color = color;
            state.color_attr = None;
        }
        if let Some(attr) = self.state.radius_attr {
            // The radius is optional; an absent attribute keeps the current one.
            if theme.get(attr).is_some() {
                let radius = theme.resolve_dimension(attr).map_err(|err| {
                    log::warn!("Ripple radius attribute left unresolved: {}", err);
                    err
                })?;
                let state = Rc::make_mut(&mut self.state);
                state.max_radius = radius.round() as i32;
                state.radius_attr = None;
            }
        }
        if let Some(density) = theme.density_dpi() {
            self.set_density(density);
        }
        self.invalidate(true);
        Ok(())
    }

    fn set_density(&mut self, density_dpi: u32) {
        if density_dpi == 0 || self.state.density == density_dpi {
            return;
        }
        let source = self.state.density;
        self.layers.set_density(density_dpi);
        let state = Rc::make_mut(&mut self.state);
        if state.max_radius != RADIUS_AUTO {
            state.max_radius = scale_size_from_density(state.max_radius, source, density_dpi);
        }
        state.density = density_dpi;
        log::debug!("Ripple density {} -> {}", source, density_dpi);
        self.sync_layer_state();
    }

    fn intrinsic_width(&self) -> Option<f32> {
        self.layers.intrinsic_width()
    }

    fn intrinsic_height(&self) -> Option<f32> {
        self.layers.intrinsic_height()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::animation::ManualClock;
    use crate::canvas::RecordingCanvas;
    use crate::drawable::test_support::InvalidationCounter;
    use crate::drawable::ColorDrawable;
    use crate::error::DrawableError;
    use crate::theme::ThemeValue;

    const PRESSED: StateSet = StateSet::ENABLED.union(StateSet::PRESSED);

    fn ripple_with(
        content: Option<Box<dyn Drawable>>,
        mask: Option<Box<dyn Drawable>>,
    ) -> (RippleDrawable, ManualClock) {
        let clock = ManualClock::new();
        let mut drawable = RippleDrawable::new(ColorStateList::value_of(Color::WHITE), content, mask)
            .with_clock(Rc::new(clock.clone()));
        drawable.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        (drawable, clock)
    }

    fn opaque() -> Option<Box<dyn Drawable>> {
        Some(Box::new(ColorDrawable::new(Color::WHITE)))
    }

    fn translucent() -> Option<Box<dyn Drawable>> {
        Some(Box::new(ColorDrawable::new(Color::WHITE.with_alpha(128))))
    }

    #[test]
    fn test_pending_hotspot_anchors_next_ripple() {
        let (mut drawable, _clock) = ripple_with(opaque(), None);
        drawable.set_hotspot(10.0, 20.0);
        drawable.set_state(PRESSED);
        let ripple = drawable.active_ripple().unwrap();
        assert_eq!(ripple.starting_position(), (10.0, 20.0));

        drawable.set_hotspot(30.0, 40.0);
        assert_eq!(drawable.active_ripple().unwrap().starting_position(), (30.0, 40.0));
    }

    #[test]
    fn test_disabled_press_does_not_ripple() {
        let (mut drawable, _clock) = ripple_with(opaque(), None);
        drawable.set_state(StateSet::PRESSED);
        assert!(drawable.active_ripple().is_none());
        assert!(!drawable.is_ripple_active());
    }

    #[test]
    fn test_release_moves_ripple_to_exiting_pool() {
        let (mut drawable, clock) = ripple_with(opaque(), None);
        drawable.set_state(PRESSED);
        drawable.set_state(StateSet::ENABLED);
        assert!(drawable.active_ripple().is_none());
        assert_eq!(drawable.exiting_ripple_count(), 1);

        drawable.set_state(PRESSED);
        assert!(drawable.active_ripple().is_some());

        clock.advance_ms(1000);
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert_eq!(drawable.exiting_ripple_count(), 0);
    }

    #[test]
    fn test_pool_limit_from_config() {
        let clock = ManualClock::new();
        let mut drawable = RippleDrawable::new(ColorStateList::value_of(Color::WHITE), opaque(), None)
            .with_clock(Rc::new(clock.clone()))
            .with_config(RenderConfig::new().max_ripples(2));
        drawable.set_bounds(Rect::new(0.0, 0.0, 10.0, 10.0));
        for _ in 0..5 {
            drawable.set_state(PRESSED);
            drawable.set_state(StateSet::ENABLED);
        }
        assert_eq!(drawable.exiting_ripple_count(), 2);
    }

    #[test]
    fn test_draw_order_and_translation() {
        let (mut drawable, clock) = ripple_with(opaque(), None);
        drawable.set_state(PRESSED | StateSet::FOCUSED);
        clock.advance(Duration::from_millis(300));

        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert_eq!(canvas.rects().len(), 1);
        let circles = canvas.circles();
        assert_eq!(circles.len(), 2);
        // Background first, then the press ripple, both around the center.
        assert_abs_diff_eq!(circles[0].radius, 50.0 * 2f32.sqrt(), epsilon = 1e-3);
        assert_eq!(circles[0].center, (50.0, 50.0));
        assert_eq!(circles[1].center, (50.0, 50.0));
        assert_eq!(canvas.clips(), vec![Rect::new(0.0, 0.0, 100.0, 100.0)]);
        assert_eq!(canvas.save_count(), 1);
    }

    #[test]
    fn test_half_alpha_paint_without_mask() {
        let (mut drawable, _clock) = ripple_with(opaque(), None);
        drawable.set_state(PRESSED);
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        let paint = drawable.ripple_paint();
        assert_eq!(paint.alpha(), 127);
        assert!(paint.shader.is_none());
        assert!(paint.color_filter.is_none());
        assert!(drawable.mask_buffer().is_none());
    }

    #[test]
    fn test_content_mask_feeds_shader() {
        let (mut drawable, _clock) = ripple_with(translucent(), None);
        drawable.set_state(PRESSED);
        assert_eq!(drawable.mask_type(), MaskType::Content);

        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        let buffer = drawable.mask_buffer().unwrap();
        assert_eq!((buffer.width(), buffer.height()), (100, 100));
        assert_eq!(buffer.alpha_at(10, 10), 128);

        let paint = drawable.ripple_paint();
        assert_eq!(paint.alpha(), 127);
        assert_eq!(
            paint.color_filter,
            Some(ColorFilter::PorterDuff {
                color: Color::WHITE,
                mode: BlendMode::SrcIn
            })
        );
        let Some(Shader::Mask { offset, .. }) = &paint.shader else {
            panic!("expected a mask shader");
        };
        assert_eq!(*offset, (-50.0, -50.0));
    }

    #[test]
    fn test_idle_mask_is_deferred() {
        let (mut drawable, _clock) = ripple_with(translucent(), None);
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert_eq!(drawable.mask_type(), MaskType::None);
        assert!(drawable.mask_buffer().is_none());
        assert!(!drawable.has_valid_mask);
    }

    #[test]
    fn test_mask_layer_replacement_invalidates_mask() {
        let (mut drawable, _clock) = ripple_with(opaque(), translucent());
        drawable.set_state(PRESSED);
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert!(drawable.mask_buffer().is_some());

        assert!(drawable.set_drawable_by_layer_id(LayerId::MASK, opaque().unwrap()));
        assert_eq!(drawable.mask_type(), MaskType::None);
        drawable.draw(&mut canvas);
        assert!(drawable.mask_buffer().is_none());
        assert!(!drawable.set_drawable_by_layer_id(LayerId(7), opaque().unwrap()));
    }

    #[test]
    fn test_alpha_change_rebuilds_content_mask() {
        let (mut drawable, _clock) = ripple_with(translucent(), None);
        drawable.set_state(PRESSED);
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert_eq!(drawable.mask_buffer().unwrap().alpha_at(10, 10), 128);

        drawable.set_alpha(64);
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        let content_alpha = canvas.rects()[0].1.alpha();
        assert!(content_alpha < 128);
        assert_eq!(drawable.mask_buffer().unwrap().alpha_at(10, 10), content_alpha);
    }

    #[test]
    fn test_child_invalidation_rebuilds_content_mask() {
        let clock = ManualClock::new();
        let child = ColorDrawable::new(Color::WHITE.with_alpha(128));
        let mut drawable = RippleDrawable::with_layers(
            ColorStateList::value_of(Color::WHITE),
            vec![ChildLayer::new(child).with_id(LayerId(1))],
        )
        .with_clock(Rc::new(clock.clone()));
        drawable.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        let counter = Rc::new(InvalidationCounter::default());
        let callback: Rc<dyn DrawableCallback> = counter.clone();
        drawable.set_callback(Some(Rc::downgrade(&callback)));
        drawable.set_state(PRESSED);
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert_eq!(drawable.mask_buffer().unwrap().alpha_at(10, 10), 128);

        let before = counter.count.get();
        drawable
            .find_drawable_by_layer_id_mut(LayerId(1))
            .unwrap()
            .as_any_mut()
            .downcast_mut::<ColorDrawable>()
            .unwrap()
            .set_color(Color::WHITE.with_alpha(200));
        assert_eq!(counter.count.get(), before + 1);

        drawable.draw(&mut canvas);
        assert_eq!(drawable.mask_buffer().unwrap().alpha_at(10, 10), 200);
    }

    #[test]
    fn test_background_follows_radius_changes() {
        let (mut drawable, clock) = ripple_with(opaque(), None);
        drawable.set_state(StateSet::ENABLED | StateSet::FOCUSED);
        drawable.set_state(StateSet::ENABLED);
        drawable.set_radius(20);
        drawable.set_state(StateSet::ENABLED | StateSet::FOCUSED);
        clock.advance_ms(100);
        assert_abs_diff_eq!(
            drawable.background().unwrap().component().target_radius(),
            20.0
        );
    }

    #[test]
    fn test_mask_layer_is_not_drawn_as_content() {
        let (mut drawable, _clock) = ripple_with(None, opaque());
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert!(canvas.rects().is_empty());
    }

    #[test]
    fn test_projection() {
        let (mut drawable, _clock) = ripple_with(None, None);
        assert!(drawable.is_projected());
        drawable.set_radius(20);
        assert!(!drawable.is_projected());
        drawable.set_radius(80);
        assert!(drawable.is_projected());

        let (bounded, _clock) = ripple_with(opaque(), None);
        assert!(!bounded.is_projected());
    }

    #[test]
    fn test_unbounded_dirty_bounds_cover_ripple() {
        let (mut drawable, _clock) = ripple_with(None, None);
        drawable.set_radius(80);
        drawable.set_state(PRESSED);
        let dirty = drawable.dirty_bounds();
        assert_eq!(dirty, Rect::from_ltrb(-30.0, -30.0, 130.0, 130.0));

        let (mut bounded, _clock) = ripple_with(opaque(), None);
        bounded.set_state(PRESSED);
        assert_eq!(bounded.dirty_bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_unbounded_ripple_is_not_clipped() {
        let (mut drawable, _clock) = ripple_with(None, None);
        drawable.set_state(PRESSED);
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert!(canvas.clips().is_empty());
    }

    #[test]
    fn test_hotspot_bounds_override_is_sticky() {
        let (mut drawable, _clock) = ripple_with(opaque(), None);
        drawable.set_hotspot_bounds(Rect::new(10.0, 10.0, 20.0, 20.0));
        drawable.set_bounds(Rect::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(drawable.hotspot_bounds(), Rect::new(10.0, 10.0, 20.0, 20.0));
        drawable.set_state(PRESSED);
        assert_eq!(
            drawable.active_ripple().unwrap().component().bounds(),
            Rect::new(10.0, 10.0, 20.0, 20.0)
        );
    }

    #[test]
    fn test_hide_clears_hotspots() {
        let (mut drawable, _clock) = ripple_with(opaque(), None);
        drawable.set_state(PRESSED | StateSet::HOVERED);
        drawable.set_state(StateSet::ENABLED | StateSet::FOCUSED);
        drawable.set_state(PRESSED | StateSet::FOCUSED);
        assert_eq!(drawable.exiting_ripple_count(), 1);

        drawable.set_visible(false, false);
        assert!(drawable.active_ripple().is_none());
        assert!(!drawable.is_ripple_active());
        assert_eq!(drawable.exiting_ripple_count(), 0);
        assert!(!drawable.background().unwrap().is_visible(drawable.now()));
        assert!(!drawable.is_animating());
    }

    #[test]
    fn test_animation_invalidates_host() {
        let (mut drawable, clock) = ripple_with(opaque(), None);
        let counter = Rc::new(InvalidationCounter::default());
        let callback: Rc<dyn DrawableCallback> = counter.clone();
        drawable.set_callback(Some(Rc::downgrade(&callback)));
        drawable.set_state(PRESSED);

        let before = counter.count.get();
        let mut canvas = RecordingCanvas::new();
        drawable.draw(&mut canvas);
        assert_eq!(counter.count.get(), before + 1);

        clock.advance_ms(500);
        drawable.draw(&mut canvas);
        assert_eq!(counter.count.get(), before + 1);
    }

    #[test]
    fn test_mutate_copies_shared_state() {
        let (mut first, _clock) = ripple_with(opaque(), None);
        let mut second = RippleDrawable::from_state(first.ripple_state().clone());
        assert!(Rc::ptr_eq(first.ripple_state(), second.ripple_state()));

        second.mutate();
        second.set_color(ColorStateList::value_of(Color::BLACK));
        assert!(!Rc::ptr_eq(first.ripple_state(), second.ripple_state()));
        assert_eq!(first.color().default_color(), Color::WHITE);
        assert_eq!(second.number_of_layers(), 1);

        first.set_radius(12);
        assert_eq!(second.radius(), RADIUS_AUTO);
    }

    #[test]
    fn test_theme_resolves_color_and_radius() {
        let mut drawable = RippleDrawable::themed(opaque(), None);
        assert!(drawable.can_apply_theme());
        let theme = Theme::new()
            .set(ThemeAttr::COLOR_CONTROL_HIGHLIGHT, ThemeValue::Color(Color::BLACK))
            .set(ThemeAttr::RIPPLE_RADIUS, ThemeValue::Dimension(24.0));
        drawable.apply_theme(&theme).unwrap();
        assert_eq!(drawable.color().default_color(), Color::BLACK);
        assert_eq!(drawable.radius(), 24);
        assert!(!drawable.can_apply_theme());
    }

    #[test]
    fn test_theme_without_color_fails() {
        let mut drawable = RippleDrawable::themed(None, None);
        let result = drawable.apply_theme(&Theme::new());
        assert_eq!(
            result,
            Err(DrawableError::UnresolvedThemeAttribute {
                attr: ThemeAttr::COLOR_CONTROL_HIGHLIGHT
            })
        );
        assert!(drawable.can_apply_theme());
    }

    #[test]
    fn test_density_rescales_explicit_radius() {
        let (mut drawable, _clock) = ripple_with(opaque(), None);
        drawable.set_radius(20);
        drawable.set_density(320);
        assert_eq!(drawable.radius(), 40);
        drawable.set_density(160);
        assert_eq!(drawable.radius(), 20);
    }

    #[test]
    fn test_constant_state_recreates_ripple() {
        let (drawable, _clock) = ripple_with(opaque(), translucent());
        let state = drawable.constant_state().unwrap();
        let copy = state.new_drawable();
        let copy = copy.as_any().downcast_ref::<RippleDrawable>().unwrap();
        assert_eq!(copy.number_of_layers(), 2);
        assert!(copy.find_drawable_by_layer_id(LayerId::MASK).is_some());
        assert_eq!(copy.opacity(), Opacity::Translucent);
    }
}
