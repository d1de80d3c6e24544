//! An ordered stack of child drawables.

use std::any::Any;
use std::rc::{Rc, Weak};

use super::{same_state, ConstantState, Drawable, DrawableBase, DrawableCallback};
use crate::canvas::Canvas;
use crate::density::{scale_from_density, DENSITY_DEFAULT};
use crate::error::{DrawableError, Result};
use crate::geometry::{Insets, Rect};
use crate::state::{resolve_opacity, ConfigChanges, LayoutDirection, Opacity, StateSet};
use crate::theme::Theme;

/// Identifies a layer inside a [`LayerDrawable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u32);

impl LayerId {
    /// Reserved id of the layer a ripple uses as its mask.
    pub const MASK: LayerId = LayerId(u32::MAX);
}

/// A layer to add to a [`LayerDrawable`].
#[derive(Debug)]
pub struct ChildLayer {
    pub drawable: Box<dyn Drawable>,
    pub id: Option<LayerId>,
    /// Pixel insets, left, top, right, bottom
    pub insets: [i32; 4],
}

impl ChildLayer {
    pub fn new(drawable: impl Drawable) -> Self {
        Self::boxed(Box::new(drawable))
    }

    pub fn boxed(drawable: Box<dyn Drawable>) -> Self {
        Self {
            drawable,
            id: None,
            insets: [0; 4],
        }
    }

    pub fn with_id(mut self, id: LayerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_insets(mut self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        self.insets = [left, top, right, bottom];
        self
    }
}

/// Shared configuration of one layer.
#[derive(Debug, Clone)]
pub struct LayerChildState {
    pub drawable_state: Option<Rc<dyn ConstantState>>,
    pub id: Option<LayerId>,
    pub insets: [i32; 4],
}

impl LayerChildState {
    fn insets(&self) -> Insets {
        let [left, top, right, bottom] = self.insets;
        Insets::new(left as f32, top as f32, right as f32, bottom as f32)
    }
}

#[derive(Debug, Clone)]
pub struct LayerState {
    pub children: Vec<LayerChildState>,
    pub density: u32,
    /// Reported instead of the opacity computed from the children.
    pub opacity_override: Option<Opacity>,
    pub changing_configurations: ConfigChanges,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            density: DENSITY_DEFAULT,
            opacity_override: None,
            changing_configurations: ConfigChanges::empty(),
        }
    }
}

impl LayerState {
    /// Rescale pixel insets for a new density.
    fn apply_density_scaling(&mut self, source: u32, target: u32) {
        for child in &mut self.children {
            for inset in &mut child.insets {
                *inset = scale_from_density(*inset, source, target);
            }
        }
    }
}

impl ConstantState for LayerState {
    fn new_drawable(self: Rc<Self>) -> Box<dyn Drawable> {
        Box::new(LayerDrawable::from_state(self))
    }

    fn changing_configurations(&self) -> ConfigChanges {
        self.children
            .iter()
            .filter_map(|child| child.drawable_state.as_ref())
            .fold(self.changing_configurations, |acc, state| {
                acc | state.changing_configurations()
            })
    }

    fn can_apply_theme(&self) -> bool {
        self.children
            .iter()
            .filter_map(|child| child.drawable_state.as_ref())
            .any(|state| state.can_apply_theme())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Draws its layers in order, each inside the drawable's bounds shrunk by
/// the layer's insets.
#[derive(Debug)]
pub struct LayerDrawable {
    base: DrawableBase,
    state: Rc<LayerState>,
    /// Index-aligned with `state.children`
    drawables: Vec<Box<dyn Drawable>>,
    hotspot_bounds: Option<Rect>,
    mutated: bool,
}

impl Default for LayerDrawable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl LayerDrawable {
    pub fn new(layers: Vec<ChildLayer>) -> Self {
        let mut drawable = Self::from_state(Rc::new(LayerState::default()));
        for layer in layers {
            drawable.add_layer(layer);
        }
        drawable
    }

    /// Build an instance from shared state. Children without a constant
    /// state cannot be recreated and are left out.
    pub fn from_state(mut state: Rc<LayerState>) -> Self {
        let drawables: Vec<Box<dyn Drawable>> = state
            .children
            .iter()
            .filter_map(|child| child.drawable_state.clone())
            .map(|child| child.new_drawable())
            .collect();
        if drawables.len() != state.children.len() {
            log::debug!(
                "Dropping {} layer(s) without constant state",
                state.children.len() - drawables.len()
            );
            Rc::make_mut(&mut state)
                .children
                .retain(|child| child.drawable_state.is_some());
        }
        Self {
            base: DrawableBase::new(),
            state,
            drawables,
            hotspot_bounds: None,
            mutated: false,
        }
    }

    pub fn layer_state(&self) -> &Rc<LayerState> {
        &self.state
    }

    /// Append a layer and return its index.
    pub fn add_layer(&mut self, layer: ChildLayer) -> usize {
        let ChildLayer {
            mut drawable,
            id,
            insets,
        } = layer;
        self.attach(drawable.as_mut());
        Rc::make_mut(&mut self.state).children.push(LayerChildState {
            drawable_state: drawable.constant_state(),
            id,
            insets,
        });
        self.drawables.push(drawable);
        let index = self.drawables.len() - 1;
        self.layout_child(index);
        self.invalidate_self();
        index
    }

    pub fn number_of_layers(&self) -> usize {
        self.drawables.len()
    }

    pub fn drawable(&self, index: usize) -> Option<&dyn Drawable> {
        self.drawables.get(index).map(|d| d.as_ref())
    }

    pub fn drawable_mut(&mut self, index: usize) -> Option<&mut dyn Drawable> {
        match self.drawables.get_mut(index) {
            Some(drawable) => Some(drawable.as_mut()),
            None => None,
        }
    }

    pub fn id(&self, index: usize) -> Option<LayerId> {
        self.state.children.get(index).and_then(|child| child.id)
    }

    pub fn set_id(&mut self, index: usize, id: Option<LayerId>) {
        if index < self.state.children.len() && self.state.children[index].id != id {
            Rc::make_mut(&mut self.state).children[index].id = id;
        }
    }

    pub fn insets(&self, index: usize) -> Option<[i32; 4]> {
        self.state.children.get(index).map(|child| child.insets)
    }

    pub fn set_layer_insets(&mut self, index: usize, left: i32, top: i32, right: i32, bottom: i32) {
        let insets = [left, top, right, bottom];
        if index < self.state.children.len() && self.state.children[index].insets != insets {
            Rc::make_mut(&mut self.state).children[index].insets = insets;
            self.layout_child(index);
            self.invalidate_self();
        }
    }

    /// Index of the last layer with `id`.
    pub fn find_index_by_layer_id(&self, id: LayerId) -> Option<usize> {
        self.state.children.iter().rposition(|child| child.id == Some(id))
    }

    pub fn find_drawable_by_layer_id(&self, id: LayerId) -> Option<&dyn Drawable> {
        self.find_index_by_layer_id(id)
            .and_then(|index| self.drawable(index))
    }

    pub fn find_drawable_by_layer_id_mut(&mut self, id: LayerId) -> Option<&mut dyn Drawable> {
        match self.find_index_by_layer_id(id) {
            Some(index) => self.drawable_mut(index),
            None => None,
        }
    }

    /// Replace the drawable of the layer with `id`.
    /// Returns false if there is no such layer.
    pub fn set_drawable_by_layer_id(&mut self, id: LayerId, drawable: Box<dyn Drawable>) -> bool {
        self.try_set_drawable_by_layer_id(id, drawable).is_ok()
    }

    pub fn try_set_drawable_by_layer_id(
        &mut self,
        id: LayerId,
        drawable: Box<dyn Drawable>,
    ) -> Result<()> {
        let index = self
            .find_index_by_layer_id(id)
            .ok_or(DrawableError::UnknownLayer(id))?;
        self.set_drawable(index, drawable);
        Ok(())
    }

    /// Replace the drawable at `index`, detaching the old one.
    pub fn set_drawable(&mut self, index: usize, mut drawable: Box<dyn Drawable>) {
        if index >= self.drawables.len() {
            return;
        }
        self.drawables[index].set_callback(None);
        self.attach(drawable.as_mut());
        Rc::make_mut(&mut self.state).children[index].drawable_state = drawable.constant_state();
        self.drawables[index] = drawable;
        self.layout_child(index);
        self.invalidate_self();
    }

    /// Every layer with its id, bottom to top.
    pub fn layers(&self) -> impl Iterator<Item = (Option<LayerId>, &dyn Drawable)> + '_ {
        self.state
            .children
            .iter()
            .zip(&self.drawables)
            .map(|(child, drawable)| (child.id, drawable.as_ref()))
    }

    pub fn set_opacity_override(&mut self, opacity: Option<Opacity>) {
        if self.state.opacity_override != opacity {
            Rc::make_mut(&mut self.state).opacity_override = opacity;
        }
    }

    /// Draw the layers accepted by `filter`, bottom to top.
    pub fn draw_filtered(&mut self, canvas: &mut dyn Canvas, filter: impl Fn(Option<LayerId>) -> bool) {
        for (child, drawable) in self.state.children.iter().zip(self.drawables.iter_mut()) {
            if filter(child.id) && drawable.is_visible() {
                drawable.draw(canvas);
            }
        }
    }

    fn attach(&self, drawable: &mut dyn Drawable) {
        drawable.set_callback(self.base.callback());
        drawable.set_layout_direction(self.base.layout_direction());
        drawable.set_level(self.base.level());
        drawable.set_state(self.base.state());
        drawable.set_visible(self.base.is_visible(), false);
        if let Some(hotspot) = self.hotspot_bounds {
            drawable.set_hotspot_bounds(hotspot);
        }
    }

    fn layout_child(&mut self, index: usize) {
        let bounds = self.base.bounds();
        if let (Some(child), Some(drawable)) =
            (self.state.children.get(index), self.drawables.get_mut(index))
        {
            drawable.set_bounds(bounds.inset_by(&child.insets()));
        }
    }

    fn layout_children(&mut self) {
        for index in 0..self.drawables.len() {
            self.layout_child(index);
        }
    }

    /// Refresh the snapshots of the children's constant states.
    fn snapshot_children(&mut self) {
        let stale = self
            .state
            .children
            .iter()
            .zip(&self.drawables)
            .any(|(child, drawable)| {
                match (&child.drawable_state, drawable.constant_state()) {
                    (Some(old), Some(new)) => !same_state(old, &new),
                    (None, None) => false,
                    _ => true,
                }
            });
        if stale {
            let states: Vec<_> = self.drawables.iter().map(|d| d.constant_state()).collect();
            let state = Rc::make_mut(&mut self.state);
            for (child, snapshot) in state.children.iter_mut().zip(states) {
                child.drawable_state = snapshot;
            }
        }
    }
}

impl Drawable for LayerDrawable {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn draw(&mut self, canvas: &mut dyn Canvas) {
        self.draw_filtered(canvas, |_| true);
    }

    fn opacity(&self) -> Opacity {
        if let Some(opacity) = self.state.opacity_override {
            return opacity;
        }
        let mut layers = self.drawables.iter().filter(|d| d.is_visible());
        let Some(first) = layers.next() else {
            return Opacity::Transparent;
        };
        layers.fold(first.opacity(), |acc, drawable| {
            resolve_opacity(acc, drawable.opacity())
        })
    }

    fn set_alpha(&mut self, alpha: u8) {
        for drawable in &mut self.drawables {
            drawable.set_alpha(alpha);
        }
    }

    fn alpha(&self) -> u8 {
        self.drawables.first().map_or(255, |d| d.alpha())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_bounds_change(&mut self, _bounds: Rect) {
        self.layout_children();
    }

    fn on_state_change(&mut self, state: StateSet) -> bool {
        let mut changed = false;
        for drawable in &mut self.drawables {
            if drawable.is_stateful() && drawable.set_state(state) {
                changed = true;
            }
        }
        changed
    }

    fn on_level_change(&mut self, level: i32) -> bool {
        let mut changed = false;
        for drawable in &mut self.drawables {
            changed |= drawable.set_level(level);
        }
        changed
    }

    fn on_layout_direction_changed(&mut self, direction: LayoutDirection) -> bool {
        let mut changed = false;
        for drawable in &mut self.drawables {
            changed |= drawable.set_layout_direction(direction);
        }
        changed
    }

    fn set_visible(&mut self, visible: bool, restart: bool) -> bool {
        let changed = self.base.set_visible(visible);
        for drawable in &mut self.drawables {
            drawable.set_visible(visible, restart);
        }
        changed
    }

    fn is_stateful(&self) -> bool {
        self.drawables.iter().any(|d| d.is_stateful())
    }

    fn set_callback(&mut self, callback: Option<Weak<dyn DrawableCallback>>) {
        for drawable in &mut self.drawables {
            drawable.set_callback(callback.clone());
        }
        self.base.set_callback(callback);
    }

    fn set_hotspot(&mut self, x: f32, y: f32) {
        for drawable in &mut self.drawables {
            drawable.set_hotspot(x, y);
        }
    }

    fn set_hotspot_bounds(&mut self, bounds: Rect) {
        self.hotspot_bounds = Some(bounds);
        for drawable in &mut self.drawables {
            drawable.set_hotspot_bounds(bounds);
        }
    }

    fn hotspot_bounds(&self) -> Rect {
        self.hotspot_bounds.unwrap_or_else(|| self.bounds())
    }

    fn jump_to_current_state(&mut self) {
        for drawable in &mut self.drawables {
            drawable.jump_to_current_state();
        }
    }

    fn mutate(&mut self) {
        if self.mutated {
            return;
        }
        self.state = Rc::new((*self.state).clone());
        for drawable in &mut self.drawables {
            drawable.mutate();
        }
        self.snapshot_children();
        self.mutated = true;
        log::debug!("Layer drawable mutated ({} layers)", self.drawables.len());
    }

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        Some(self.state.clone())
    }

    fn can_apply_theme(&self) -> bool {
        self.drawables.iter().any(|d| d.can_apply_theme())
    }

    fn apply_theme(&mut self, theme: &Theme) -> Result<()> {
        for drawable in &mut self.drawables {
            if drawable.can_apply_theme() {
                drawable.apply_theme(theme)?;
            }
        }
        self.snapshot_children();
        Ok(())
    }

    fn set_density(&mut self, density_dpi: u32) {
        if density_dpi == 0 || self.state.density == density_dpi {
            return;
        }
        let source = self.state.density;
        log::debug!("Layer density {} -> {}", source, density_dpi);
        let state = Rc::make_mut(&mut self.state);
        state.apply_density_scaling(source, density_dpi);
        state.density = density_dpi;
        for drawable in &mut self.drawables {
            drawable.set_density(density_dpi);
        }
        self.layout_children();
    }

    fn intrinsic_width(&self) -> Option<f32> {
        self.state
            .children
            .iter()
            .zip(&self.drawables)
            .filter_map(|(child, d)| {
                d.intrinsic_width()
                    .map(|w| w + (child.insets[0] + child.insets[2]) as f32)
            })
            .reduce(f32::max)
    }

    fn intrinsic_height(&self) -> Option<f32> {
        self.state
            .children
            .iter()
            .zip(&self.drawables)
            .filter_map(|(child, d)| {
                d.intrinsic_height()
                    .map(|h| h + (child.insets[1] + child.insets[3]) as f32)
            })
            .reduce(f32::max)
    }
}
