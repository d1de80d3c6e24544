//! Single-child drawables.
//!
//! [`DrawableWrapper`] forwards the drawable contract to one child and owns
//! the copy-on-write bookkeeping for its shared state. What the wrapper does
//! with the child (inset it, clip it, scale it, rotate it) is supplied by a
//! [`WrapperKind`].

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use super::{sync_child, ConstantState, Drawable, DrawableBase, DrawableCallback};
use crate::canvas::Canvas;
use crate::density::DENSITY_DEFAULT;
use crate::error::Result;
use crate::geometry::Rect;
use crate::state::{ConfigChanges, LayoutDirection, Opacity, StateSet};
use crate::theme::Theme;

/// Behavior a wrapper adds on top of plain delegation.
///
/// Implementations are part of the shared state, so they are cloned when an
/// instance mutates.
pub trait WrapperKind: Clone + fmt::Debug + 'static {
    /// Bounds handed to the child for the wrapper's current configuration.
    fn child_bounds(&self, _child: &dyn Drawable, base: &DrawableBase) -> Rect {
        base.bounds()
    }

    fn draw(&self, child: &mut dyn Drawable, canvas: &mut dyn Canvas, _base: &DrawableBase) {
        child.draw(canvas);
    }

    fn opacity(&self, child: &dyn Drawable, _base: &DrawableBase) -> Opacity {
        child.opacity()
    }

    /// Whether the level changes what is drawn, independently of the child.
    fn uses_level(&self) -> bool {
        false
    }

    /// Rescale pixel dimensions after a density change.
    fn on_density_changed(&mut self, _source: u32, _target: u32) {}

    fn can_apply_theme(&self) -> bool {
        false
    }

    fn apply_theme(&mut self, _theme: &Theme) -> Result<()> {
        Ok(())
    }

    fn intrinsic_width(&self, child: Option<&dyn Drawable>) -> Option<f32> {
        child.and_then(|child| child.intrinsic_width())
    }

    fn intrinsic_height(&self, child: Option<&dyn Drawable>) -> Option<f32> {
        child.and_then(|child| child.intrinsic_height())
    }
}

/// Plain delegation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl WrapperKind for Passthrough {}

#[derive(Debug, Clone)]
pub struct WrapperState<K: WrapperKind> {
    pub density: u32,
    /// Density the child's pixel values were authored for; 0 means unset.
    pub src_density_override: u32,
    pub changing_configurations: ConfigChanges,
    /// Snapshot of the child's constant state, used when cloning.
    pub drawable_state: Option<Rc<dyn ConstantState>>,
    pub kind: K,
}

impl<K: WrapperKind> WrapperState<K> {
    pub fn new(kind: K) -> Self {
        Self {
            density: DENSITY_DEFAULT,
            src_density_override: 0,
            changing_configurations: ConfigChanges::empty(),
            drawable_state: None,
            kind,
        }
    }
}

impl<K: WrapperKind> ConstantState for WrapperState<K> {
    fn new_drawable(self: Rc<Self>) -> Box<dyn Drawable> {
        Box::new(DrawableWrapper::from_state(self))
    }

    fn changing_configurations(&self) -> ConfigChanges {
        let child = self
            .drawable_state
            .as_ref()
            .map(|state| state.changing_configurations())
            .unwrap_or_default();
        self.changing_configurations | child
    }

    fn can_apply_theme(&self) -> bool {
        self.kind.can_apply_theme()
            || self
                .drawable_state
                .as_ref()
                .is_some_and(|state| state.can_apply_theme())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A drawable that wraps at most one child.
#[derive(Debug)]
pub struct DrawableWrapper<K: WrapperKind> {
    base: DrawableBase,
    state: Rc<WrapperState<K>>,
    drawable: Option<Box<dyn Drawable>>,
    hotspot_bounds: Option<Rect>,
    mutated: bool,
}

impl<K: WrapperKind> DrawableWrapper<K> {
    pub fn new(kind: K, drawable: Option<Box<dyn Drawable>>) -> Self {
        let mut wrapper = Self::from_state(Rc::new(WrapperState::new(kind)));
        wrapper.set_drawable(drawable);
        wrapper
    }

    /// Build an instance sharing `state`; the child is recreated from the
    /// snapshot it holds.
    pub fn from_state(state: Rc<WrapperState<K>>) -> Self {
        let drawable = state
            .drawable_state
            .clone()
            .map(|child| child.new_drawable());
        Self {
            base: DrawableBase::new(),
            state,
            drawable,
            hotspot_bounds: None,
            mutated: false,
        }
    }

    pub fn wrapper_state(&self) -> &Rc<WrapperState<K>> {
        &self.state
    }

    pub fn kind(&self) -> &K {
        &self.state.kind
    }

    /// Change the wrapper's configuration. Instances sharing state are unaffected.
    pub fn update_kind(&mut self, update: impl FnOnce(&mut K)) {
        update(&mut Rc::make_mut(&mut self.state).kind);
        self.layout_child();
        self.invalidate_self();
    }

    pub fn density(&self) -> u32 {
        self.state.density
    }

    pub fn drawable(&self) -> Option<&dyn Drawable> {
        self.drawable.as_deref()
    }

    pub fn drawable_mut(&mut self) -> Option<&mut dyn Drawable> {
        match self.drawable.as_mut() {
            Some(drawable) => Some(drawable.as_mut()),
            None => None,
        }
    }

    /// Swap the child.
    ///
    /// The new child takes over the host callback and immediately adopts
    /// the wrapper's visibility, state, level, bounds and layout direction.
    pub fn set_drawable(&mut self, drawable: Option<Box<dyn Drawable>>) {
        if let Some(old) = self.drawable.as_mut() {
            old.set_callback(None);
        }
        self.drawable = drawable;
        if let Some(child) = self.drawable.as_mut() {
            child.set_callback(self.base.callback());
            sync_child(&self.base, child.as_mut());
            if let Some(hotspot) = self.hotspot_bounds {
                child.set_hotspot_bounds(hotspot);
            }
        }
        let snapshot = self.drawable.as_ref().and_then(|child| child.constant_state());
        Rc::make_mut(&mut self.state).drawable_state = snapshot;
        self.layout_child();
        self.invalidate_self();
    }

    fn layout_child(&mut self) {
        if let Some(child) = self.drawable.as_mut() {
            let bounds = self.state.kind.child_bounds(child.as_ref(), &self.base);
            child.set_bounds(bounds);
        }
    }
}

impl<K: WrapperKind> Drawable for DrawableWrapper<K> {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn draw(&mut self, canvas: &mut dyn Canvas) {
        if let Some(child) = self.drawable.as_mut() {
            self.state.kind.draw(child.as_mut(), canvas, &self.base);
        }
    }

    fn opacity(&self) -> Opacity {
        match self.drawable.as_ref() {
            Some(child) => self.state.kind.opacity(child.as_ref(), &self.base),
            None => Opacity::Transparent,
        }
    }

    fn set_alpha(&mut self, alpha: u8) {
        if let Some(child) = self.drawable.as_mut() {
            child.set_alpha(alpha);
        }
    }

    fn alpha(&self) -> u8 {
        self.drawable.as_ref().map_or(255, |child| child.alpha())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_bounds_change(&mut self, _bounds: Rect) {
        self.layout_child();
    }

    fn on_state_change(&mut self, state: StateSet) -> bool {
        let changed = match self.drawable.as_mut() {
            Some(child) if child.is_stateful() => child.set_state(state),
            _ => false,
        };
        if changed {
            self.layout_child();
        }
        changed
    }

    fn on_level_change(&mut self, level: i32) -> bool {
        let changed = self
            .drawable
            .as_mut()
            .is_some_and(|child| child.set_level(level));
        let changed = changed || self.state.kind.uses_level();
        if changed {
            self.layout_child();
            self.invalidate_self();
        }
        changed
    }

    fn on_layout_direction_changed(&mut self, direction: LayoutDirection) -> bool {
        let changed = self
            .drawable
            .as_mut()
            .is_some_and(|child| child.set_layout_direction(direction));
        self.layout_child();
        changed
    }

    fn set_visible(&mut self, visible: bool, restart: bool) -> bool {
        let changed = self.base.set_visible(visible);
        let child_changed = self
            .drawable
            .as_mut()
            .is_some_and(|child| child.set_visible(visible, restart));
        changed || child_changed
    }

    fn is_stateful(&self) -> bool {
        self.drawable.as_ref().is_some_and(|child| child.is_stateful())
    }

    fn set_callback(&mut self, callback: Option<Weak<dyn DrawableCallback>>) {
        if let Some(child) = self.drawable.as_mut() {
            child.set_callback(callback.clone());
        }
        self.base.set_callback(callback);
    }

    fn set_hotspot(&mut self, x: f32, y: f32) {
        if let Some(child) = self.drawable.as_mut() {
            child.set_hotspot(x, y);
        }
    }

    fn set_hotspot_bounds(&mut self, bounds: Rect) {
        self.hotspot_bounds = Some(bounds);
        if let Some(child) = self.drawable.as_mut() {
            child.set_hotspot_bounds(bounds);
        }
    }

    fn hotspot_bounds(&self) -> Rect {
        self.hotspot_bounds.unwrap_or_else(|| self.bounds())
    }

    fn jump_to_current_state(&mut self) {
        if let Some(child) = self.drawable.as_mut() {
            child.jump_to_current_state();
        }
    }

    fn mutate(&mut self) {
        if self.mutated {
            return;
        }
        self.state = Rc::new((*self.state).clone());
        if let Some(child) = self.drawable.as_mut() {
            child.mutate();
        }
        let snapshot = self.drawable.as_ref().and_then(|child| child.constant_state());
        Rc::make_mut(&mut self.state).drawable_state = snapshot;
        self.mutated = true;
        log::debug!("Wrapper drawable mutated");
    }

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        // A child that cannot be cloned makes the wrapper uncloneable.
        if self.drawable.is_some() && self.state.drawable_state.is_none() {
            return None;
        }
        Some(self.state.clone())
    }

    fn changing_configurations(&self) -> ConfigChanges {
        let child = self
            .drawable
            .as_ref()
            .map(|child| child.changing_configurations())
            .unwrap_or_default();
        self.state.changing_configurations | child
    }

    fn can_apply_theme(&self) -> bool {
        self.state.kind.can_apply_theme()
            || self
                .drawable
                .as_ref()
                .is_some_and(|child| child.can_apply_theme())
    }

    fn apply_theme(&mut self, theme: &Theme) -> Result<()> {
        if self.state.kind.can_apply_theme() {
            Rc::make_mut(&mut self.state).kind.apply_theme(theme)?;
        }
        if let Some(child) = self.drawable.as_mut() {
            if child.can_apply_theme() {
                child.apply_theme(theme)?;
            }
        }
        self.layout_child();
        Ok(())
    }

    fn set_density(&mut self, density_dpi: u32) {
        if density_dpi == 0 || self.state.density == density_dpi {
            return;
        }
        let source = self.state.density;
        log::debug!("Wrapper density {} -> {}", source, density_dpi);
        let state = Rc::make_mut(&mut self.state);
        state.density = density_dpi;
        state.kind.on_density_changed(source, density_dpi);
        if let Some(child) = self.drawable.as_mut() {
            child.set_density(density_dpi);
        }
        self.layout_child();
    }

    fn intrinsic_width(&self) -> Option<f32> {
        self.state.kind.intrinsic_width(self.drawable.as_deref())
    }

    fn intrinsic_height(&self) -> Option<f32> {
        self.state.kind.intrinsic_height(self.drawable.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::drawable::test_support::InvalidationCounter;
    use crate::drawable::ColorDrawable;

    fn wrapped(color: Color) -> DrawableWrapper<Passthrough> {
        DrawableWrapper::new(Passthrough, Some(Box::new(ColorDrawable::new(color))))
    }

    fn clone_of(wrapper: &DrawableWrapper<Passthrough>) -> Box<dyn Drawable> {
        wrapper.constant_state().unwrap().new_drawable()
    }

    fn state_of(drawable: &dyn Drawable) -> &Rc<WrapperState<Passthrough>> {
        drawable
            .as_any()
            .downcast_ref::<DrawableWrapper<Passthrough>>()
            .unwrap()
            .wrapper_state()
    }

    #[test]
    fn test_new_child_adopts_configuration() {
        let mut wrapper = DrawableWrapper::new(Passthrough, None);
        wrapper.set_bounds(Rect::new(1.0, 2.0, 3.0, 4.0));
        wrapper.set_level(500);
        wrapper.set_visible(false, false);
        wrapper.set_drawable(Some(Box::new(ColorDrawable::new(Color::WHITE))));

        let child = wrapper.drawable().unwrap();
        assert_eq!(child.bounds(), Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(child.level(), 500);
        assert!(!child.is_visible());
    }

    #[test]
    fn test_swapping_child_moves_callback() {
        let counter = Rc::new(InvalidationCounter::default());
        let callback: Rc<dyn DrawableCallback> = counter.clone();
        let mut wrapper = wrapped(Color::WHITE);
        wrapper.set_callback(Some(Rc::downgrade(&callback)));
        wrapper.set_drawable(Some(Box::new(ColorDrawable::new(Color::BLACK))));
        let before = counter.count.get();

        let child = wrapper
            .drawable_mut()
            .unwrap()
            .as_any_mut()
            .downcast_mut::<ColorDrawable>()
            .unwrap();
        child.set_color(Color::WHITE);
        assert_eq!(counter.count.get(), before + 1);
    }

    #[test]
    fn test_alpha_not_shared_before_mutate() {
        let mut first = wrapped(Color::WHITE);
        let mut second = clone_of(&first);

        first.set_alpha(40);
        assert_eq!(second.alpha(), 255);
        second.set_alpha(90);
        assert_eq!(first.alpha(), 40);
        assert!(Rc::ptr_eq(first.wrapper_state(), state_of(second.as_ref())));
    }

    #[test]
    fn test_set_drawable_not_shared() {
        let mut first = wrapped(Color::WHITE);
        let second = clone_of(&first);
        first.set_drawable(Some(Box::new(ColorDrawable::new(Color::BLACK))));

        let shared = state_of(second.as_ref()).drawable_state.clone().unwrap();
        let snapshot = shared.as_any().downcast_ref::<crate::drawable::ColorState>().unwrap();
        assert_eq!(snapshot.base_color, Color::WHITE);
    }

    #[test]
    fn test_mutate_is_idempotent_and_detaches() {
        let mut first = wrapped(Color::WHITE);
        let second = clone_of(&first);
        first.mutate();
        let after_first = first.wrapper_state().clone();
        first.mutate();
        assert!(Rc::ptr_eq(&after_first, first.wrapper_state()));
        assert!(!Rc::ptr_eq(first.wrapper_state(), state_of(second.as_ref())));
    }

    #[test]
    fn test_density_change_is_noop_when_unchanged() {
        let mut wrapper = wrapped(Color::WHITE);
        let before = wrapper.wrapper_state().clone();
        wrapper.set_density(DENSITY_DEFAULT);
        assert!(Rc::ptr_eq(&before, wrapper.wrapper_state()));
        wrapper.set_density(320);
        assert_eq!(wrapper.density(), 320);
    }

    #[test]
    fn test_empty_wrapper() {
        let mut wrapper = DrawableWrapper::new(Passthrough, None);
        assert_eq!(wrapper.opacity(), Opacity::Transparent);
        let mut canvas = crate::canvas::RecordingCanvas::new();
        wrapper.draw(&mut canvas);
        assert!(canvas.ops().is_empty());
    }
}
