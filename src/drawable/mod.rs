//! The paintable-object contract and the drawables built on it.
//!
//! A [`Drawable`] is a stateful, resolution- and theme-aware thing that knows
//! how to paint itself into a [`Canvas`]. Drawables that can be cloned share
//! an immutable [`ConstantState`]; calling [`Drawable::mutate`] gives an
//! instance its own copy before it changes anything shared.

mod clip;
mod color;
mod gravity;
mod inset;
mod layer;
mod rotate;
mod scale;
mod wrapper;

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

pub use clip::{Clip, ClipDrawable, ClipOrientation};
pub use color::{ColorDrawable, ColorState};
pub use gravity::Gravity;
pub use inset::{Inset, InsetDrawable, InsetValue};
pub use layer::{ChildLayer, LayerChildState, LayerDrawable, LayerId, LayerState};
pub use rotate::{Pivot, Rotate, RotateDrawable};
pub use scale::{Scale, ScaleDrawable};
pub use wrapper::{DrawableWrapper, Passthrough, WrapperKind, WrapperState};

use crate::canvas::Canvas;
use crate::error::Result;
use crate::geometry::Rect;
use crate::state::{ConfigChanges, LayoutDirection, Opacity, StateSet};
use crate::theme::Theme;

/// Levels run from 0 to this value.
pub const MAX_LEVEL: i32 = 10_000;

/// Receives invalidation requests from drawables it hosts.
pub trait DrawableCallback {
    /// The drawable needs to be redrawn.
    fn invalidate_drawable(&self);
}

/// Shared, immutable configuration that can stamp out new drawables.
pub trait ConstantState: Any + fmt::Debug {
    fn new_drawable(self: Rc<Self>) -> Box<dyn Drawable>;

    fn changing_configurations(&self) -> ConfigChanges {
        ConfigChanges::empty()
    }

    fn can_apply_theme(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

/// Per-instance fields every drawable carries.
#[derive(Clone, Default)]
pub struct DrawableBase {
    bounds: Rect,
    state: StateSet,
    level: i32,
    hidden: bool,
    layout_direction: LayoutDirection,
    callback: Option<Weak<dyn DrawableCallback>>,
}

impl DrawableBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn state(&self) -> StateSet {
        self.state
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    pub fn layout_direction(&self) -> LayoutDirection {
        self.layout_direction
    }

    pub fn callback(&self) -> Option<Weak<dyn DrawableCallback>> {
        self.callback.clone()
    }

    pub(crate) fn set_callback(&mut self, callback: Option<Weak<dyn DrawableCallback>>) {
        self.callback = callback;
    }

    /// Returns true if visibility changed.
    pub(crate) fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.hidden == visible;
        if changed {
            self.hidden = !visible;
            self.invalidate();
        }
        changed
    }

    /// Ask the host to redraw, if a host is still attached.
    pub fn invalidate(&self) {
        if let Some(callback) = self.callback.as_ref().and_then(Weak::upgrade) {
            callback.invalidate_drawable();
        }
    }
}

impl fmt::Debug for DrawableBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawableBase")
            .field("bounds", &self.bounds)
            .field("state", &self.state)
            .field("level", &self.level)
            .field("visible", &!self.hidden)
            .field("layout_direction", &self.layout_direction)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// A paintable object.
///
/// Implementors supply storage through [`base`](Drawable::base) and
/// [`base_mut`](Drawable::base_mut) and react to changes through the
/// `on_*` hooks; the setters themselves are provided.
pub trait Drawable: Any + fmt::Debug {
    fn base(&self) -> &DrawableBase;

    fn base_mut(&mut self) -> &mut DrawableBase;

    fn draw(&mut self, canvas: &mut dyn Canvas);

    fn opacity(&self) -> Opacity;

    fn set_alpha(&mut self, alpha: u8);

    fn alpha(&self) -> u8 {
        255
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn on_bounds_change(&mut self, _bounds: Rect) {}

    /// Returns true if the change affects how the drawable looks.
    fn on_state_change(&mut self, _state: StateSet) -> bool {
        false
    }

    fn on_level_change(&mut self, _level: i32) -> bool {
        false
    }

    fn on_layout_direction_changed(&mut self, _direction: LayoutDirection) -> bool {
        false
    }

    fn set_bounds(&mut self, bounds: Rect) {
        if self.base().bounds != bounds {
            self.base_mut().bounds = bounds;
            self.on_bounds_change(bounds);
        }
    }

    fn bounds(&self) -> Rect {
        self.base().bounds
    }

    /// Region this drawable may touch when drawn; may exceed its bounds.
    fn dirty_bounds(&mut self) -> Rect {
        self.bounds()
    }

    fn set_state(&mut self, state: StateSet) -> bool {
        if self.base().state != state {
            self.base_mut().state = state;
            return self.on_state_change(state);
        }
        false
    }

    fn state(&self) -> StateSet {
        self.base().state
    }

    fn is_stateful(&self) -> bool {
        false
    }

    fn set_level(&mut self, level: i32) -> bool {
        let level = level.clamp(0, MAX_LEVEL);
        if self.base().level != level {
            self.base_mut().level = level;
            return self.on_level_change(level);
        }
        false
    }

    fn level(&self) -> i32 {
        self.base().level
    }

    /// Returns true if visibility changed.
    fn set_visible(&mut self, visible: bool, _restart: bool) -> bool {
        self.base_mut().set_visible(visible)
    }

    fn is_visible(&self) -> bool {
        self.base().is_visible()
    }

    fn set_layout_direction(&mut self, direction: LayoutDirection) -> bool {
        if self.base().layout_direction != direction {
            self.base_mut().layout_direction = direction;
            return self.on_layout_direction_changed(direction);
        }
        false
    }

    fn layout_direction(&self) -> LayoutDirection {
        self.base().layout_direction
    }

    fn set_callback(&mut self, callback: Option<Weak<dyn DrawableCallback>>) {
        self.base_mut().set_callback(callback);
    }

    fn invalidate_self(&self) {
        self.base().invalidate();
    }

    fn set_hotspot(&mut self, _x: f32, _y: f32) {}

    fn set_hotspot_bounds(&mut self, _bounds: Rect) {}

    fn hotspot_bounds(&self) -> Rect {
        self.bounds()
    }

    /// Finish any running transitions immediately.
    fn jump_to_current_state(&mut self) {}

    /// Make this instance's constant state private. Idempotent.
    fn mutate(&mut self) {}

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        None
    }

    fn changing_configurations(&self) -> ConfigChanges {
        self.constant_state()
            .map(|state| state.changing_configurations())
            .unwrap_or_default()
    }

    fn can_apply_theme(&self) -> bool {
        false
    }

    fn apply_theme(&mut self, _theme: &Theme) -> Result<()> {
        Ok(())
    }

    /// Rescale pixel dimensions for a new display density.
    fn set_density(&mut self, _density_dpi: u32) {}

    fn intrinsic_width(&self) -> Option<f32> {
        None
    }

    fn intrinsic_height(&self) -> Option<f32> {
        None
    }
}

/// Copy a parent's visible configuration onto a newly attached child.
pub(crate) fn sync_child(parent: &DrawableBase, child: &mut dyn Drawable) {
    child.set_visible(parent.is_visible(), false);
    child.set_state(parent.state());
    child.set_level(parent.level());
    child.set_bounds(parent.bounds());
    child.set_layout_direction(parent.layout_direction());
}

/// Whether two handles point at the same constant state object.
pub(crate) fn same_state(a: &Rc<dyn ConstantState>, b: &Rc<dyn ConstantState>) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}
