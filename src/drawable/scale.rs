use super::{Drawable, DrawableBase, DrawableWrapper, Gravity, WrapperKind, MAX_LEVEL};
use crate::canvas::Canvas;
use crate::geometry::Rect;
use crate::state::Opacity;

/// Shrinks the child as the level drops.
///
/// At level `MAX_LEVEL` the child fills the bounds; at level 0 it is hidden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    /// Fraction of the width removed at level 0; `None` leaves the width alone.
    pub scale_width: Option<f32>,
    pub scale_height: Option<f32>,
    pub gravity: Gravity,
    /// Never shrink below the child's intrinsic size.
    pub use_intrinsic_size_as_min: bool,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            scale_width: None,
            scale_height: None,
            gravity: Gravity::LEFT,
            use_intrinsic_size_as_min: false,
        }
    }
}

impl Scale {
    pub fn new(scale_width: Option<f32>, scale_height: Option<f32>, gravity: Gravity) -> Self {
        Self {
            scale_width,
            scale_height,
            gravity,
            use_intrinsic_size_as_min: false,
        }
    }

    fn shrink(size: f32, min: f32, scale: Option<f32>, level: i32) -> f32 {
        match scale {
            Some(scale) if scale > 0.0 => {
                let removed = (size - min) * (MAX_LEVEL - level) as f32 * scale / MAX_LEVEL as f32;
                size - removed.trunc()
            }
            _ => size,
        }
    }
}

impl WrapperKind for Scale {
    fn child_bounds(&self, child: &dyn Drawable, base: &DrawableBase) -> Rect {
        let bounds = base.bounds();
        let level = base.level();
        let (min_w, min_h) = if self.use_intrinsic_size_as_min {
            (
                child.intrinsic_width().unwrap_or(0.0),
                child.intrinsic_height().unwrap_or(0.0),
            )
        } else {
            (0.0, 0.0)
        };
        let w = Self::shrink(bounds.width, min_w, self.scale_width, level);
        let h = Self::shrink(bounds.height, min_h, self.scale_height, level);
        if w <= 0.0 || h <= 0.0 {
            return child.bounds();
        }
        self.gravity.apply(w, h, bounds, base.layout_direction())
    }

    fn draw(&self, child: &mut dyn Drawable, canvas: &mut dyn Canvas, _base: &DrawableBase) {
        if child.level() != 0 {
            child.draw(canvas);
        }
    }

    fn opacity(&self, child: &dyn Drawable, _base: &DrawableBase) -> Opacity {
        if child.level() == 0 {
            return Opacity::Transparent;
        }
        let opacity = child.opacity();
        if opacity == Opacity::Opaque && child.level() < MAX_LEVEL {
            return Opacity::Translucent;
        }
        opacity
    }

    fn uses_level(&self) -> bool {
        true
    }
}

pub type ScaleDrawable = DrawableWrapper<Scale>;

impl DrawableWrapper<Scale> {
    pub fn scale(
        drawable: impl Drawable,
        gravity: Gravity,
        scale_width: Option<f32>,
        scale_height: Option<f32>,
    ) -> Self {
        Self::new(
            Scale::new(scale_width, scale_height, gravity),
            Some(Box::new(drawable)),
        )
    }
}
