use super::{Drawable, DrawableBase, DrawableWrapper, WrapperKind, MAX_LEVEL};
use crate::canvas::Canvas;

/// One coordinate of a rotation pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pivot {
    /// Fraction of the child's size
    Relative(f32),
    /// Pixels from the child's origin
    Absolute(f32),
}

impl Pivot {
    fn resolve(&self, size: f32) -> f32 {
        match self {
            Pivot::Relative(fraction) => size * fraction,
            Pivot::Absolute(px) => *px,
        }
    }
}

/// Rotates the child by an angle interpolated from the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotate {
    pub pivot_x: Pivot,
    pub pivot_y: Pivot,
    pub from_degrees: f32,
    pub to_degrees: f32,
}

impl Default for Rotate {
    fn default() -> Self {
        Self {
            pivot_x: Pivot::Relative(0.5),
            pivot_y: Pivot::Relative(0.5),
            from_degrees: 0.0,
            to_degrees: 360.0,
        }
    }
}

impl Rotate {
    pub fn degrees_for_level(&self, level: i32) -> f32 {
        self.from_degrees + (self.to_degrees - self.from_degrees) * (level as f32 / MAX_LEVEL as f32)
    }
}

impl WrapperKind for Rotate {
    fn draw(&self, child: &mut dyn Drawable, canvas: &mut dyn Canvas, base: &DrawableBase) {
        let bounds = child.bounds();
        let px = bounds.left() + self.pivot_x.resolve(bounds.width);
        let py = bounds.top() + self.pivot_y.resolve(bounds.height);
        let count = canvas.save();
        canvas.translate(px, py);
        canvas.rotate(self.degrees_for_level(base.level()));
        canvas.translate(-px, -py);
        child.draw(canvas);
        canvas.restore_to_count(count);
    }

    fn uses_level(&self) -> bool {
        true
    }
}

pub type RotateDrawable = DrawableWrapper<Rotate>;

impl DrawableWrapper<Rotate> {
    pub fn rotate(drawable: impl Drawable, from_degrees: f32, to_degrees: f32) -> Self {
        Self::new(
            Rotate {
                from_degrees,
                to_degrees,
                ..Rotate::default()
            },
            Some(Box::new(drawable)),
        )
    }

    /// Current rotation in degrees.
    pub fn current_degrees(&self) -> f32 {
        self.kind().degrees_for_level(self.level())
    }
}
