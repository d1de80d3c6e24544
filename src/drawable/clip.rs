use bitflags::bitflags;

use super::{Drawable, DrawableBase, DrawableWrapper, Gravity, WrapperKind, MAX_LEVEL};
use crate::canvas::Canvas;
use crate::state::Opacity;

bitflags! {
    /// Axes along which the level clips the child.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ClipOrientation: u32 {
        const HORIZONTAL = 1 << 0;
        const VERTICAL   = 1 << 1;
    }
}

/// Reveals a level-proportional part of the child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub orientation: ClipOrientation,
    pub gravity: Gravity,
}

impl Default for Clip {
    fn default() -> Self {
        Self {
            orientation: ClipOrientation::HORIZONTAL,
            gravity: Gravity::LEFT,
        }
    }
}

impl Clip {
    pub fn new(orientation: ClipOrientation, gravity: Gravity) -> Self {
        Self {
            orientation,
            gravity,
        }
    }
}

impl WrapperKind for Clip {
    fn draw(&self, child: &mut dyn Drawable, canvas: &mut dyn Canvas, base: &DrawableBase) {
        let level = base.level();
        if level == 0 {
            return;
        }
        let bounds = base.bounds();
        let hidden = (MAX_LEVEL - level) as f32 / MAX_LEVEL as f32;
        let mut w = bounds.width;
        if self.orientation.contains(ClipOrientation::HORIZONTAL) {
            w -= (w * hidden).trunc();
        }
        let mut h = bounds.height;
        if self.orientation.contains(ClipOrientation::VERTICAL) {
            h -= (h * hidden).trunc();
        }
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let visible = self
            .gravity
            .apply(w, h, bounds, base.layout_direction());
        let count = canvas.save();
        canvas.clip_rect(visible);
        child.draw(canvas);
        canvas.restore_to_count(count);
    }

    fn opacity(&self, child: &dyn Drawable, base: &DrawableBase) -> Opacity {
        let opacity = child.opacity();
        if opacity == Opacity::Transparent || base.level() == 0 {
            Opacity::Transparent
        } else if base.level() >= MAX_LEVEL {
            opacity
        } else {
            Opacity::Translucent
        }
    }

    fn uses_level(&self) -> bool {
        true
    }
}

pub type ClipDrawable = DrawableWrapper<Clip>;

impl DrawableWrapper<Clip> {
    pub fn clip(drawable: impl Drawable, orientation: ClipOrientation, gravity: Gravity) -> Self {
        Self::new(Clip::new(orientation, gravity), Some(Box::new(drawable)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::color::Color;
    use crate::drawable::ColorDrawable;
    use crate::geometry::Rect;

    fn clip_drawable(orientation: ClipOrientation, gravity: Gravity) -> ClipDrawable {
        let mut clip = ClipDrawable::clip(ColorDrawable::new(Color::WHITE), orientation, gravity);
        clip.set_bounds(Rect::new(0.0, 0.0, 200.0, 100.0));
        clip
    }

    #[test]
    fn test_level_zero_draws_nothing() {
        let mut clip = clip_drawable(ClipOrientation::HORIZONTAL, Gravity::LEFT);
        let mut canvas = RecordingCanvas::new();
        clip.draw(&mut canvas);
        assert!(canvas.rects().is_empty());
        assert_eq!(clip.opacity(), Opacity::Transparent);
    }

    #[test]
    fn test_half_level_clips_horizontally() {
        let mut clip = clip_drawable(ClipOrientation::HORIZONTAL, Gravity::RIGHT);
        clip.set_level(MAX_LEVEL / 2);
        let mut canvas = RecordingCanvas::new();
        clip.draw(&mut canvas);
        assert_eq!(canvas.clips(), vec![Rect::new(100.0, 0.0, 100.0, 100.0)]);
        assert_eq!(canvas.rects().len(), 1);
        assert_eq!(canvas.save_count(), 1);
        assert_eq!(clip.opacity(), Opacity::Translucent);
    }

    #[test]
    fn test_both_axes_centered() {
        let mut clip = clip_drawable(
            ClipOrientation::HORIZONTAL | ClipOrientation::VERTICAL,
            Gravity::CENTER,
        );
        clip.set_level(MAX_LEVEL / 4);
        let mut canvas = RecordingCanvas::new();
        clip.draw(&mut canvas);
        assert_eq!(canvas.clips(), vec![Rect::new(75.0, 37.5, 50.0, 25.0)]);
    }

    #[test]
    fn test_full_level_keeps_child_opacity() {
        let mut clip = clip_drawable(ClipOrientation::VERTICAL, Gravity::BOTTOM);
        clip.set_level(MAX_LEVEL);
        assert_eq!(clip.opacity(), Opacity::Opaque);
    }
}
