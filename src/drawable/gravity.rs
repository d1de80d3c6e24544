use bitflags::bitflags;

use crate::geometry::Rect;
use crate::state::LayoutDirection;

bitflags! {
    /// Placement of an object inside a larger container.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Gravity: u32 {
        const LEFT              = 1 << 0;
        const RIGHT             = 1 << 1;
        const CENTER_HORIZONTAL = 1 << 2;
        const FILL_HORIZONTAL   = 1 << 3;
        const TOP               = 1 << 4;
        const BOTTOM            = 1 << 5;
        const CENTER_VERTICAL   = 1 << 6;
        const FILL_VERTICAL     = 1 << 7;
        /// Left in LTR layouts, right in RTL
        const START             = 1 << 8;
        /// Right in LTR layouts, left in RTL
        const END               = 1 << 9;

        const CENTER = Self::CENTER_HORIZONTAL.bits() | Self::CENTER_VERTICAL.bits();
        const FILL = Self::FILL_HORIZONTAL.bits() | Self::FILL_VERTICAL.bits();
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity::LEFT | Gravity::TOP
    }
}

impl Gravity {
    /// Place a `width` x `height` object inside `container`.
    pub fn apply(&self, width: f32, height: f32, container: Rect, direction: LayoutDirection) -> Rect {
        let gravity = self.resolve(direction);

        let (x, w) = if gravity.contains(Gravity::FILL_HORIZONTAL) {
            (container.x, container.width)
        } else if gravity.contains(Gravity::CENTER_HORIZONTAL) {
            (container.center_x() - width / 2.0, width)
        } else if gravity.contains(Gravity::RIGHT) {
            (container.right() - width, width)
        } else {
            (container.x, width)
        };

        let (y, h) = if gravity.contains(Gravity::FILL_VERTICAL) {
            (container.y, container.height)
        } else if gravity.contains(Gravity::CENTER_VERTICAL) {
            (container.center_y() - height / 2.0, height)
        } else if gravity.contains(Gravity::BOTTOM) {
            (container.bottom() - height, height)
        } else {
            (container.y, height)
        };

        Rect::new(x, y, w, h)
    }

    /// Replace START/END with LEFT/RIGHT for the given direction.
    pub fn resolve(&self, direction: LayoutDirection) -> Gravity {
        let mut gravity = *self - (Gravity::START | Gravity::END);
        let (start, end) = match direction {
            LayoutDirection::Ltr => (Gravity::LEFT, Gravity::RIGHT),
            LayoutDirection::Rtl => (Gravity::RIGHT, Gravity::LEFT),
        };
        if self.contains(Gravity::START) {
            gravity |= start;
        }
        if self.contains(Gravity::END) {
            gravity |= end;
        }
        gravity
    }
}
