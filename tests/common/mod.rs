#![allow(dead_code)]

use std::rc::Rc;

use ripplekit::prelude::*;

/// Capture log output per test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A bounded white ripple over `content` in a 100x100 box, driven by a manual clock.
pub fn ripple_over(
    content: Option<Box<dyn Drawable>>,
    mask: Option<Box<dyn Drawable>>,
) -> (RippleDrawable, ManualClock) {
    init_logging();
    let clock = ManualClock::new();
    let mut drawable = RippleDrawable::new(ColorStateList::value_of(Color::WHITE), content, mask)
        .with_clock(Rc::new(clock.clone()));
    drawable.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
    (drawable, clock)
}

pub fn solid(color: Color) -> Option<Box<dyn Drawable>> {
    Some(Box::new(ColorDrawable::new(color)))
}
