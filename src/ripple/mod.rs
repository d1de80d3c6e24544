//! Touch feedback ripples.
//!
//! [`RippleDrawable`] orchestrates a press ripple ([`RippleForeground`]), a
//! hover/focus glow ([`RippleBackground`]) and the masking that keeps both
//! inside the drawable's content or mask layer. [`Ripple`] is the older
//! single-circle effect, kept for hosts that still drive it directly.

mod background;
mod backend;
mod component;
mod drawable;
mod foreground;
mod legacy;

use std::time::Duration;

pub use background::RippleBackground;
pub use backend::{AnimationBackend, HardwareBackend, RippleFrame, SoftwareBackend};
pub use component::RippleComponent;
pub use drawable::{MaskType, RippleDrawable, RippleState};
pub use foreground::RippleForeground;
pub use legacy::Ripple;

/// Most ripples animating at once; further presses are dropped.
pub const MAX_RIPPLES: usize = 10;

/// Radius value meaning "cover the hotspot bounds".
pub const RADIUS_AUTO: i32 = -1;

pub const RIPPLE_ENTER_DURATION: Duration = Duration::from_millis(225);
pub const OPACITY_ENTER_DURATION: Duration = Duration::from_millis(75);
pub const OPACITY_EXIT_DURATION: Duration = Duration::from_millis(150);
/// Minimum time a ripple stays fully visible after it entered.
pub const OPACITY_HOLD_DURATION: Duration = Duration::from_millis(225);
pub const BACKGROUND_OPACITY_DURATION: Duration = Duration::from_millis(80);

/// Starting radius as a fraction of the larger bounds dimension.
pub const STARTING_RADIUS_FACTOR: f32 = 0.3;

pub const FOCUSED_OPACITY: f32 = 0.6;
pub const HOVERED_OPACITY: f32 = 0.2;
