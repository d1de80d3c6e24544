//! Touch-feedback ripples and the drawable plumbing they sit on.
//!
//! A [`RippleDrawable`](ripple::RippleDrawable) layers press ripples and a
//! hover/focus glow over ordinary content drawables. Everything draws into
//! the [`Canvas`](canvas::Canvas) trait; time comes from a
//! [`FrameClock`](animation::FrameClock) so hosts and tests control it.

pub mod animation;
pub mod canvas;
pub mod color;
pub mod config;
pub mod density;
pub mod drawable;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod ripple;
pub mod state;
pub mod theme;

pub use config::RenderConfig;
pub use error::{DrawableError, Result};

pub mod prelude {
    pub use crate::animation::{FrameClock, ManualClock, SystemClock, TimingFunction, Transition};
    pub use crate::canvas::{Canvas, MaskBuffer, Paint, PropertyCanvas, RecordingCanvas};
    pub use crate::color::{Color, ColorStateList, StateSpec};
    pub use crate::config::RenderConfig;
    pub use crate::drawable::{
        ChildLayer, ClipDrawable, ColorDrawable, ConstantState, Drawable, DrawableCallback,
        DrawableWrapper, Gravity, InsetDrawable, LayerDrawable, LayerId, RotateDrawable,
        ScaleDrawable,
    };
    pub use crate::error::{DrawableError, Result};
    pub use crate::geometry::Rect;
    pub use crate::ripple::{MaskType, RippleDrawable, RippleState, RADIUS_AUTO};
    pub use crate::state::{LayoutDirection, Opacity, StateSet};
    pub use crate::theme::{Theme, ThemeAttr, ThemeValue};
}
