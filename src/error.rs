use thiserror::Error;

use crate::drawable::LayerId;
use crate::theme::ThemeAttr;

/// Errors raised while configuring drawables.
///
/// Drawing never fails; these only surface from theme application, density
/// setup and explicit layer replacement.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DrawableError {
    #[error("theme has no value for attribute {attr:?}")]
    UnresolvedThemeAttribute { attr: ThemeAttr },

    #[error("theme attribute {attr:?} is not a {expected}")]
    ThemeTypeMismatch {
        attr: ThemeAttr,
        expected: &'static str,
    },

    #[error("invalid density: {0} dpi")]
    InvalidDensity(u32),

    #[error("no layer with id {0:?}")]
    UnknownLayer(LayerId),
}

pub type Result<T, E = DrawableError> = std::result::Result<T, E>;
