//! A minimal theme: attribute ids mapped to resolved values.
//!
//! Drawables remember which of their properties still point at a theme
//! attribute and resolve them when a theme is applied.

use std::collections::HashMap;

use crate::color::{Color, ColorStateList};
use crate::error::{DrawableError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThemeAttr(pub u32);

impl ThemeAttr {
    pub const COLOR_CONTROL_HIGHLIGHT: ThemeAttr = ThemeAttr(1);
    pub const COLOR_ACCENT: ThemeAttr = ThemeAttr(2);
    pub const RIPPLE_RADIUS: ThemeAttr = ThemeAttr(3);
    pub const INSET_LEFT: ThemeAttr = ThemeAttr(10);
    pub const INSET_TOP: ThemeAttr = ThemeAttr(11);
    pub const INSET_RIGHT: ThemeAttr = ThemeAttr(12);
    pub const INSET_BOTTOM: ThemeAttr = ThemeAttr(13);
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeValue {
    Color(Color),
    ColorList(ColorStateList),
    /// Pixel dimension
    Dimension(f32),
    Fraction(f32),
    Integer(i32),
}

#[derive(Debug, Clone, Default)]
pub struct Theme {
    values: HashMap<ThemeAttr, ThemeValue>,
    density_dpi: Option<u32>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_density(mut self, density_dpi: u32) -> Self {
        self.density_dpi = Some(density_dpi);
        self
    }

    pub fn set(mut self, attr: ThemeAttr, value: ThemeValue) -> Self {
        self.values.insert(attr, value);
        self
    }

    pub fn density_dpi(&self) -> Option<u32> {
        self.density_dpi
    }

    pub fn get(&self, attr: ThemeAttr) -> Option<&ThemeValue> {
        self.values.get(&attr)
    }

    fn require(&self, attr: ThemeAttr) -> Result<&ThemeValue> {
        self.get(attr)
            .ok_or(DrawableError::UnresolvedThemeAttribute { attr })
    }

    /// Resolve an attribute to a color list. A plain color is promoted.
    pub fn resolve_color_list(&self, attr: ThemeAttr) -> Result<ColorStateList> {
        match self.require(attr)? {
            ThemeValue::ColorList(list) => Ok(list.clone()),
            ThemeValue::Color(color) => Ok(ColorStateList::value_of(*color)),
            _ => Err(DrawableError::ThemeTypeMismatch {
                attr,
                expected: "color",
            }),
        }
    }

    pub fn resolve_dimension(&self, attr: ThemeAttr) -> Result<f32> {
        match self.require(attr)? {
            ThemeValue::Dimension(px) => Ok(*px),
            ThemeValue::Integer(px) => Ok(*px as f32),
            _ => Err(DrawableError::ThemeTypeMismatch {
                attr,
                expected: "dimension",
            }),
        }
    }

    pub fn resolve_fraction(&self, attr: ThemeAttr) -> Result<f32> {
        match self.require(attr)? {
            ThemeValue::Fraction(f) => Ok(*f),
            _ => Err(DrawableError::ThemeTypeMismatch {
                attr,
                expected: "fraction",
            }),
        }
    }
}
