use std::any::Any;
use std::rc::Rc;

use super::{ConstantState, Drawable, DrawableBase};
use crate::canvas::{Canvas, Paint};
use crate::color::Color;
use crate::error::Result;
use crate::state::{ConfigChanges, Opacity};
use crate::theme::{Theme, ThemeAttr};

#[derive(Debug, Clone, PartialEq)]
pub struct ColorState {
    pub base_color: Color,
    /// `base_color` with the drawable's alpha applied
    pub use_color: Color,
    pub theme_color: Option<ThemeAttr>,
}

impl ConstantState for ColorState {
    fn new_drawable(self: Rc<Self>) -> Box<dyn Drawable> {
        Box::new(ColorDrawable::from_state(self))
    }

    fn changing_configurations(&self) -> ConfigChanges {
        if self.theme_color.is_some() {
            ConfigChanges::THEME
        } else {
            ConfigChanges::empty()
        }
    }

    fn can_apply_theme(&self) -> bool {
        self.theme_color.is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fills its bounds with a single color.
#[derive(Debug)]
pub struct ColorDrawable {
    base: DrawableBase,
    state: Rc<ColorState>,
    mutated: bool,
}

impl ColorDrawable {
    pub fn new(color: Color) -> Self {
        Self::from_state(Rc::new(ColorState {
            base_color: color,
            use_color: color,
            theme_color: None,
        }))
    }

    /// A color that is looked up from the theme when one is applied.
    pub fn themed(attr: ThemeAttr, fallback: Color) -> Self {
        Self::from_state(Rc::new(ColorState {
            base_color: fallback,
            use_color: fallback,
            theme_color: Some(attr),
        }))
    }

    pub fn from_state(state: Rc<ColorState>) -> Self {
        Self {
            base: DrawableBase::new(),
            state,
            mutated: false,
        }
    }

    pub fn color(&self) -> Color {
        self.state.use_color
    }

    pub fn set_color(&mut self, color: Color) {
        if self.state.base_color != color || self.state.use_color != color {
            let state = Rc::make_mut(&mut self.state);
            state.base_color = color;
            state.use_color = color;
            self.invalidate_self();
        }
    }
}

impl Drawable for ColorDrawable {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn draw(&mut self, canvas: &mut dyn Canvas) {
        let color = self.state.use_color;
        if color.alpha() > 0 {
            canvas.draw_rect(self.base.bounds(), &Paint::new(color));
        }
    }

    fn opacity(&self) -> Opacity {
        match self.state.use_color.alpha() {
            255 => Opacity::Opaque,
            0 => Opacity::Transparent,
            _ => Opacity::Translucent,
        }
    }

    fn set_alpha(&mut self, alpha: u8) {
        let use_color = self.state.base_color.modulate_alpha(alpha);
        if self.state.use_color != use_color {
            Rc::make_mut(&mut self.state).use_color = use_color;
            self.invalidate_self();
        }
    }

    fn alpha(&self) -> u8 {
        self.state.use_color.alpha()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn mutate(&mut self) {
        if !self.mutated {
            self.state = Rc::new((*self.state).clone());
            self.mutated = true;
        }
    }

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        Some(self.state.clone())
    }

    fn can_apply_theme(&self) -> bool {
        self.state.theme_color.is_some()
    }

    fn apply_theme(&mut self, theme: &Theme) -> Result<()> {
        let Some(attr) = self.state.theme_color else {
            return Ok(());
        };
        let color = theme.resolve_color_list(attr)?.default_color();
        let state = Rc::make_mut(&mut self.state);
        state.base_color = color;
        state.use_color = color;
        state.theme_color = None;
        Ok(())
    }
}
