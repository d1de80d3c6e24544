use crate::state::StateSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from a packed `0xAARRGGBB` value.
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            r: ((argb >> 16) & 0xFF) as f32 / 255.0,
            g: ((argb >> 8) & 0xFF) as f32 / 255.0,
            b: (argb & 0xFF) as f32 / 255.0,
            a: ((argb >> 24) & 0xFF) as f32 / 255.0,
        }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Alpha as an 8-bit value.
    pub fn alpha(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    pub fn with_alpha(self, alpha: u8) -> Self {
        Self {
            a: alpha as f32 / 255.0,
            ..self
        }
    }

    /// Same color with its alpha scaled by `alpha / 255`.
    pub fn modulate_alpha(self, alpha: u8) -> Self {
        Self {
            a: self.a * (alpha as f32 / 255.0),
            ..self
        }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// One entry of a [`ColorStateList`]: matches when every `required` state is
/// present and no `forbidden` state is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSpec {
    pub required: StateSet,
    pub forbidden: StateSet,
}

impl StateSpec {
    pub const WILDCARD: StateSpec = StateSpec {
        required: StateSet::empty(),
        forbidden: StateSet::empty(),
    };

    pub fn new(required: StateSet, forbidden: StateSet) -> Self {
        Self {
            required,
            forbidden,
        }
    }

    pub fn matches(&self, state: StateSet) -> bool {
        state.contains(self.required) && !state.intersects(self.forbidden)
    }
}

/// Colors keyed by view state. The first matching spec wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStateList {
    entries: Vec<(StateSpec, Color)>,
    default_color: Color,
}

impl ColorStateList {
    /// A list that yields the same color for every state.
    pub fn value_of(color: Color) -> Self {
        Self {
            entries: vec![(StateSpec::WILDCARD, color)],
            default_color: color,
        }
    }

    pub fn new(entries: Vec<(StateSpec, Color)>) -> Self {
        let default_color = entries
            .iter()
            .find(|(spec, _)| *spec == StateSpec::WILDCARD)
            .or_else(|| entries.first())
            .map(|(_, color)| *color)
            .unwrap_or(Color::TRANSPARENT);
        Self {
            entries,
            default_color,
        }
    }

    pub fn color_for_state(&self, state: StateSet, fallback: Color) -> Color {
        self.entries
            .iter()
            .find(|(spec, _)| spec.matches(state))
            .map(|(_, color)| *color)
            .unwrap_or(fallback)
    }

    pub fn default_color(&self) -> Color {
        self.default_color
    }

    pub fn is_stateful(&self) -> bool {
        self.entries.len() > 1 || self.entries.iter().any(|(spec, _)| *spec != StateSpec::WILDCARD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_argb() {
        let c = Color::from_argb(0x80FF0000);
        assert_eq!(c.alpha(), 0x80);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
    }

    #[test]
    fn test_alpha_round_trip() {
        for alpha in [0u8, 1, 127, 128, 254, 255] {
            assert_eq!(Color::BLACK.with_alpha(alpha).alpha(), alpha);
        }
    }

    #[test]
    fn test_first_matching_spec_wins() {
        let pressed = Color::rgb(1.0, 0.0, 0.0);
        let disabled = Color::rgb(0.5, 0.5, 0.5);
        let normal = Color::rgb(0.0, 0.0, 1.0);
        let list = ColorStateList::new(vec![
            (StateSpec::new(StateSet::PRESSED, StateSet::empty()), pressed),
            (StateSpec::new(StateSet::empty(), StateSet::ENABLED), disabled),
            (StateSpec::WILDCARD, normal),
        ]);

        let state = StateSet::ENABLED | StateSet::PRESSED;
        assert_eq!(list.color_for_state(state, Color::BLACK), pressed);
        assert_eq!(list.color_for_state(StateSet::empty(), Color::BLACK), disabled);
        assert_eq!(list.color_for_state(StateSet::ENABLED, Color::BLACK), normal);
        assert!(list.is_stateful());
        assert_eq!(list.default_color(), normal);
    }

    #[test]
    fn test_value_of_is_not_stateful() {
        let list = ColorStateList::value_of(Color::WHITE);
        assert!(!list.is_stateful());
        assert_eq!(list.color_for_state(StateSet::PRESSED, Color::BLACK), Color::WHITE);
    }
}
