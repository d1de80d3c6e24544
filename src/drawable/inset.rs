use super::{Drawable, DrawableBase, DrawableWrapper, WrapperKind};
use crate::density::scale_from_density;
use crate::error::{DrawableError, Result};
use crate::geometry::Rect;
use crate::state::Opacity;
use crate::theme::{Theme, ThemeAttr, ThemeValue};

/// One edge of an inset: a fraction of the bounds plus a pixel dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InsetValue {
    pub fraction: f32,
    pub dimension: i32,
}

impl InsetValue {
    pub const ZERO: InsetValue = InsetValue {
        fraction: 0.0,
        dimension: 0,
    };

    pub fn pixels(dimension: i32) -> Self {
        Self {
            fraction: 0.0,
            dimension,
        }
    }

    pub fn fraction(fraction: f32) -> Self {
        Self {
            fraction,
            dimension: 0,
        }
    }

    /// Resolved inset for an edge of `bound_size` pixels.
    pub fn resolve(&self, bound_size: f32) -> i32 {
        (bound_size * self.fraction) as i32 + self.dimension
    }

    /// Fractions are density independent; only the dimension is rescaled.
    pub fn scale(&mut self, source: u32, target: u32) {
        self.dimension = scale_from_density(self.dimension, source, target);
    }
}

/// Shrinks the child's bounds on each edge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Inset {
    pub left: InsetValue,
    pub top: InsetValue,
    pub right: InsetValue,
    pub bottom: InsetValue,
    /// Edges still waiting on a theme, left, top, right, bottom
    pub theme_attrs: [Option<ThemeAttr>; 4],
}

impl Inset {
    pub fn new(left: InsetValue, top: InsetValue, right: InsetValue, bottom: InsetValue) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            theme_attrs: [None; 4],
        }
    }

    pub fn uniform(value: InsetValue) -> Self {
        Self::new(value, value, value, value)
    }

    /// Insets resolved from the standard inset attributes once a theme is applied.
    pub fn themed() -> Self {
        Self {
            theme_attrs: [
                Some(ThemeAttr::INSET_LEFT),
                Some(ThemeAttr::INSET_TOP),
                Some(ThemeAttr::INSET_RIGHT),
                Some(ThemeAttr::INSET_BOTTOM),
            ],
            ..Self::default()
        }
    }

    /// Pixel insets for the given bounds, left, top, right, bottom.
    pub fn resolve(&self, bounds: Rect) -> [i32; 4] {
        [
            self.left.resolve(bounds.width),
            self.top.resolve(bounds.height),
            self.right.resolve(bounds.width),
            self.bottom.resolve(bounds.height),
        ]
    }

    fn edges_mut(&mut self) -> [&mut InsetValue; 4] {
        [
            &mut self.left,
            &mut self.top,
            &mut self.right,
            &mut self.bottom,
        ]
    }
}

fn theme_inset(theme: &Theme, attr: ThemeAttr) -> Result<Option<InsetValue>> {
    match theme.get(attr) {
        None => Ok(None),
        Some(ThemeValue::Fraction(fraction)) => Ok(Some(InsetValue::fraction(*fraction))),
        Some(ThemeValue::Dimension(px)) => Ok(Some(InsetValue::pixels(px.round() as i32))),
        Some(ThemeValue::Integer(px)) => Ok(Some(InsetValue::pixels(*px))),
        Some(_) => {
            log::warn!("Inset attribute {:?} is not a dimension or fraction", attr);
            Err(DrawableError::ThemeTypeMismatch {
                attr,
                expected: "dimension or fraction",
            })
        }
    }
}

impl WrapperKind for Inset {
    fn child_bounds(&self, _child: &dyn Drawable, base: &DrawableBase) -> Rect {
        let bounds = base.bounds();
        let [left, top, right, bottom] = self.resolve(bounds);
        let l = bounds.left() + left as f32;
        let t = bounds.top() + top as f32;
        let r = (bounds.right() - right as f32).max(l);
        let b = (bounds.bottom() - bottom as f32).max(t);
        Rect::from_ltrb(l, t, r, b)
    }

    fn opacity(&self, child: &dyn Drawable, base: &DrawableBase) -> Opacity {
        let opacity = child.opacity();
        let insets = self.resolve(base.bounds());
        if opacity == Opacity::Opaque && insets.iter().any(|inset| *inset > 0) {
            return Opacity::Translucent;
        }
        opacity
    }

    fn on_density_changed(&mut self, source: u32, target: u32) {
        for edge in self.edges_mut() {
            edge.scale(source, target);
        }
    }

    fn can_apply_theme(&self) -> bool {
        self.theme_attrs.iter().any(Option::is_some)
    }

    fn apply_theme(&mut self, theme: &Theme) -> Result<()> {
        let attrs = self.theme_attrs;
        for (index, attr) in attrs.iter().enumerate() {
            let Some(attr) = *attr else { continue };
            if let Some(value) = theme_inset(theme, attr)? {
                *self.edges_mut()[index] = value;
                self.theme_attrs[index] = None;
            }
        }
        Ok(())
    }

    fn intrinsic_width(&self, child: Option<&dyn Drawable>) -> Option<f32> {
        let width = child?.intrinsic_width()?;
        let fraction = self.left.fraction + self.right.fraction;
        if fraction >= 1.0 {
            return None;
        }
        Some((width / (1.0 - fraction)).trunc() + (self.left.dimension + self.right.dimension) as f32)
    }

    fn intrinsic_height(&self, child: Option<&dyn Drawable>) -> Option<f32> {
        let height = child?.intrinsic_height()?;
        let fraction = self.top.fraction + self.bottom.fraction;
        if fraction >= 1.0 {
            return None;
        }
        Some((height / (1.0 - fraction)).trunc() + (self.top.dimension + self.bottom.dimension) as f32)
    }
}

pub type InsetDrawable = DrawableWrapper<Inset>;

impl DrawableWrapper<Inset> {
    /// Inset `drawable` by the same number of pixels on every edge.
    pub fn inset_pixels(drawable: impl Drawable, inset: i32) -> Self {
        Self::new(
            Inset::uniform(InsetValue::pixels(inset)),
            Some(Box::new(drawable)),
        )
    }

    /// Inset `drawable` by a fraction of the bounds on every edge.
    pub fn inset_fraction(drawable: impl Drawable, fraction: f32) -> Self {
        Self::new(
            Inset::uniform(InsetValue::fraction(fraction)),
            Some(Box::new(drawable)),
        )
    }

    /// Current pixel insets, left, top, right, bottom.
    pub fn insets(&self) -> [i32; 4] {
        self.kind().resolve(self.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::density::DENSITY_DEFAULT;
    use crate::drawable::ColorDrawable;

    #[test]
    fn test_child_bounds_shrink() {
        let mut inset = InsetDrawable::new(
            Inset::new(
                InsetValue::pixels(10),
                InsetValue::fraction(0.1),
                InsetValue::pixels(5),
                InsetValue {
                    fraction: 0.1,
                    dimension: 2,
                },
            ),
            Some(Box::new(ColorDrawable::new(Color::WHITE))),
        );
        inset.set_bounds(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(inset.insets(), [10, 5, 5, 7]);
        assert_eq!(
            inset.drawable().unwrap().bounds(),
            Rect::from_ltrb(10.0, 5.0, 95.0, 43.0)
        );
    }

    #[test]
    fn test_opaque_child_becomes_translucent() {
        let mut inset = InsetDrawable::inset_pixels(ColorDrawable::new(Color::WHITE), 4);
        inset.set_bounds(Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(inset.opacity(), Opacity::Translucent);

        let mut flush = InsetDrawable::inset_pixels(ColorDrawable::new(Color::WHITE), 0);
        flush.set_bounds(Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(flush.opacity(), Opacity::Opaque);
    }

    #[test]
    fn test_density_round_trip() {
        let mut inset = InsetDrawable::new(
            Inset::new(
                InsetValue::pixels(7),
                InsetValue::fraction(0.25),
                InsetValue::pixels(13),
                InsetValue::pixels(1),
            ),
            Some(Box::new(ColorDrawable::new(Color::WHITE))),
        );
        inset.set_density(320);
        assert_eq!(inset.kind().left.dimension, 14);
        assert_eq!(inset.kind().top.fraction, 0.25);
        inset.set_density(DENSITY_DEFAULT);
        let kind = inset.kind();
        assert_eq!(
            [kind.left.dimension, kind.right.dimension, kind.bottom.dimension],
            [7, 13, 1]
        );
    }

    #[test]
    fn test_theme_resolution() {
        let mut inset = InsetDrawable::new(
            Inset::themed(),
            Some(Box::new(ColorDrawable::new(Color::WHITE))),
        );
        assert!(inset.can_apply_theme());
        let theme = Theme::new()
            .set(ThemeAttr::INSET_LEFT, ThemeValue::Dimension(3.0))
            .set(ThemeAttr::INSET_TOP, ThemeValue::Fraction(0.5))
            .set(ThemeAttr::INSET_RIGHT, ThemeValue::Integer(4))
            .set(ThemeAttr::INSET_BOTTOM, ThemeValue::Integer(0));
        inset.apply_theme(&theme).unwrap();
        assert!(!inset.can_apply_theme());
        assert_eq!(inset.kind().left, InsetValue::pixels(3));
        assert_eq!(inset.kind().top, InsetValue::fraction(0.5));
    }

    #[test]
    fn test_theme_type_mismatch() {
        let mut inset = InsetDrawable::new(Inset::themed(), None);
        let theme = Theme::new().set(ThemeAttr::INSET_LEFT, ThemeValue::Color(Color::WHITE));
        assert!(matches!(
            inset.apply_theme(&theme),
            Err(DrawableError::ThemeTypeMismatch { .. })
        ));
        assert!(inset.can_apply_theme());
    }

    #[test]
    fn test_intrinsic_size_without_child_size() {
        let inset = InsetDrawable::inset_pixels(ColorDrawable::new(Color::WHITE), 4);
        assert_eq!(inset.intrinsic_width(), None);
    }
}
