use crate::density::density_scale;
use crate::geometry::Rect;

/// Geometry shared by the ripple foreground and background.
///
/// The hotspot bounds belong to the owning drawable; the component keeps a
/// copy that the owner refreshes through [`on_bounds_change`].
///
/// [`on_bounds_change`]: RippleComponent::on_bounds_change
#[derive(Debug, Clone, PartialEq)]
pub struct RippleComponent {
    bounds: Rect,
    target_radius: f32,
    density_scale: f32,
    has_max_radius: bool,
}

impl RippleComponent {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            target_radius: Self::covering_radius(&bounds),
            density_scale: 1.0,
            has_max_radius: false,
        }
    }

    /// Radius of the circle centered on `bounds` that covers all of it.
    pub fn covering_radius(bounds: &Rect) -> f32 {
        let half_width = bounds.width / 2.0;
        let half_height = bounds.height / 2.0;
        (half_width * half_width + half_height * half_height).sqrt()
    }

    /// Pin the target radius to `max_radius` pixels, or derive it from the
    /// bounds when `max_radius` is negative.
    pub fn setup(&mut self, max_radius: i32, density_dpi: u32) {
        if max_radius >= 0 {
            self.has_max_radius = true;
            self.target_radius = max_radius as f32;
        } else {
            self.has_max_radius = false;
            self.target_radius = Self::covering_radius(&self.bounds);
        }
        self.density_scale = density_scale(density_dpi);
    }

    /// Take new hotspot bounds. Returns true if the target radius changed.
    pub fn on_bounds_change(&mut self, bounds: Rect) -> bool {
        self.bounds = bounds;
        if self.has_max_radius {
            return false;
        }
        let radius = Self::covering_radius(&bounds);
        let changed = radius != self.target_radius;
        self.target_radius = radius;
        changed
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn target_radius(&self) -> f32 {
        self.target_radius
    }

    pub fn density_scale(&self) -> f32 {
        self.density_scale
    }

    pub fn has_max_radius(&self) -> bool {
        self.has_max_radius
    }

    /// Square that contains anything drawn around the local origin.
    pub fn local_bounds(&self) -> Rect {
        let r = self.target_radius.ceil();
        Rect::from_ltrb(-r, -r, r, r)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_radius_covers_bounds() {
        let mut component = RippleComponent::new(Rect::new(0.0, 0.0, 60.0, 80.0));
        component.setup(-1, 160);
        assert_abs_diff_eq!(component.target_radius(), 50.0);
        assert_eq!(component.local_bounds(), Rect::from_ltrb(-50.0, -50.0, 50.0, 50.0));
    }

    #[test]
    fn test_max_radius_ignores_bounds() {
        let mut component = RippleComponent::new(Rect::new(0.0, 0.0, 60.0, 80.0));
        component.setup(12, 320);
        assert_eq!(component.target_radius(), 12.0);
        assert_eq!(component.density_scale(), 2.0);
        assert!(!component.on_bounds_change(Rect::new(0.0, 0.0, 500.0, 500.0)));
        assert_eq!(component.target_radius(), 12.0);
        assert_eq!(component.bounds(), Rect::new(0.0, 0.0, 500.0, 500.0));
    }

    #[test]
    fn test_bounds_change_recomputes() {
        let mut component = RippleComponent::new(Rect::EMPTY);
        component.setup(-1, 160);
        assert!(component.on_bounds_change(Rect::new(0.0, 0.0, 6.0, 8.0)));
        assert_abs_diff_eq!(component.target_radius(), 5.0);
        assert_eq!(component.local_bounds(), Rect::from_ltrb(-5.0, -5.0, 5.0, 5.0));
    }
}
