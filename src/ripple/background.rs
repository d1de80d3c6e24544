use std::time::Instant;

use super::{
    RippleComponent, BACKGROUND_OPACITY_DURATION, FOCUSED_OPACITY, HOVERED_OPACITY,
};
use crate::animation::{Transition, Tween};
use crate::canvas::{Canvas, Paint};
use crate::geometry::Rect;

/// The hover and focus glow drawn beneath the press ripples.
#[derive(Debug, Clone)]
pub struct RippleBackground {
    component: RippleComponent,
    opacity: Tween,
    focused: bool,
    hovered: bool,
}

impl RippleBackground {
    pub fn new(bounds: Rect, max_radius: i32, density_dpi: u32) -> Self {
        let mut component = RippleComponent::new(bounds);
        component.setup(max_radius, density_dpi);
        Self {
            component,
            opacity: Tween::new(0.0),
            focused: false,
            hovered: false,
        }
    }

    /// Re-read the radius and density, which may have changed since creation.
    pub fn setup(&mut self, max_radius: i32, density_dpi: u32) {
        self.component.setup(max_radius, density_dpi);
    }

    /// Update the glow from the host's state.
    ///
    /// Focus always shows. Hover that arrives while pressed is ignored
    /// until the press ends, so a tap does not flash the hover glow.
    pub fn set_state(&mut self, focused: bool, hovered: bool, pressed: bool, now: Instant) {
        let hovered = if self.hovered { hovered } else { hovered && !pressed };
        if self.focused != focused || self.hovered != hovered {
            self.focused = focused;
            self.hovered = hovered;
            self.on_state_changed(now);
        }
    }

    fn on_state_changed(&mut self, now: Instant) {
        let target = self.opacity_target();
        log::debug!(
            "Ripple background (focused {}, hovered {}) fading to {}",
            self.focused,
            self.hovered,
            target
        );
        self.opacity.animate_to(
            target,
            Transition::linear_ms(BACKGROUND_OPACITY_DURATION.as_millis() as u64),
            now,
        );
    }

    /// Opacity the glow is heading toward.
    pub fn opacity_target(&self) -> f32 {
        if self.focused {
            FOCUSED_OPACITY
        } else if self.hovered {
            HOVERED_OPACITY
        } else {
            0.0
        }
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        self.opacity.get(now)
    }

    /// Skip the running fade.
    pub fn jump_to_final(&mut self) {
        self.opacity.end();
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.opacity(now) > 0.0 || self.opacity.is_animating(now)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.opacity.is_animating(now)
    }

    pub fn on_bounds_change(&mut self, bounds: Rect) {
        self.component.on_bounds_change(bounds);
    }

    pub fn component(&self) -> &RippleComponent {
        &self.component
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas, paint: &Paint, now: Instant) {
        let alpha = (paint.alpha() as f32 * self.opacity(now) + 0.5).min(255.0) as u8;
        if alpha == 0 {
            log::trace!("Skipping invisible ripple background");
            return;
        }
        canvas.draw_circle(0.0, 0.0, self.component.target_radius(), &paint.with_alpha(alpha));
    }
}
