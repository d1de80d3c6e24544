use crate::density::DENSITY_DEFAULT;
use crate::ripple::MAX_RIPPLES;

/// Rendering knobs for ripple drawables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Never use render-thread property animation, even on a hardware canvas.
    pub force_software: bool,
    pub density_dpi: u32,
    max_ripples: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            force_software: false,
            density_dpi: DENSITY_DEFAULT,
            max_ripples: MAX_RIPPLES,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force_software(mut self, force_software: bool) -> Self {
        self.force_software = force_software;
        self
    }

    /// A density of 0 is ignored.
    pub fn density_dpi(mut self, density_dpi: u32) -> Self {
        if density_dpi == 0 {
            log::warn!("Ignoring zero density in render config");
        } else {
            self.density_dpi = density_dpi;
        }
        self
    }

    /// Cap on exiting ripples, at most [`MAX_RIPPLES`].
    pub fn max_ripples(mut self, max_ripples: usize) -> Self {
        self.max_ripples = max_ripples.min(MAX_RIPPLES);
        self
    }

    pub fn ripple_limit(&self) -> usize {
        self.max_ripples
    }
}
