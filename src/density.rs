//! Display density helpers.
//!
//! Densities are dots-per-inch; [`DENSITY_DEFAULT`] is the baseline where one
//! density-independent pixel equals one physical pixel.

use crate::error::{DrawableError, Result};

pub const DENSITY_DEFAULT: u32 = 160;

/// Scale factor between a density and the baseline density.
pub fn density_scale(density_dpi: u32) -> f32 {
    density_dpi as f32 / DENSITY_DEFAULT as f32
}

/// Reject a zero density before it ends up as a divisor.
pub fn validate_density(density_dpi: u32) -> Result<u32> {
    if density_dpi == 0 {
        log::warn!("Rejected zero density");
        return Err(DrawableError::InvalidDensity(density_dpi));
    }
    Ok(density_dpi)
}

/// Pick the density a drawable should use: an explicit override wins,
/// then the display density, then the baseline.
pub fn resolve_density(display_dpi: Option<u32>, override_dpi: u32) -> u32 {
    if override_dpi != 0 {
        return override_dpi;
    }
    match display_dpi {
        Some(dpi) if dpi != 0 => dpi,
        _ => DENSITY_DEFAULT,
    }
}

/// Rescale a pixel dimension, rounding half up.
///
/// Going 160 -> 320 -> 160 returns the original value.
pub fn scale_from_density(pixels: i32, source: u32, target: u32) -> i32 {
    if source == target || source == 0 {
        return pixels;
    }
    let source = source as i64;
    let scaled = (pixels as i64 * target as i64 + (source >> 1)) / source;
    scaled as i32
}

/// Rescale a size. A non-zero size never collapses to zero.
pub fn scale_size_from_density(pixels: i32, source: u32, target: u32) -> i32 {
    if pixels == 0 || source == target || source == 0 {
        return pixels;
    }
    let result = (pixels as f32 * target as f32 / source as f32).round() as i32;
    if result != 0 {
        result
    } else if pixels > 0 {
        1
    } else {
        -1
    }
}

pub fn scale_float_from_density(pixels: f32, source: u32, target: u32) -> f32 {
    if source == target || source == 0 {
        return pixels;
    }
    pixels * target as f32 / source as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_160_320() {
        for value in [-13, -1, 0, 1, 7, 10, 33, 1000] {
            let up = scale_from_density(value, 160, 320);
            let back = scale_from_density(up, 320, 160);
            assert!((back - value).abs() <= 1, "{value} -> {up} -> {back}");
        }
    }

    #[test]
    fn test_round_trip_odd_ratio() {
        for value in [1, 3, 7, 11, 250] {
            let up = scale_from_density(value, 160, 240);
            let back = scale_from_density(up, 240, 160);
            assert!((back - value).abs() <= 1);
        }
    }

    #[test]
    fn test_size_never_collapses() {
        assert_eq!(scale_size_from_density(1, 480, 120), 1);
        assert_eq!(scale_size_from_density(-1, 480, 120), -1);
        assert_eq!(scale_size_from_density(0, 480, 120), 0);
        assert_eq!(scale_size_from_density(48, 160, 480), 144);
    }

    #[test]
    fn test_resolve_density() {
        assert_eq!(resolve_density(Some(480), 0), 480);
        assert_eq!(resolve_density(Some(480), 240), 240);
        assert_eq!(resolve_density(None, 0), DENSITY_DEFAULT);
        assert!(validate_density(0).is_err());
    }
}
