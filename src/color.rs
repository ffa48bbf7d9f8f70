//! Group color generation.
//!
//! New groups get a pastel color: a random hue at fixed saturation and
//! lightness. Decorations need the same color with an alpha channel. Both
//! conversions are pure, so results are memoized by their inputs.

use lru::LruCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::num::NonZeroUsize;

/// Saturation (percent) of generated group colors.
pub const SATURATION: u8 = 70;
/// Lightness (percent) of generated group colors.
pub const LIGHTNESS: u8 = 80;

const HSL_CACHE_SIZE: usize = 360;
const ALPHA_CACHE_SIZE: usize = 256;

/// Convert HSL (hue in degrees, saturation and lightness in percent) to
/// `#rrggbb`.
pub fn hsl_to_hex(hue: u16, saturation: u8, lightness: u8) -> String {
    let h = f64::from(hue % 360);
    let s = f64::from(saturation.min(100)) / 100.0;
    let l = f64::from(lightness.min(100)) / 100.0;
    let a = s * l.min(1.0 - l);

    let channel = |n: f64| -> u8 {
        let k = (n + h / 30.0) % 12.0;
        let value = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (value * 255.0).round().clamp(0.0, 255.0) as u8
    };

    format!("#{:02x}{:02x}{:02x}", channel(0.0), channel(8.0), channel(4.0))
}

/// Append an alpha byte to a `#rrggbb` color.
///
/// `opacity` is clamped to `[0, 1]`. Input that is not `#rrggbb` is passed
/// through with the suffix appended so a bad user color never panics.
pub fn with_alpha(hex: &str, opacity: f32) -> String {
    format!("{hex}{:02x}", alpha_byte(opacity))
}

fn alpha_byte(opacity: f32) -> u8 {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        1.0
    };
    (opacity * 255.0).round() as u8
}

/// Hands out colors for new groups and caches color conversions.
#[derive(Debug)]
pub struct ColorAssigner {
    rng: StdRng,
    hsl_cache: LruCache<(u16, u8, u8), String>,
    alpha_cache: LruCache<(String, u8), String>,
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorAssigner {
    /// Create an assigner seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create an assigner with a fixed seed (reproducible colors).
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            hsl_cache: LruCache::new(
                NonZeroUsize::new(HSL_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            ),
            alpha_cache: LruCache::new(
                NonZeroUsize::new(ALPHA_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }

    /// Color for a freshly created group.
    pub fn color_for_new_group(&mut self) -> String {
        let hue: u16 = self.rng.gen_range(0..360);
        self.hsl(hue, SATURATION, LIGHTNESS)
    }

    /// Memoized [`hsl_to_hex`].
    pub fn hsl(&mut self, hue: u16, saturation: u8, lightness: u8) -> String {
        let key = (hue % 360, saturation, lightness);
        if let Some(hex) = self.hsl_cache.get(&key) {
            return hex.clone();
        }
        let hex = hsl_to_hex(key.0, key.1, key.2);
        self.hsl_cache.put(key, hex.clone());
        hex
    }

    /// Memoized [`with_alpha`], keyed by the color and the resulting alpha byte.
    pub fn with_alpha(&mut self, hex: &str, opacity: f32) -> String {
        let key = (hex.to_string(), alpha_byte(opacity));
        if let Some(rgba) = self.alpha_cache.get(&key) {
            return rgba.clone();
        }
        let rgba = format!("{hex}{:02x}", key.1);
        self.alpha_cache.put(key, rgba.clone());
        rgba
    }
}
