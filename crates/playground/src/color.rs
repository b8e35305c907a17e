//! RGB to hex and HSL conversion
//!
//! Channels are `u8`, so every `Rgb` is in range by construction. HSL comes
//! in two flavours: `Hsl` is the rounded, display-ready form (degrees and
//! whole percents), `PreciseHsl` keeps the unrounded values so a conversion
//! back to RGB is lossless.

use std::fmt;

use crate::error::{PlaygroundError, PlaygroundResult};

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Rounded HSL: hue in [0, 360), saturation and lightness in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hsl {
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

/// Unrounded HSL: hue in degrees, saturation and lightness as fractions
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PreciseHsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse three slider values, e.g. `("102", "126", "234")`
    pub fn from_channel_strs(r: &str, g: &str, b: &str) -> PlaygroundResult<Self> {
        Ok(Self {
            r: parse_channel("red", r)?,
            g: parse_channel("green", g)?,
            b: parse_channel("blue", b)?,
        })
    }

    /// `#rrggbb`, lowercase
    pub fn to_hex(self) -> String {
        rgb_to_hex(self.r, self.g, self.b)
    }

    pub fn to_hsl(self) -> Hsl {
        rgb_to_hsl(self.r, self.g, self.b)
    }

    pub fn to_hsl_precise(self) -> PreciseHsl {
        rgb_to_hsl_precise(self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.h, self.s, self.l)
    }
}

impl Hsl {
    pub fn to_rgb(self) -> Rgb {
        hsl_to_rgb(self)
    }
}

impl PreciseHsl {
    /// Convert back to RGB; exact up to the final channel rounding
    pub fn to_rgb(self) -> Rgb {
        if self.s == 0.0 {
            let v = to_channel(self.l);
            return Rgb::new(v, v, v);
        }

        let q = if self.l < 0.5 {
            self.l * (1.0 + self.s)
        } else {
            self.l + self.s - self.l * self.s
        };
        let p = 2.0 * self.l - q;
        let h = self.h / 360.0;

        Rgb::new(
            to_channel(hue_to_channel(p, q, h + 1.0 / 3.0)),
            to_channel(hue_to_channel(p, q, h)),
            to_channel(hue_to_channel(p, q, h - 1.0 / 3.0)),
        )
    }

    /// Round to display precision
    pub fn round(self) -> Hsl {
        let h = self.h.round() as u16;
        Hsl {
            // 359.5 and above rounds up to a full turn
            h: if h >= 360 { 0 } else { h },
            s: (self.s * 100.0).round() as u8,
            l: (self.l * 100.0).round() as u8,
        }
    }
}

/// Format channels as `#rrggbb`; always seven characters
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Convert to HSL rounded to whole degrees and percents
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    rgb_to_hsl_precise(r, g, b).round()
}

/// Convert to HSL without rounding
pub fn rgb_to_hsl_precise(r: u8, g: u8, b: u8) -> PreciseHsl {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return PreciseHsl { h: 0.0, s: 0.0, l };
    }

    let delta = max - min;
    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let sector = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let turns = sector / 6.0;

    // Scale from turns; `sector * 60.0` rounds some half-degree ties differently
    PreciseHsl { h: turns * 360.0, s, l }
}

/// Convert rounded HSL back to RGB
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    PreciseHsl {
        h: f64::from(hsl.h),
        s: f64::from(hsl.s) / 100.0,
        l: f64::from(hsl.l) / 100.0,
    }
    .to_rgb()
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_channel(fraction: f64) -> u8 {
    (fraction * 255.0).round().clamp(0.0, 255.0) as u8
}

fn parse_channel(channel: &'static str, value: &str) -> PlaygroundResult<u8> {
    value.trim().parse::<u8>().map_err(|_| PlaygroundError::InvalidChannel {
        channel,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_channel_error(a: Rgb, b: Rgb) -> u8 {
        a.r.abs_diff(b.r).max(a.g.abs_diff(b.g)).max(a.b.abs_diff(b.b))
    }

    /// Every fifth value per channel, both ends included
    fn sample_grid() -> impl Iterator<Item = Rgb> {
        let values: Vec<u8> = (0..=255u8).step_by(5).collect();
        let mut colors = Vec::new();
        for &r in &values {
            for &g in &values {
                for &b in &values {
                    colors.push(Rgb::new(r, g, b));
                }
            }
        }
        colors.into_iter()
    }

    #[test]
    fn test_hex() {
        assert_eq!(rgb_to_hex(0, 0, 0), "#000000");
        assert_eq!(rgb_to_hex(255, 255, 255), "#ffffff");
        assert_eq!(rgb_to_hex(102, 126, 234), "#667eea");
        assert_eq!(rgb_to_hex(1, 2, 3), "#010203");
    }

    #[test]
    fn test_hex_is_always_seven_chars() {
        for color in sample_grid() {
            let hex = color.to_hex();
            assert_eq!(hex.len(), 7);
            assert!(hex.starts_with('#'));
        }
    }

    #[test]
    fn test_hsl_known_values() {
        assert_eq!(rgb_to_hsl(255, 0, 0), Hsl { h: 0, s: 100, l: 50 });
        assert_eq!(rgb_to_hsl(0, 0, 0), Hsl { h: 0, s: 0, l: 0 });
        assert_eq!(rgb_to_hsl(255, 255, 255), Hsl { h: 0, s: 0, l: 100 });
        assert_eq!(rgb_to_hsl(0, 255, 0), Hsl { h: 120, s: 100, l: 50 });
        assert_eq!(rgb_to_hsl(0, 0, 255), Hsl { h: 240, s: 100, l: 50 });
        assert_eq!(rgb_to_hsl(102, 126, 234), Hsl { h: 229, s: 76, l: 66 });
    }

    #[test]
    fn test_hue_ties_round_like_turn_scaling() {
        // Both sit a hair below a half degree when computed as turns * 360
        assert_eq!(rgb_to_hsl(0, 13, 40).h, 220);
        assert_eq!(rgb_to_hsl(0, 17, 24).h, 197);
    }

    #[test]
    fn test_hue_wraps_below_full_turn() {
        // Hue is 359.76 before rounding
        assert_eq!(rgb_to_hsl(255, 0, 1).h, 0);
        for color in sample_grid() {
            let hsl = color.to_hsl();
            assert!(hsl.h < 360);
            assert!(hsl.s <= 100);
            assert!(hsl.l <= 100);
        }
    }

    #[test]
    fn test_precise_round_trip() {
        for color in sample_grid() {
            let back = color.to_hsl_precise().to_rgb();
            assert!(max_channel_error(color, back) <= 1, "{} came back as {}", color, back);
        }
    }

    #[test]
    fn test_rounded_round_trip_stays_close() {
        for color in sample_grid() {
            let back = color.to_hsl().to_rgb();
            assert!(max_channel_error(color, back) <= 5, "{} came back as {}", color, back);
        }
    }

    #[test]
    fn test_grays_round_trip_exactly() {
        for v in 0..=255u8 {
            let gray = Rgb::new(v, v, v);
            assert_eq!(gray.to_hsl_precise().to_rgb(), gray);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgb::new(102, 126, 234).to_string(), "rgb(102, 126, 234)");
        assert_eq!(Hsl { h: 229, s: 76, l: 66 }.to_string(), "hsl(229, 76%, 66%)");
    }

    #[test]
    fn test_from_channel_strs() {
        assert_eq!(Rgb::from_channel_strs("102", " 126", "234").unwrap(), Rgb::new(102, 126, 234));
        assert!(matches!(
            Rgb::from_channel_strs("0", "256", "0"),
            Err(PlaygroundError::InvalidChannel { channel: "green", .. })
        ));
        assert!(Rgb::from_channel_strs("1.5", "0", "0").is_err());
        assert!(Rgb::from_channel_strs("0", "0", "-1").is_err());
        assert!(Rgb::from_channel_strs("", "0", "0").is_err());
    }
}
