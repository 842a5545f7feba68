//! Control values read by the render loop every frame.

use serde::{Deserialize, Serialize};

/// Linear RGB triple in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([1.0, 1.0, 1.0]);

    pub fn r(self) -> f32 {
        self.0[0]
    }

    pub fn g(self) -> f32 {
        self.0[1]
    }

    pub fn b(self) -> f32 {
        self.0[2]
    }
}

/// Parses `#rrggbb` or `rrggbb` (any case).
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let n = u32::from_str_radix(digits, 16).ok()?;
    let channel = |shift: u32| ((n >> shift) & 0xff) as f32 / 255.0;
    Some(Rgb([channel(16), channel(8), channel(0)]))
}

/// Like [`parse_hex_color`], falling back to white.
pub fn hex_to_rgb01(hex: &str) -> Rgb {
    parse_hex_color(hex).unwrap_or(Rgb::WHITE)
}

/// Parses a strength slider value. Non-numeric and non-finite input is rejected.
pub fn parse_strength(value: &str) -> Option<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlDefaults {
    #[serde(default = "default_tint")]
    pub tint: String,
    #[serde(default)]
    pub strength: f32,
}

impl Default for ControlDefaults {
    fn default() -> Self {
        Self {
            tint: default_tint(),
            strength: 0.0,
        }
    }
}

fn default_tint() -> String {
    "#ffffff".to_string()
}

/// Current tint/strength as the user last set them.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    tint_hex: String,
    strength: f32,
    defaults: ControlDefaults,
}

impl Controls {
    pub fn new(defaults: ControlDefaults) -> Self {
        Self {
            tint_hex: defaults.tint.clone(),
            strength: defaults.strength,
            defaults,
        }
    }

    pub fn reset(&mut self) {
        self.tint_hex = self.defaults.tint.clone();
        self.strength = self.defaults.strength;
    }

    pub fn set_tint_hex(&mut self, hex: impl Into<String>) {
        self.tint_hex = hex.into();
    }

    pub fn set_strength(&mut self, strength: f32) {
        if strength.is_finite() {
            self.strength = strength;
        }
    }

    pub fn tint_hex(&self) -> &str {
        &self.tint_hex
    }

    pub fn tint(&self) -> Rgb {
        hex_to_rgb01(&self.tint_hex)
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn strength_readout(&self) -> String {
        format!("{:.2}", self.strength)
    }

    pub fn tint_readout(&self) -> String {
        let Rgb([r, g, b]) = self.tint();
        format!("({r:.2}, {g:.2}, {b:.2})")
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(ControlDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing_accepts_both_forms() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Rgb([1.0, 0.0, 0.0])));
        assert_eq!(parse_hex_color("00FF00"), Some(Rgb([0.0, 1.0, 0.0])));
        assert_eq!(parse_hex_color("#0000ff"), Some(Rgb([0.0, 0.0, 1.0])));
    }

    #[test]
    fn bad_hex_falls_back_to_white() {
        for bad in ["", "#fff", "#gg0000", "#ff00001", "red", "#+f0000"] {
            assert_eq!(parse_hex_color(bad), None, "{bad}");
            assert_eq!(hex_to_rgb01(bad), Rgb::WHITE, "{bad}");
        }
    }

    #[test]
    fn strength_parsing() {
        assert_eq!(parse_strength("0.5"), Some(0.5));
        assert_eq!(parse_strength(" 1 "), Some(1.0));
        assert_eq!(parse_strength("abc"), None);
        assert_eq!(parse_strength("NaN"), None);
        assert_eq!(parse_strength("inf"), None);
    }

    #[test]
    fn readouts_use_two_decimals() {
        let mut c = Controls::default();
        c.set_tint_hex("#ff8000");
        c.set_strength(0.5);
        assert_eq!(c.strength_readout(), "0.50");
        assert_eq!(c.tint_readout(), "(1.00, 0.50, 0.00)");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut c = Controls::new(ControlDefaults {
            tint: "#00ff00".into(),
            strength: 0.25,
        });
        c.set_tint_hex("#123456");
        c.set_strength(0.9);
        c.set_strength(f32::NAN);
        assert_eq!(c.strength(), 0.9);
        c.reset();
        assert_eq!(c.tint_hex(), "#00ff00");
        assert_eq!(c.strength(), 0.25);
    }
}
