//! Strongly-typed primitives shared by the canvas and the plan renderer.
//!
//! Plan geometry is `glam::DVec2` in meters. Everything that crosses the
//! plan/page boundary goes through [`Scale`], so there is exactly one place
//! where meters turn into page pixels.

use std::fmt;
use std::str::FromStr;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities (user-provided numbers).
pub fn finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Page pixels per plan meter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    px_per_meter: f64,
}

impl Scale {
    /// Identity scale, used before a drawing area is configured.
    pub const UNIT: Scale = Scale { px_per_meter: 1.0 };

    /// Create a Scale with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(px_per_meter: f64) -> Result<Self, NumericError> {
        let px_per_meter = finite(px_per_meter)?;
        if px_per_meter == 0.0 {
            Err(NumericError::Zero)
        } else if px_per_meter < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Scale { px_per_meter })
        }
    }

    /// Pixels per meter.
    #[inline]
    pub fn factor(self) -> f64 {
        self.px_per_meter
    }

    /// Convert a page length to plan meters.
    #[inline]
    pub fn meters(self, px: f64) -> f64 {
        px / self.px_per_meter
    }
}

/// Packed color, most to least significant byte: transparency, red, green, blue.
///
/// `0x00FF0000` is opaque red, `0xFF000000` is fully transparent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

pub const BLACK: Color = Color(0x000000);
pub const WHITE: Color = Color(0xFFFFFF);
pub const GREY: Color = Color(0xA0A0A0);
pub const LIGHT_GREY: Color = Color(0xE0E0E0);
pub const RED: Color = Color(0xFF0000);
pub const GREEN: Color = Color(0x00FF00);
pub const BLUE: Color = Color(0x0000FF);
pub const PINK: Color = Color(0xFFC0CB);
pub const TRANSPARENT: Color = Color(0xFF000000);

impl Default for Color {
    /// Magenta, so an unset color is obvious on the page.
    fn default() -> Self {
        Color(0xFF00FF)
    }
}

impl Color {
    pub fn red(self) -> f64 {
        f64::from((self.0 >> 16) & 0xFF) / 255.0
    }

    pub fn green(self) -> f64 {
        f64::from((self.0 >> 8) & 0xFF) / 255.0
    }

    pub fn blue(self) -> f64 {
        f64::from(self.0 & 0xFF) / 255.0
    }

    /// Opacity in `[0, 1]`; the stored byte is transparency.
    pub fn alpha(self) -> f64 {
        f64::from(0xFF - ((self.0 >> 24) & 0xFF)) / 255.0
    }

    pub fn is_opaque(self) -> bool {
        self.0 >> 24 == 0
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let named = match lower.as_str() {
            "black" => Some(BLACK),
            "white" => Some(WHITE),
            "grey" | "gray" => Some(GREY),
            "lightgrey" | "lightgray" => Some(LIGHT_GREY),
            "red" => Some(RED),
            "green" => Some(GREEN),
            "blue" => Some(BLUE),
            "pink" => Some(PINK),
            "transparent" => Some(TRANSPARENT),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        if let Some(hex) = lower.strip_prefix('#') {
            if hex.len() == 6 {
                return u32::from_str_radix(hex, 16)
                    .map(Color)
                    .map_err(|e| e.to_string());
            }
        } else if let Some(hex) = lower.strip_prefix("0x") {
            if hex.len() == 6 || hex.len() == 8 {
                return u32::from_str_radix(hex, 16)
                    .map(Color)
                    .map_err(|e| e.to_string());
            }
        }
        Err(format!("unknown color {s:?}"))
    }
}

/// Line end style
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    /// Operand of the PDF `J` operator.
    pub fn pdf_style(self) -> i64 {
        match self {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        }
    }
}

/// Stroke parameters. Width and dash lengths are page pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub dash: Option<Vec<f64>>,
    pub cap: LineCap,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
            cap: LineCap::Butt,
        }
    }

    pub fn dashed(mut self, pattern: Vec<f64>) -> Self {
        self.dash = Some(pattern);
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    #[default]
    Sans,
    Monospace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FontSlant {
    #[default]
    Upright,
    Italic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font selection for labels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct FontStyle {
    pub family: FontFamily,
    pub slant: FontSlant,
    pub weight: FontWeight,
}

impl FontStyle {
    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.slant = FontSlant::Italic;
        self
    }

    pub fn monospace(mut self) -> Self {
        self.family = FontFamily::Monospace;
        self
    }

    /// PDF standard-14 base font for this style.
    pub fn base_font(self) -> &'static str {
        use FontFamily::*;
        use FontSlant::*;
        use FontWeight::*;
        match (self.family, self.weight, self.slant) {
            (Sans, Normal, Upright) => "Helvetica",
            (Sans, Bold, Upright) => "Helvetica-Bold",
            (Sans, Normal, Italic) => "Helvetica-Oblique",
            (Sans, Bold, Italic) => "Helvetica-BoldOblique",
            (Monospace, Normal, Upright) => "Courier",
            (Monospace, Bold, Upright) => "Courier-Bold",
            (Monospace, Normal, Italic) => "Courier-Oblique",
            (Monospace, Bold, Italic) => "Courier-BoldOblique",
        }
    }
}
