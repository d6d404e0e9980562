//! Unit conversion from editor space to printer dots
//!
//! The editor canvas works in reference pixels at 96 per inch; label stock is
//! measured in millimeters. Every emitter goes through these functions so that
//! the same template lands on the same dots in every printer language.
//!
//! Rounding happens exactly once per value (half away from zero).

/// Editor canvas density (reference pixels per inch)
pub const REFERENCE_DPI: f64 = 96.0;

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Convert millimeters to printer dots
pub fn to_dots(value_mm: f64, dpi: u32) -> i64 {
    (value_mm / MM_PER_INCH * dpi as f64).round() as i64
}

/// Convert reference pixels to printer dots
pub fn px_to_dots(value_px: f64, dpi: u32) -> i64 {
    (value_px * dpi as f64 / REFERENCE_DPI).round() as i64
}

/// Convert an editor font size (reference pixels) to printer dots
pub fn font_size_to_dots(size_px: f64, dpi: u32) -> i64 {
    px_to_dots(size_px, dpi)
}

/// Quarter-turn rotation as understood by thermal printers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Normalize degrees into [0, 360) and snap to the nearest quarter turn
    pub fn from_degrees(degrees: Option<f64>) -> Self {
        let Some(d) = degrees.filter(|d| d.is_finite()) else {
            return Rotation::None;
        };
        let quarter = (d.rem_euclid(360.0) / 90.0).round() as i64 % 4;
        match quarter {
            1 => Rotation::Cw90,
            2 => Rotation::Cw180,
            3 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// True when the element's width runs along the printer's Y axis
    pub fn is_sideways(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}
