//! Thermal print configuration
//!
//! | field | default | notes |
//! |-------|---------|-------|
//! | language | `zpl` | `zpl`/`a`, `epl`/`b`, `tspl`/`c` (case-insensitive) |
//! | dpi | 203 | must be > 0 |
//! | labelWidth / labelHeight | 40 / 30 | millimeters, must be > 0 |
//! | speed | none | 1-10, clamped per language |
//! | darkness | none | language-specific scale |
//! | copies | 1 | 1 to 99,999,999 |
//! | gap | 2 | millimeters between labels |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LabelError, LabelResult};
use crate::model::{LabelTemplate, LengthUnit};
use crate::units::{MM_PER_INCH, REFERENCE_DPI};

/// Default inter-label gap in millimeters
pub const DEFAULT_GAP_MM: f64 = 2.0;

/// Upper bound of a single job's copy count (ZPL `^PQ` limit)
pub const MAX_COPIES: u32 = 99_999_999;

/// Supported printer command languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterLanguage {
    /// Zebra Programming Language
    Zpl,
    /// Eltron Programming Language
    Epl,
    /// TSC Printer Language
    Tspl,
}

impl PrinterLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrinterLanguage::Zpl => "zpl",
            PrinterLanguage::Epl => "epl",
            PrinterLanguage::Tspl => "tspl",
        }
    }
}

impl fmt::Display for PrinterLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrinterLanguage {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zpl" | "a" => Ok(PrinterLanguage::Zpl),
            "epl" | "b" => Ok(PrinterLanguage::Epl),
            "tspl" | "c" => Ok(PrinterLanguage::Tspl),
            other => Err(LabelError::InvalidConfig(format!(
                "unknown printer language: {:?}",
                other
            ))),
        }
    }
}

/// Target printer profile for one generation call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThermalPrintConfig {
    /// Language selector, parsed during validation
    #[serde(alias = "format")]
    pub language: String,
    pub dpi: u32,
    /// Label width in millimeters
    pub label_width: f64,
    /// Label height in millimeters
    pub label_height: f64,
    #[serde(default)]
    pub speed: Option<u8>,
    #[serde(default)]
    pub darkness: Option<u8>,
    #[serde(default)]
    pub copies: Option<u32>,
    /// Gap between labels in millimeters
    #[serde(default)]
    pub gap: Option<f64>,
}

impl Default for ThermalPrintConfig {
    fn default() -> Self {
        Self::new(PrinterLanguage::Zpl, 203, 40.0, 30.0)
    }
}

impl ThermalPrintConfig {
    pub fn new(language: PrinterLanguage, dpi: u32, label_width: f64, label_height: f64) -> Self {
        Self {
            language: language.as_str().to_string(),
            dpi,
            label_width,
            label_height,
            speed: None,
            darkness: None,
            copies: None,
            gap: None,
        }
    }

    /// Build a config sized from the template's own label dimensions
    pub fn for_template(template: &LabelTemplate, language: PrinterLanguage, dpi: u32) -> Self {
        let cfg = &template.config;
        let to_mm = |v: f64| match cfg.unit {
            LengthUnit::Mm => v,
            LengthUnit::Px => v / REFERENCE_DPI * MM_PER_INCH,
            LengthUnit::In => v * MM_PER_INCH,
        };
        Self::new(language, dpi, to_mm(cfg.width), to_mm(cfg.height))
    }

    pub fn with_speed(mut self, speed: u8) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_darkness(mut self, darkness: u8) -> Self {
        self.darkness = Some(darkness);
        self
    }

    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = Some(copies);
        self
    }

    pub fn with_gap(mut self, gap_mm: f64) -> Self {
        self.gap = Some(gap_mm);
        self
    }

    pub fn copies(&self) -> u32 {
        self.copies.unwrap_or(1)
    }

    pub fn gap_mm(&self) -> f64 {
        self.gap.unwrap_or(DEFAULT_GAP_MM)
    }

    /// Check every constraint and resolve the language selector
    pub fn validate(&self) -> LabelResult<PrinterLanguage> {
        if self.dpi == 0 {
            return Err(LabelError::InvalidConfig("dpi must be > 0".into()));
        }
        if !(self.label_width.is_finite() && self.label_width > 0.0) {
            return Err(LabelError::InvalidConfig(format!(
                "label width must be > 0, got {}",
                self.label_width
            )));
        }
        if !(self.label_height.is_finite() && self.label_height > 0.0) {
            return Err(LabelError::InvalidConfig(format!(
                "label height must be > 0, got {}",
                self.label_height
            )));
        }
        if let Some(copies) = self.copies {
            if !(1..=MAX_COPIES).contains(&copies) {
                return Err(LabelError::InvalidConfig(format!(
                    "copies must be within 1-{}, got {}",
                    MAX_COPIES, copies
                )));
            }
        }
        if let Some(speed) = self.speed {
            if !(1..=10).contains(&speed) {
                return Err(LabelError::InvalidConfig(format!(
                    "speed must be within 1-10, got {}",
                    speed
                )));
            }
        }
        if let Some(gap) = self.gap {
            if !(gap.is_finite() && gap >= 0.0) {
                return Err(LabelError::InvalidConfig(format!(
                    "gap must be >= 0, got {}",
                    gap
                )));
            }
        }
        self.language.parse()
    }
}
