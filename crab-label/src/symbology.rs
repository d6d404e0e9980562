//! Barcode symbologies and their per-language command tokens
//!
//! Lookup never fails: a format the language has no token for (or a format
//! string nobody recognizes) prints as the language's default symbology.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::PrinterLanguage;

/// Abstract barcode format chosen in the editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BarcodeFormat {
    #[default]
    Code128,
    Ean13,
    Ean8,
    Upc,
    Code39,
    Itf14,
    Msi,
    Pharmacode,
    /// Anything else, kept verbatim
    Other(String),
}

impl BarcodeFormat {
    pub fn parse(s: &str) -> Self {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "CODE128" | "CODE128A" | "CODE128B" | "CODE128C" => BarcodeFormat::Code128,
            "EAN13" => BarcodeFormat::Ean13,
            "EAN8" => BarcodeFormat::Ean8,
            "UPC" | "UPCA" => BarcodeFormat::Upc,
            "CODE39" => BarcodeFormat::Code39,
            "ITF14" => BarcodeFormat::Itf14,
            "MSI" | "MSI10" | "MSI11" | "MSI1010" | "MSI1110" => BarcodeFormat::Msi,
            "PHARMACODE" => BarcodeFormat::Pharmacode,
            _ => BarcodeFormat::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BarcodeFormat::Code128 => "CODE128",
            BarcodeFormat::Ean13 => "EAN13",
            BarcodeFormat::Ean8 => "EAN8",
            BarcodeFormat::Upc => "UPC",
            BarcodeFormat::Code39 => "CODE39",
            BarcodeFormat::Itf14 => "ITF14",
            BarcodeFormat::Msi => "MSI",
            BarcodeFormat::Pharmacode => "pharmacode",
            BarcodeFormat::Other(s) => s,
        }
    }
}

impl From<String> for BarcodeFormat {
    fn from(s: String) -> Self {
        BarcodeFormat::parse(&s)
    }
}

impl From<BarcodeFormat> for String {
    fn from(format: BarcodeFormat) -> Self {
        format.as_str().to_string()
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ZPL field command; `^BC` (Code 128) is the default
pub fn zpl_symbology(format: &BarcodeFormat) -> Option<&'static str> {
    match format {
        BarcodeFormat::Code128 => Some("^BC"),
        BarcodeFormat::Ean13 => Some("^BE"),
        BarcodeFormat::Ean8 => Some("^B8"),
        BarcodeFormat::Upc => Some("^BU"),
        BarcodeFormat::Code39 => Some("^B3"),
        BarcodeFormat::Itf14 => Some("^B2"),
        BarcodeFormat::Msi => Some("^BM"),
        BarcodeFormat::Pharmacode | BarcodeFormat::Other(_) => None,
    }
}

/// EPL `B` command type; `1` (Code 128 auto) is the default
pub fn epl_symbology(format: &BarcodeFormat) -> Option<&'static str> {
    match format {
        BarcodeFormat::Code128 => Some("1"),
        BarcodeFormat::Ean13 => Some("E30"),
        BarcodeFormat::Ean8 => Some("E80"),
        BarcodeFormat::Upc => Some("UA0"),
        BarcodeFormat::Code39 => Some("3"),
        BarcodeFormat::Itf14 => Some("2"),
        BarcodeFormat::Msi => Some("M"),
        BarcodeFormat::Pharmacode | BarcodeFormat::Other(_) => None,
    }
}

/// TSPL `BARCODE` code type; `128` is the default
pub fn tspl_symbology(format: &BarcodeFormat) -> Option<&'static str> {
    match format {
        BarcodeFormat::Code128 => Some("128"),
        BarcodeFormat::Ean13 => Some("EAN13"),
        BarcodeFormat::Ean8 => Some("EAN8"),
        BarcodeFormat::Upc => Some("UPCA"),
        BarcodeFormat::Code39 => Some("39"),
        BarcodeFormat::Itf14 => Some("ITF14"),
        BarcodeFormat::Msi => Some("MSI"),
        BarcodeFormat::Pharmacode | BarcodeFormat::Other(_) => None,
    }
}

pub fn default_symbology(language: PrinterLanguage) -> &'static str {
    match language {
        PrinterLanguage::Zpl => "^BC",
        PrinterLanguage::Epl => "1",
        PrinterLanguage::Tspl => "128",
    }
}

/// Resolve a format to the language's token, falling back to the default
pub fn symbology_code(language: PrinterLanguage, format: &BarcodeFormat) -> &'static str {
    let code = match language {
        PrinterLanguage::Zpl => zpl_symbology(format),
        PrinterLanguage::Epl => epl_symbology(format),
        PrinterLanguage::Tspl => tspl_symbology(format),
    };
    code.unwrap_or_else(|| {
        let fallback = default_symbology(language);
        warn!(%language, %format, fallback, "no symbology for barcode format, using default");
        fallback
    })
}
