//! Barcode footprint estimates
//!
//! Closed-form module counts, no symbology rendering. Results only feed
//! alignment offsets; a printer may render a few modules wider or narrower.

use crate::model::ErrorCorrection;
use crate::symbology::BarcodeFormat;

/// Narrow bar width in dots, matching the module width every emitter declares
pub const NARROW_BAR_DOTS: i64 = 2;

/// Wide-to-narrow ratio used for two-width symbologies
pub const WIDE_BAR_DOTS: i64 = NARROW_BAR_DOTS * 2;

/// Estimated printed width of a 1-D barcode in dots
pub fn estimate_width(format: &BarcodeFormat, value: &str) -> i64 {
    let len = value.chars().count() as i64;
    let modules = match format {
        BarcodeFormat::Code128 => len * 11 + 35,
        BarcodeFormat::Ean13 | BarcodeFormat::Upc => 95,
        BarcodeFormat::Ean8 => 67,
        BarcodeFormat::Code39 => len * 13 + 25,
        BarcodeFormat::Itf14 => 7 * 18 + 20,
        BarcodeFormat::Msi | BarcodeFormat::Pharmacode | BarcodeFormat::Other(_) => len * 12,
    };
    modules * NARROW_BAR_DOTS
}

/// Byte-mode capacity for versions 1-10, columns L/M/Q/H
const QR_BYTE_CAPACITY: [[usize; 4]; 10] = [
    [17, 14, 11, 7],
    [32, 26, 20, 14],
    [53, 42, 32, 24],
    [78, 62, 46, 34],
    [106, 84, 60, 44],
    [134, 106, 74, 58],
    [154, 122, 86, 64],
    [192, 152, 108, 84],
    [230, 180, 130, 98],
    [271, 213, 151, 119],
];

/// Smallest QR version holding `len` bytes; extrapolated past version 10
pub fn qr_version(len: usize, ec: ErrorCorrection) -> usize {
    let col = match ec {
        ErrorCorrection::L => 0,
        ErrorCorrection::M => 1,
        ErrorCorrection::Q => 2,
        ErrorCorrection::H => 3,
    };
    if let Some(idx) = QR_BYTE_CAPACITY.iter().position(|row| len <= row[col]) {
        return idx + 1;
    }
    let top = QR_BYTE_CAPACITY[9][col];
    let per_version = top / 10;
    (10 + (len - top).div_ceil(per_version)).min(40)
}

/// Modules along one side of the symbol
pub fn qr_modules(len: usize, ec: ErrorCorrection) -> i64 {
    17 + 4 * qr_version(len, ec) as i64
}

/// Module size (1-10 dots) that fits the symbol inside `box_dots`
pub fn qr_magnification(box_dots: i64, len: usize, ec: ErrorCorrection) -> i64 {
    (box_dots / qr_modules(len, ec)).clamp(1, 10)
}
