//! # crab-label
//!
//! Thermal label command generation - template in, printer commands out.
//!
//! ## Scope
//!
//! This crate handles HOW a designed label becomes printer commands:
//! - Unit conversion from editor pixels / millimeters to printer dots
//! - Product token substitution (`${preco}`, `$nome`, ...)
//! - ZPL, EPL2 and TSPL serialization
//! - Barcode footprint estimates for alignment
//!
//! Sending the buffer to a printer (TCP 9100, USB, spooler) and rasterizing
//! images stay with the caller.
//!
//! ## Example
//!
//! ```ignore
//! use crab_label::{generate_for_product, PrinterLanguage, ThermalPrintConfig};
//!
//! let config = ThermalPrintConfig::new(PrinterLanguage::Zpl, 203, 40.0, 30.0).with_copies(2);
//! let data = generate_for_product(&template, &config, &product)?;
//! transport.send(&data).await?;
//! ```

pub mod barcode;
mod command;
mod config;
mod encoding;
pub mod emitter;
mod error;
mod job;
mod model;
mod product;
pub mod substitute;
pub mod symbology;
pub mod units;

// Re-exports
pub use command::{CommandBuilder, TextEncoding};
pub use config::{DEFAULT_GAP_MM, MAX_COPIES, PrinterLanguage, ThermalPrintConfig};
pub use emitter::{Emitter, LabelEmitter};
pub use encoding::{encode_cp1252, escape_quoted, escape_zpl};
pub use error::{LabelError, LabelResult};
pub use job::{generate, generate_batch, generate_for_product};
pub use model::{
    BarcodeElement, ElementBase, ErrorCorrection, GridLayout, ImageElement, ImageFit,
    LabelConfig, LabelElement, LabelTemplate, LengthUnit, LineElement, Margins, MonochromeBitmap,
    QrCodeElement, RectangleElement, TextAlign, TextElement,
};
pub use product::{CategoryRef, Product};
pub use substitute::substitute;
pub use symbology::BarcodeFormat;
pub use units::{font_size_to_dots, px_to_dots, to_dots};
