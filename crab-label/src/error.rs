//! Error types for label command generation

use thiserror::Error;

use crate::config::PrinterLanguage;

/// Label generation error types
#[derive(Debug, Error)]
pub enum LabelError {
    /// Print configuration rejected before any emission
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Element geometry is negative or not finite
    #[error("Invalid element {element_id}: {reason}")]
    InvalidElement { element_id: String, reason: String },

    /// Element (or one of its options) cannot be expressed in the target language
    #[error("Unsupported {element_type} element {element_id} for {language}: {reason}")]
    UnsupportedElement {
        element_id: String,
        element_type: &'static str,
        language: PrinterLanguage,
        reason: String,
    },

    /// Pre-rasterized bitmap payload is unreadable or has the wrong size
    #[error("Invalid image data in element {element_id}: {reason}")]
    InvalidImageData { element_id: String, reason: String },
}

/// Result type for label operations
pub type LabelResult<T> = Result<T, LabelError>;
