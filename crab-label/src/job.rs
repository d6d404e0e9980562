//! Print job assembly
//!
//! Validates the print config, picks the emitter for its language and returns
//! the finished buffer untouched. Nothing is kept between calls.

use tracing::{debug, info, instrument};

use crate::config::ThermalPrintConfig;
use crate::emitter::{Emitter, LabelEmitter};
use crate::error::LabelResult;
use crate::model::LabelTemplate;
use crate::product::Product;
use crate::substitute::resolve_template;

/// Generate printer commands for an already-resolved template
#[instrument(skip_all, fields(language = %config.language, dpi = config.dpi, elements = template.elements.len()))]
pub fn generate(template: &LabelTemplate, config: &ThermalPrintConfig) -> LabelResult<Vec<u8>> {
    let language = config.validate()?;
    template.validate()?;

    let emitter = Emitter::from(language);
    let data = emitter.emit(template, config)?;

    info!(
        bytes = data.len(),
        copies = config.copies(),
        native_copies = emitter.native_copies(),
        "label commands generated"
    );
    Ok(data)
}

/// Resolve product tokens in the template, then generate
#[instrument(skip_all, fields(language = %config.language))]
pub fn generate_for_product(
    template: &LabelTemplate,
    config: &ThermalPrintConfig,
    product: &Product,
) -> LabelResult<Vec<u8>> {
    let resolved = resolve_template(template, product);
    generate(&resolved, config)
}

/// One job per product, concatenated in input order
///
/// Fails as a whole if any product's label fails.
#[instrument(skip_all, fields(language = %config.language, products = products.len()))]
pub fn generate_batch(
    template: &LabelTemplate,
    config: &ThermalPrintConfig,
    products: &[Product],
) -> LabelResult<Vec<u8>> {
    if products.is_empty() {
        debug!("empty batch");
        return Ok(Vec::new());
    }
    // Validate once up front so a bad config fails before any product is resolved
    config.validate()?;

    let mut buf = Vec::new();
    for product in products {
        buf.extend(generate_for_product(template, config, product)?);
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrinterLanguage;
    use crate::error::LabelError;
    use crate::model::{ElementBase, LabelConfig, LabelElement, LineElement};

    fn template() -> LabelTemplate {
        LabelTemplate::new(LabelConfig::millimeters(40.0, 30.0)).with_element(LabelElement::Line(
            LineElement::new(ElementBase::new("l", 0.0, 0.0, 100.0, 1.0)),
        ))
    }

    #[test]
    fn test_invalid_config_produces_no_buffer() {
        let config = ThermalPrintConfig::new(PrinterLanguage::Zpl, 0, 40.0, 30.0);
        assert!(matches!(
            generate(&template(), &config),
            Err(LabelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_element_rejected() {
        let mut t = template();
        t.elements.push(LabelElement::Line(LineElement::new(ElementBase::new(
            "bad",
            f64::INFINITY,
            0.0,
            1.0,
            1.0,
        ))));
        assert!(matches!(
            generate(&t, &ThermalPrintConfig::default()),
            Err(LabelError::InvalidElement { .. })
        ));
    }

    #[test]
    fn test_empty_batch() {
        let data = generate_batch(&template(), &ThermalPrintConfig::default(), &[]).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_batch_rejects_bad_config() {
        let config = ThermalPrintConfig::default().with_copies(0);
        assert!(matches!(
            generate_batch(&template(), &config, &[Product::default()]),
            Err(LabelError::InvalidConfig(_))
        ));
    }
}
