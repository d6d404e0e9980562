//! Variable substitution for label text
//!
//! Two token spellings are recognized: `${preco}` and `$preco`. Names are
//! matched case-insensitively. Known names always disappear from the output
//! (an absent field resolves to an empty string); unknown names stay exactly
//! as written.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use rust_decimal::prelude::*;
use serde_json::Value;
use tracing::warn;

use crate::model::{LabelElement, LabelTemplate};
use crate::product::{CategoryRef, Product};

/// Prefix for formatted prices
pub const CURRENCY_PREFIX: &str = "R$ ";

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]*)\}|\$(\p{L}+)").expect("token pattern is valid")
});

/// Product fields addressable from label text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Name,
    Code,
    Sku,
    Barcode,
    Price,
    Description,
    Category,
    Brand,
    Stock,
}

impl Token {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "nome" => Some(Token::Name),
            "codigo" => Some(Token::Code),
            "sku" => Some(Token::Sku),
            "codigobarras" => Some(Token::Barcode),
            "preco" => Some(Token::Price),
            "descricao" => Some(Token::Description),
            "categoria" => Some(Token::Category),
            "marca" => Some(Token::Brand),
            "estoque" => Some(Token::Stock),
            _ => None,
        }
    }

    /// Resolve against a product; missing values give an empty string
    pub fn resolve(self, product: &Product) -> String {
        match self {
            Token::Name => product.name.clone().unwrap_or_default(),
            Token::Code => value_text(product.code.as_ref()),
            Token::Sku => value_text(product.sku.as_ref()),
            Token::Barcode => value_text(product.barcode.as_ref()),
            Token::Price => product.price.as_ref().map(format_price).unwrap_or_default(),
            Token::Description => product.description.clone().unwrap_or_default(),
            Token::Category => product
                .category
                .as_ref()
                .and_then(CategoryRef::name)
                .unwrap_or_default()
                .to_string(),
            Token::Brand => product.brand.clone().unwrap_or_default(),
            Token::Stock => value_text(product.stock.as_ref()),
        }
    }
}

/// Replace every recognized token in `text` with the product's value
pub fn substitute(text: &str, product: &Product) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            match Token::from_name(name) {
                Some(token) => token.resolve(product),
                None => {
                    let literal = &caps[0];
                    warn!(token = literal, "unrecognized label token left as literal");
                    literal.to_string()
                }
            }
        })
        .into_owned()
}

/// Copy of `template` with every text-bearing element resolved against `product`
pub fn resolve_template(template: &LabelTemplate, product: &Product) -> LabelTemplate {
    let mut resolved = template.clone();
    for element in &mut resolved.elements {
        match element {
            LabelElement::Text(text) => text.content = substitute(&text.content, product),
            LabelElement::Barcode(barcode) => barcode.value = substitute(&barcode.value, product),
            LabelElement::QrCode(qr) => qr.value = substitute(&qr.value, product),
            LabelElement::Image(_) | LabelElement::Rectangle(_) | LabelElement::Line(_) => {}
        }
    }
    resolved
}

/// Format a price as currency with two decimals (half away from zero)
pub fn format_price(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => match Decimal::from_f64_retain(f) {
                Some(d) => format!(
                    "{}{:.2}",
                    CURRENCY_PREFIX,
                    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                ),
                // Outside Decimal's range
                None => format!("{}{:.2}", CURRENCY_PREFIX, f),
            },
            None => n.to_string(),
        },
        other => value_text(Some(other)),
    }
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}
