//! Product record consumed by variable substitution
//!
//! The shape is loose on purpose: catalogs send numbers as strings, categories
//! as either a name or an object, and any field may be missing or null.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category reference, either a flat name or a nested object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CategoryRef {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
    },
}

impl CategoryRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryRef::Name(name) => Some(name),
            CategoryRef::Object { name } => name.as_deref(),
        }
    }
}

/// Product values available to label tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, alias = "nome")]
    pub name: Option<String>,
    #[serde(default, alias = "codigo")]
    pub code: Option<Value>,
    #[serde(default)]
    pub sku: Option<Value>,
    #[serde(default, alias = "codigoBarras", alias = "barcode_value")]
    pub barcode: Option<Value>,
    #[serde(default, alias = "preco")]
    pub price: Option<Value>,
    #[serde(default, alias = "descricao")]
    pub description: Option<String>,
    #[serde(default, alias = "categoria")]
    pub category: Option<CategoryRef>,
    #[serde(default, alias = "marca")]
    pub brand: Option<String>,
    #[serde(default, alias = "estoque")]
    pub stock: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_shapes() {
        let flat: Product = serde_json::from_value(json!({ "category": "Bebidas" })).unwrap();
        assert_eq!(flat.category.as_ref().and_then(CategoryRef::name), Some("Bebidas"));

        let nested: Product =
            serde_json::from_value(json!({ "categoria": { "id": 3, "name": "Doces" } })).unwrap();
        assert_eq!(nested.category.as_ref().and_then(CategoryRef::name), Some("Doces"));

        let nameless: Product =
            serde_json::from_value(json!({ "category": { "id": 3 } })).unwrap();
        assert_eq!(nameless.category.as_ref().and_then(CategoryRef::name), None);
    }

    #[test]
    fn test_null_fields_are_none() {
        let product: Product =
            serde_json::from_value(json!({ "name": null, "price": null, "sku": "A-1" })).unwrap();
        assert!(product.name.is_none());
        assert!(product.price.is_none());
        assert_eq!(product.sku, Some(json!("A-1")));
    }
}
