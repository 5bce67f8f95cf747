use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Product ids are epoch-millisecond derived integers.
pub type ProductId = i64;

/// Parse a path id. Anything that is not an integer simply matches no product.
pub fn parse_id(raw: &str) -> Option<ProductId> {
    raw.trim().parse::<ProductId>().ok()
}

/// Price as supplied by the client: either a JSON number or free text.
/// No currency or numeric rules are applied.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Price {
    Number(serde_json::Number),
    Text(String),
}

impl Price {
    pub fn is_blank(&self) -> bool {
        match self {
            Price::Number(_) => false,
            Price::Text(s) => s.trim().is_empty(),
        }
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::Text(String::new())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Number(n) => write!(f, "{n}"),
            Price::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Price {
    fn from(s: &str) -> Self {
        Price::Text(s.to_string())
    }
}

impl From<String> for Price {
    fn from(s: String) -> Self {
        Price::Text(s)
    }
}

/// A persisted catalog entry.
///
/// Unknown fields found in the stored document are kept in `extra` and
/// written back untouched.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(id: ProductId, input: ValidProductInput, image: Option<String>) -> Self {
        Self {
            id,
            name: input.name,
            category: input.category,
            price: input.price,
            image,
            extra: Map::new(),
        }
    }

    /// Replace name, category and price; the image only when a new one is given.
    pub fn apply(&mut self, input: ValidProductInput, image: Option<String>) {
        self.name = input.name;
        self.category = input.category;
        self.price = input.price;
        if image.is_some() {
            self.image = image;
        }
    }
}

/// Fields of a create/update request before validation.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Price>,
}

/// Request fields that passed [`ProductInput::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidProductInput {
    pub name: String,
    pub category: String,
    pub price: Price,
}

impl ProductInput {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: impl Into<Price>) -> Self {
        Self {
            name: Some(name.into()),
            category: Some(category.into()),
            price: Some(price.into()),
        }
    }

    /// Every field must be present and non-blank. Reports the first missing
    /// one in the order name, category, price.
    pub fn validate(self) -> Result<ValidProductInput, ModelError> {
        let name = required_text("name", self.name)?;
        let category = required_text("category", self.category)?;
        let price = self
            .price
            .filter(|p| !p.is_blank())
            .ok_or_else(|| missing("price"))?;
        Ok(ValidProductInput { name, category, price })
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String, ModelError> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| missing(field))
}

fn missing(field: &str) -> ModelError {
    ModelError::Validation(format!("{field} is required"))
}
