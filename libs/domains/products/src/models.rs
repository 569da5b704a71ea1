use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Largest magnitude a `NUMERIC(18,2)` column can hold is just under 10^16.
const PRICE_INTEGER_DIGITS: u32 = 16;
const PRICE_SCALE: u32 = 2;

/// Prices must be non-negative, carry at most two fractional digits and fit
/// `NUMERIC(18,2)`.
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(ValidationError::new("price_negative").with_message("Price cannot be negative".into()));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(ValidationError::new("price_scale")
            .with_message("Price cannot have more than 2 decimal places".into()));
    }
    if price.trunc().abs() >= Decimal::from(10_i64.pow(PRICE_INTEGER_DIGITS)) {
        return Err(ValidationError::new("price_range").with_message("Price is too large".into()));
    }
    Ok(())
}

/// Product entity - a stocked inventory item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Product {
    /// Storage-assigned identifier
    pub id: i32,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Widget")]
    pub name: String,
    #[validate(length(max = 255, message = "Description cannot be longer than 255 characters"))]
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price, serialized as a decimal string
    #[validate(custom(function = "validate_price"))]
    #[schema(example = "19.99")]
    pub price: Decimal,
    pub quantity: i32,
}

/// DTO for creating a product; the identifier is always assigned by storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Widget")]
    pub name: String,
    #[validate(length(max = 255, message = "Description cannot be longer than 255 characters"))]
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(example = "19.99")]
    pub price: Decimal,
    pub quantity: i32,
}

/// Keeps an explicit `null` apart from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// DTO for partially updating a product
///
/// Absent fields are left untouched. `"description": null` clears the
/// description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Description cannot be longer than 255 characters"))]
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
}

impl Product {
    /// Build the stored representation of `input` under the given identifier.
    pub fn from_create(id: i32, input: CreateProduct) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
        }
        .with_fixed_price()
    }

    /// Pin the price to the stored `NUMERIC(18,2)` scale, so `15` reads back
    /// as `15.00`.
    pub fn with_fixed_price(mut self) -> Self {
        self.price.rescale(PRICE_SCALE);
        self
    }

    /// Merge the fields present in `update`; the identifier is never touched.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
            self.price.rescale(PRICE_SCALE);
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create(name: &str, price_str: &str) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: None,
            price: price(price_str),
            quantity: 1,
        }
    }

    #[test]
    fn test_valid_create_product() {
        assert!(create("Widget", "19.99").validate().is_ok());
        assert!(create("Freebie", "0").validate().is_ok());
        assert!(create("Trailing zeros", "5.500").validate().is_ok());
    }

    #[test]
    fn test_name_bounds() {
        assert!(create("", "1").validate().is_err());
        assert!(create(&"n".repeat(100), "1").validate().is_ok());
        assert!(create(&"n".repeat(101), "1").validate().is_err());
    }

    #[test]
    fn test_description_bound() {
        let mut input = create("Widget", "1");
        input.description = Some("d".repeat(255));
        assert!(input.validate().is_ok());

        input.description = Some("d".repeat(256));
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_price_rules() {
        let errors = create("Widget", "-0.01").validate().unwrap_err();
        assert_eq!(errors.field_errors()["price"][0].code, "price_negative");

        let errors = create("Widget", "1.999").validate().unwrap_err();
        assert_eq!(errors.field_errors()["price"][0].code, "price_scale");

        assert!(create("Widget", "9999999999999999.99").validate().is_ok());
        let errors = create("Widget", "10000000000000000").validate().unwrap_err();
        assert_eq!(errors.field_errors()["price"][0].code, "price_range");
    }

    #[test]
    fn test_price_serializes_as_string_and_accepts_numbers() {
        let product = Product::from_create(1, create("Widget", "19.99"));
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], "19.99");

        let parsed: CreateProduct =
            serde_json::from_str(r#"{"name":"Widget","price":19.99,"quantity":5}"#).unwrap();
        assert_eq!(parsed.price, price("19.99"));
        assert_eq!(parsed.description, None);
    }

    #[test]
    fn test_apply_update_merges_present_fields() {
        let mut product = Product::from_create(7, create("Widget", "10"));
        product.apply_update(UpdateProduct {
            price: Some(price("12.5")),
            description: Some(Some("Blue".into())),
            ..Default::default()
        });

        assert_eq!(product.id, 7);
        assert_eq!(product.name, "Widget");
        assert_eq!(product.description.as_deref(), Some("Blue"));
        assert_eq!(product.price.to_string(), "12.50");
        assert_eq!(product.quantity, 1);
    }

    #[test]
    fn test_from_create_fixes_price_scale() {
        assert_eq!(Product::from_create(1, create("Widget", "15")).price.to_string(), "15.00");
        assert_eq!(Product::from_create(1, create("Widget", "19.9")).price.to_string(), "19.90");
        assert_eq!(Product::from_create(1, create("Widget", "19.99")).price.to_string(), "19.99");
    }

    #[test]
    fn test_update_product_distinguishes_null_from_absent_description() {
        let absent: UpdateProduct = serde_json::from_str(r#"{"quantity":3}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: UpdateProduct = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdateProduct = serde_json::from_str(r#"{"description":"Blue"}"#).unwrap();
        assert_eq!(set.description, Some(Some("Blue".to_string())));

        let mut product = Product::from_create(1, create("Widget", "1"));
        product.description = Some("Old".into());
        product.apply_update(absent);
        assert_eq!(product.description.as_deref(), Some("Old"));
        product.apply_update(cleared);
        assert_eq!(product.description, None);
    }

    #[test]
    fn test_update_product_rejects_long_description() {
        let update = UpdateProduct {
            description: Some(Some("d".repeat(256))),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(UpdateProduct {
            description: Some(None),
            ..Default::default()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_update_product_validation_skips_absent_fields() {
        assert!(UpdateProduct::default().validate().is_ok());

        let update = UpdateProduct {
            price: Some(price("-1")),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
