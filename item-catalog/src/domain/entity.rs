use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// A cataloged item
///
/// Construct new items with [`Item::new`]; it is the only way to build a
/// persistable item from scratch and it enforces every invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Assigned by storage; `0` until the item is created
    pub id: i64,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub purchase_price: i64,
    /// `YYYY-MM-DD`, kept as opaque text
    pub purchase_date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Build a validated, not-yet-persisted item
    ///
    /// Timestamps are provisional; the repository stamps both on insert.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        brand: impl Into<String>,
        purchase_price: i64,
        purchase_date: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now();
        let item = Self {
            id: 0,
            name: name.into(),
            category: category.into(),
            brand: brand.into(),
            purchase_price,
            purchase_date: purchase_date.into(),
            created_at: now,
            updated_at: now,
        };
        item.validate()?;
        Ok(item)
    }

    /// Check the invariants: non-empty name and category, non-negative price
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if self.purchase_price < 0 {
            return Err(ValidationError::NegativePrice(self.purchase_price));
        }
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("テスト", "時計", "ROLEX", 1000, "2023-01-01")]
    #[case("Speedy 30", "バッグ", "", 0, "2020-12-31")]
    #[case("x", "y", "z", i64::MAX, "")]
    fn test_new_item_keeps_inputs(
        #[case] name: &str,
        #[case] category: &str,
        #[case] brand: &str,
        #[case] price: i64,
        #[case] date: &str,
    ) {
        let item = Item::new(name, category, brand, price, date).unwrap();
        assert_eq!(item.id, 0);
        assert_eq!(item.name, name);
        assert_eq!(item.category, category);
        assert_eq!(item.brand, brand);
        assert_eq!(item.purchase_price, price);
        assert_eq!(item.purchase_date, date);
        assert_eq!(item.created_at, item.updated_at);
        assert!(!item.is_persisted());
    }

    #[rstest]
    #[case("", "時計", 1000, ValidationError::EmptyName)]
    #[case("テスト", "", 1000, ValidationError::EmptyCategory)]
    #[case("テスト", "時計", -1, ValidationError::NegativePrice(-1))]
    #[case("", "", -5, ValidationError::EmptyName)]
    fn test_new_item_rejects_invalid(
        #[case] name: &str,
        #[case] category: &str,
        #[case] price: i64,
        #[case] expected: ValidationError,
    ) {
        let err = Item::new(name, category, "ROLEX", price, "2023-01-01").unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn test_validate_after_mutation() {
        let mut item = Item::new("テスト", "時計", "ROLEX", 1000, "2023-01-01").unwrap();
        assert!(item.validate().is_ok());

        item.category.clear();
        assert_eq!(item.validate(), Err(ValidationError::EmptyCategory));
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::EmptyName.to_string(), "name must not be empty");
        assert_eq!(
            ValidationError::NegativePrice(-3).to_string(),
            "purchase_price must be >= 0, got -3"
        );
    }

    #[test]
    fn test_serializes_snake_case_fields() {
        let item = Item::new("テスト", "時計", "ROLEX", 1000, "2023-01-01").unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["purchase_price"], 1000);
        assert_eq!(json["purchase_date"], "2023-01-01");
        assert!(json.get("created_at").is_some());
    }
}
