use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ItemError;
use crate::context::RequestContext;
use crate::domain::{Item, ValidationError};
use crate::repository::ItemRepository;

pub type ItemResult<T> = std::result::Result<T, ItemError>;

/// Fields for a new item
///
/// Missing fields fall back to empty values and are then rejected by the
/// entity invariants rather than by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateItemInput {
    pub name: String,
    pub category: String,
    pub brand: String,
    pub purchase_price: i64,
    pub purchase_date: String,
}

impl CreateItemInput {
    pub fn into_item(self) -> Result<Item, ValidationError> {
        Item::new(
            self.name,
            self.category,
            self.brand,
            self.purchase_price,
            self.purchase_date,
        )
    }
}

/// Partial update; `None` leaves the field unchanged
///
/// `Some("")` and `Some(0)` are real values and overwrite the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchItemInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub purchase_price: Option<i64>,
    pub purchase_date: Option<String>,
}

impl PatchItemInput {
    /// Overwrite every field present in the patch
    ///
    /// Does not validate; callers validate the merged item once.
    pub fn apply_to(self, item: &mut Item) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(brand) = self.brand {
            item.brand = brand;
        }
        if let Some(purchase_price) = self.purchase_price {
            item.purchase_price = purchase_price;
        }
        if let Some(purchase_date) = self.purchase_date {
            item.purchase_date = purchase_date;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.brand.is_none()
            && self.purchase_price.is_none()
            && self.purchase_date.is_none()
    }
}

/// Item count per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub categories: BTreeMap<String, i64>,
    pub total: i64,
}

impl From<BTreeMap<String, i64>> for CategorySummary {
    fn from(categories: BTreeMap<String, i64>) -> Self {
        let total = categories.values().sum();
        Self { categories, total }
    }
}

/// Application operations on items
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemUsecase: Send + Sync {
    async fn get_all_items(&self, ctx: &RequestContext) -> ItemResult<Vec<Item>>;

    async fn get_item_by_id(&self, ctx: &RequestContext, id: i64) -> ItemResult<Item>;

    async fn create_item(&self, ctx: &RequestContext, input: CreateItemInput) -> ItemResult<Item>;

    /// Fetch, merge, validate once, then persist
    async fn patch_item(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: PatchItemInput,
    ) -> ItemResult<Item>;

    async fn delete_item(&self, ctx: &RequestContext, id: i64) -> ItemResult<()>;

    async fn get_category_summary(&self, ctx: &RequestContext) -> ItemResult<CategorySummary>;
}

/// [`ItemUsecase`] over an [`ItemRepository`]
#[derive(Debug, Clone)]
pub struct ItemInteractor<R> {
    repository: R,
}

impl<R: ItemRepository> ItemInteractor<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: ItemRepository> ItemUsecase for ItemInteractor<R> {
    async fn get_all_items(&self, ctx: &RequestContext) -> ItemResult<Vec<Item>> {
        Ok(self.repository.find_all(ctx).await?)
    }

    async fn get_item_by_id(&self, ctx: &RequestContext, id: i64) -> ItemResult<Item> {
        Ok(self.repository.find_by_id(ctx, id).await?)
    }

    async fn create_item(&self, ctx: &RequestContext, input: CreateItemInput) -> ItemResult<Item> {
        let item = input.into_item().map_err(|e| {
            tracing::debug!(error = %e, "rejected new item");
            ItemError::from(e)
        })?;

        let created = self.repository.create(ctx, item).await?;
        tracing::info!(item_id = created.id, "item created");
        Ok(created)
    }

    async fn patch_item(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: PatchItemInput,
    ) -> ItemResult<Item> {
        let mut item = self.repository.find_by_id(ctx, id).await?;

        input.apply_to(&mut item);
        item.validate().map_err(|e| {
            tracing::debug!(item_id = id, error = %e, "rejected patch");
            ItemError::from(e)
        })?;

        let updated = self.repository.update(ctx, item).await?;
        tracing::info!(item_id = id, "item patched");
        Ok(updated)
    }

    async fn delete_item(&self, ctx: &RequestContext, id: i64) -> ItemResult<()> {
        self.repository.delete(ctx, id).await?;
        tracing::info!(item_id = id, "item deleted");
        Ok(())
    }

    async fn get_category_summary(&self, ctx: &RequestContext) -> ItemResult<CategorySummary> {
        let counts = self.repository.get_summary_by_category(ctx).await?;
        Ok(CategorySummary::from(counts))
    }
}
