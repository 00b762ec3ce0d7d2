//! Item persistence over [`SqlHandler`]

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};

use super::error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
use crate::context::RequestContext;
use crate::domain::Item;
use crate::sql::{DatabaseError, DbResult, Row, SqlHandler, SqlValue};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

const ENTITY: &str = "Item";

const INSERT_ITEM: &str = "INSERT INTO items \
    (name, category, brand, purchase_price, purchase_date, created_at, updated_at) \
    VALUES (?, ?, ?, ?, ?, ?, ?)";

const SELECT_ALL_ITEMS: &str = "SELECT id, name, category, brand, purchase_price, purchase_date, \
    created_at, updated_at FROM items ORDER BY id";

const SELECT_ITEM_BY_ID: &str = "SELECT id, name, category, brand, purchase_price, purchase_date, \
    created_at, updated_at FROM items WHERE id = ?";

const UPDATE_ITEM: &str = "UPDATE items SET name = ?, category = ?, brand = ?, \
    purchase_price = ?, purchase_date = ?, updated_at = ? WHERE id = ?";

const DELETE_ITEM: &str = "DELETE FROM items WHERE id = ?";

const SUMMARY_BY_CATEGORY: &str =
    "SELECT category, COUNT(*) FROM items GROUP BY category ORDER BY category";

/// Data-access contract for items
///
/// Absence is always reported as [`RepositoryErrorKind::NotFound`], whether it
/// was detected by an empty result or by zero affected rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert `item`, returning it with its generated id and both timestamps set
    async fn create(&self, ctx: &RequestContext, item: Item) -> RepositoryResult<Item>;

    /// Every stored item, ordered by id
    async fn find_all(&self, ctx: &RequestContext) -> RepositoryResult<Vec<Item>>;

    async fn find_by_id(&self, ctx: &RequestContext, id: i64) -> RepositoryResult<Item>;

    /// Overwrite all mutable columns of `item.id` and refresh `updated_at`
    ///
    /// The item is re-validated first; nothing is written if it is invalid.
    async fn update(&self, ctx: &RequestContext, item: Item) -> RepositoryResult<Item>;

    async fn delete(&self, ctx: &RequestContext, id: i64) -> RepositoryResult<()>;

    /// Item count per distinct category; empty when there are no items
    async fn get_summary_by_category(
        &self,
        ctx: &RequestContext,
    ) -> RepositoryResult<BTreeMap<String, i64>>;
}

/// [`ItemRepository`] backed by any [`SqlHandler`]
#[derive(Debug, Clone)]
pub struct SqlItemRepository<H> {
    handler: H,
}

impl<H: SqlHandler> SqlItemRepository<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

#[async_trait]
impl<H: SqlHandler> ItemRepository for SqlItemRepository<H> {
    async fn create(&self, ctx: &RequestContext, item: Item) -> RepositoryResult<Item> {
        let operation = RepositoryOperation::Create;
        item.validate()
            .map_err(|e| RepositoryError::validation_failed(operation, &e))?;

        let now = storage_now();
        let args = [
            SqlValue::from(item.name.as_str()),
            SqlValue::from(item.category.as_str()),
            SqlValue::from(item.brand.as_str()),
            SqlValue::Integer(item.purchase_price),
            SqlValue::from(item.purchase_date.as_str()),
            SqlValue::Timestamp(now),
            SqlValue::Timestamp(now),
        ];
        let result = self
            .handler
            .execute(ctx, INSERT_ITEM, &args)
            .await
            .map_err(|e| storage_error(operation, None, e))?;

        let id = result.last_insert_id().ok_or_else(|| {
            RepositoryError::new(
                operation,
                RepositoryErrorKind::DatabaseError,
                "driver did not report an inserted id",
            )
        })?;

        tracing::debug!(item_id = id, category = %item.category, "item created");
        Ok(Item {
            id,
            created_at: now,
            updated_at: now,
            ..item
        })
    }

    async fn find_all(&self, ctx: &RequestContext) -> RepositoryResult<Vec<Item>> {
        let operation = RepositoryOperation::FindAll;
        let rows = self
            .handler
            .query(ctx, SELECT_ALL_ITEMS, &[])
            .await
            .map_err(|e| storage_error(operation, None, e))?;

        let items = rows
            .map(|row| item_from_row(&row))
            .collect::<DbResult<Vec<_>>>()
            .map_err(|e| storage_error(operation, None, e))?;

        tracing::debug!(count = items.len(), "items listed");
        Ok(items)
    }

    async fn find_by_id(&self, ctx: &RequestContext, id: i64) -> RepositoryResult<Item> {
        let operation = RepositoryOperation::FindById;
        let row = self
            .handler
            .query_row(ctx, SELECT_ITEM_BY_ID, &[SqlValue::Integer(id)])
            .await
            .map_err(|e| storage_error(operation, Some(id), e))?;

        item_from_row(&row).map_err(|e| storage_error(operation, Some(id), e))
    }

    async fn update(&self, ctx: &RequestContext, item: Item) -> RepositoryResult<Item> {
        let operation = RepositoryOperation::Update;
        item.validate().map_err(|e| {
            RepositoryError::validation_failed(operation, &e).with_entity(ENTITY, item.id)
        })?;

        let updated_at = storage_now();
        let args = [
            SqlValue::from(item.name.as_str()),
            SqlValue::from(item.category.as_str()),
            SqlValue::from(item.brand.as_str()),
            SqlValue::Integer(item.purchase_price),
            SqlValue::from(item.purchase_date.as_str()),
            SqlValue::Timestamp(updated_at),
            SqlValue::Integer(item.id),
        ];
        let result = self
            .handler
            .execute(ctx, UPDATE_ITEM, &args)
            .await
            .map_err(|e| storage_error(operation, Some(item.id), e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(ENTITY, item.id).with_operation(operation));
        }

        tracing::debug!(item_id = item.id, "item updated");
        Ok(Item { updated_at, ..item })
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> RepositoryResult<()> {
        let operation = RepositoryOperation::Delete;
        let result = self
            .handler
            .execute(ctx, DELETE_ITEM, &[SqlValue::Integer(id)])
            .await
            .map_err(|e| storage_error(operation, Some(id), e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(ENTITY, id).with_operation(operation));
        }

        tracing::debug!(item_id = id, "item deleted");
        Ok(())
    }

    async fn get_summary_by_category(
        &self,
        ctx: &RequestContext,
    ) -> RepositoryResult<BTreeMap<String, i64>> {
        let operation = RepositoryOperation::Summarize;
        let rows = self
            .handler
            .query(ctx, SUMMARY_BY_CATEGORY, &[])
            .await
            .map_err(|e| storage_error(operation, None, e))?;

        let mut summary = BTreeMap::new();
        for row in rows {
            let category: String = row.get(0).map_err(|e| storage_error(operation, None, e))?;
            let count: i64 = row.get(1).map_err(|e| storage_error(operation, None, e))?;
            summary.insert(category, count);
        }
        Ok(summary)
    }
}

/// Current time at the precision timestamps are stored with
fn storage_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn item_from_row(row: &Row) -> DbResult<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        brand: row.get(3)?,
        purchase_price: row.get(4)?,
        purchase_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Translate and log a SQL-layer failure
fn storage_error(
    operation: RepositoryOperation,
    id: Option<i64>,
    err: DatabaseError,
) -> RepositoryError {
    let mut error = RepositoryError::from_database(operation, err);
    if let Some(id) = id {
        error = error.with_entity(ENTITY, id);
    }

    match error.kind {
        RepositoryErrorKind::NotFound => {
            tracing::debug!(operation = %operation, item_id = ?id, "item not found");
        }
        RepositoryErrorKind::Cancelled | RepositoryErrorKind::Timeout => {
            tracing::warn!(operation = %operation, kind = %error.kind, "storage call interrupted");
        }
        _ => {
            tracing::error!(
                operation = %operation,
                kind = %error.kind,
                item_id = ?id,
                retriable = error.is_retriable(),
                "Storage error: {}", error.message
            );
        }
    }
    error
}
