//! Purchase repository: public checkout intake and merchant order history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use treggio_core::{ProductId, PurchaseId, UserId};

use super::RepositoryError;
use crate::models::billing::{Purchase, PurchaseItem};

const PURCHASE_COLUMNS: &str = "id, user_id, total, buyer_name, address, city, phone, \
     payment_method, comment, created_at";

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: i32,
    user_id: i32,
    total: Decimal,
    buyer_name: String,
    address: String,
    city: String,
    phone: String,
    payment_method: Option<String>,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PurchaseRow> for Purchase {
    fn from(row: PurchaseRow) -> Self {
        Self {
            id: PurchaseId::new(row.id),
            user_id: UserId::new(row.user_id),
            total: row.total,
            buyer_name: row.buyer_name,
            address: row.address,
            city: row.city,
            phone: row.phone,
            payment_method: row.payment_method,
            comment: row.comment,
            created_at: row.created_at,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseItemRow {
    id: i32,
    purchase_id: i32,
    product_id: i32,
    product_title: Option<String>,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl From<PurchaseItemRow> for PurchaseItem {
    fn from(row: PurchaseItemRow) -> Self {
        Self {
            id: row.id,
            purchase_id: PurchaseId::new(row.purchase_id),
            product_id: ProductId::new(row.product_id),
            product_title: row.product_title,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
        }
    }
}

/// Buyer details captured at checkout.
#[derive(Debug, Clone)]
pub struct NewPurchase<'a> {
    /// The store owner receiving the order.
    pub user_id: UserId,
    pub total: Decimal,
    pub buyer_name: &'a str,
    pub address: &'a str,
    pub city: &'a str,
    pub phone: &'a str,
    pub payment_method: Option<&'a str>,
    pub comment: Option<&'a str>,
    pub items: &'a [(ProductId, i32)],
}

/// Repository for purchase operations.
pub struct PurchaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a purchase with its items in one transaction.
    ///
    /// Unit prices are read from the product rows inside the transaction so
    /// the client cannot dictate line totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if any product does not belong to
    /// the store, or `RepositoryError::Database` on other failures.
    pub async fn create(&self, new: NewPurchase<'_>) -> Result<Purchase, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let purchase_row = sqlx::query_as::<_, PurchaseRow>(&format!(
            "INSERT INTO purchases
                 (user_id, total, buyer_name, address, city, phone, payment_method, comment)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {PURCHASE_COLUMNS}"
        ))
        .bind(new.user_id.as_i32())
        .bind(new.total)
        .bind(new.buyer_name)
        .bind(new.address)
        .bind(new.city)
        .bind(new.phone)
        .bind(new.payment_method)
        .bind(new.comment)
        .fetch_one(&mut *tx)
        .await?;

        let mut purchase: Purchase = purchase_row.into();

        for &(product_id, quantity) in new.items {
            let price: Option<Decimal> = sqlx::query_scalar(
                "SELECT price FROM products
                 WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
            )
            .bind(product_id.as_i32())
            .bind(new.user_id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;

            let Some(unit_price) = price else {
                return Err(RepositoryError::NotFound);
            };

            let quantity = quantity.max(1);
            let item_row = sqlx::query_as::<_, PurchaseItemRow>(
                "INSERT INTO purchase_items
                     (purchase_id, product_id, quantity, unit_price, total_price)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id, purchase_id, product_id,
                           (SELECT title FROM products WHERE id = $2) AS product_title,
                           quantity, unit_price, total_price",
            )
            .bind(purchase.id.as_i32())
            .bind(product_id.as_i32())
            .bind(quantity)
            .bind(unit_price)
            .bind(unit_price * Decimal::from(quantity))
            .fetch_one(&mut *tx)
            .await?;

            purchase.items.push(item_row.into());
        }

        tx.commit().await?;
        Ok(purchase)
    }

    /// A merchant's received orders, newest first, with items attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Purchase>, RepositoryError> {
        let rows = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let mut purchases: Vec<Purchase> = rows.into_iter().map(Into::into).collect();
        if purchases.is_empty() {
            return Ok(purchases);
        }

        let ids: Vec<i32> = purchases.iter().map(|p| p.id.as_i32()).collect();
        let item_rows = sqlx::query_as::<_, PurchaseItemRow>(
            "SELECT pi.id, pi.purchase_id, pi.product_id, p.title AS product_title,
                    pi.quantity, pi.unit_price, pi.total_price
             FROM purchase_items pi
             LEFT JOIN products p ON p.id = pi.product_id
             WHERE pi.purchase_id = ANY($1)
             ORDER BY pi.id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        for row in item_rows {
            let item: PurchaseItem = row.into();
            if let Some(purchase) = purchases.iter_mut().find(|p| p.id == item.purchase_id) {
                purchase.items.push(item);
            }
        }

        Ok(purchases)
    }
}
