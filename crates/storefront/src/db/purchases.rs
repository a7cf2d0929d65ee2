//! Checkout intake: the storefront's only write path.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use treggio_core::UserId;

use super::RepositoryError;

/// A recorded purchase, as returned to the buyer.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub id: i32,
    pub total: Decimal,
    pub buyer_name: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ReceiptItem>,
}

/// One line on a receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptItem {
    pub product_id: i32,
    pub product_title: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Validated checkout payload.
#[derive(Debug, Clone)]
pub struct CheckoutInput<'a> {
    pub store_id: UserId,
    pub buyer_name: &'a str,
    pub address: &'a str,
    pub city: &'a str,
    pub phone: &'a str,
    pub payment_method: Option<&'a str>,
    pub comment: Option<&'a str>,
    /// (product id, quantity) pairs.
    pub items: &'a [(i32, i32)],
}

/// Repository for checkout intake.
pub struct CheckoutRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutRepository<'a> {
    /// Create a new checkout repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a purchase and its items in one transaction.
    ///
    /// Unit prices come from the product rows; the purchase total is the sum
    /// of the computed line totals plus the store's shipping rate, so a
    /// tampered client total never reaches the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when an item does not belong to
    /// the store (or is unpublished), `RepositoryError::Database` otherwise.
    pub async fn create(&self, input: &CheckoutInput<'_>) -> Result<Receipt, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut items: Vec<ReceiptItem> = Vec::with_capacity(input.items.len());
        let mut subtotal = Decimal::ZERO;

        for &(product_id, quantity) in input.items {
            let row: Option<(String, Decimal)> = sqlx::query_as(
                "SELECT title, price FROM products
                 WHERE id = $1 AND user_id = $2 AND state = 'published'
                   AND deleted_at IS NULL",
            )
            .bind(product_id)
            .bind(input.store_id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;

            let Some((title, unit_price)) = row else {
                return Err(RepositoryError::NotFound);
            };

            let quantity = quantity.max(1);
            let total_price = unit_price * Decimal::from(quantity);
            subtotal += total_price;
            items.push(ReceiptItem {
                product_id,
                product_title: title,
                quantity,
                unit_price,
                total_price,
            });
        }

        let shipping: Decimal = sqlx::query_scalar(
            "SELECT CASE WHEN is_free THEN 0 ELSE rate END
             FROM user_shipping_options WHERE user_id = $1",
        )
        .bind(input.store_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        let total = subtotal + shipping;

        let (purchase_id, created_at): (i32, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO purchases
                 (user_id, total, buyer_name, address, city, phone, payment_method, comment)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, created_at",
        )
        .bind(input.store_id.as_i32())
        .bind(total)
        .bind(input.buyer_name)
        .bind(input.address)
        .bind(input.city)
        .bind(input.phone)
        .bind(input.payment_method)
        .bind(input.comment)
        .fetch_one(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                "INSERT INTO purchase_items
                     (purchase_id, product_id, quantity, unit_price, total_price)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(purchase_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Receipt {
            id: purchase_id,
            total,
            buyer_name: input.buyer_name.to_string(),
            created_at,
            items,
        })
    }
}
