//! Reference data seeding.

use rust_decimal::Decimal;

use super::{CommandError, connect};

/// Default plan catalog (prices in COP). The free plan caps products at 3,
/// mirroring the production pricing page.
const DEFAULT_PLANS: &[(&str, i64, &str, Option<i32>, bool)] = &[
    ("Gratis", 0, "Plan gratuito con limitaciones", Some(3), true),
    ("Emprendedor", 29_900, "Hasta 50 productos", Some(50), false),
    ("Profesional", 59_900, "Productos ilimitados", None, false),
];

/// Insert the default plans if they are not present yet.
///
/// Idempotent: existing plans (matched by name) are left untouched.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn plans() -> Result<(), CommandError> {
    let pool = connect().await?;

    for &(name, price, description, product_limit, is_free) in DEFAULT_PLANS {
        let inserted = sqlx::query(
            "INSERT INTO plans (name, price, description, product_limit, is_free)
             SELECT $1, $2, $3, $4, $5
             WHERE NOT EXISTS (SELECT 1 FROM plans WHERE name = $1)",
        )
        .bind(name)
        .bind(Decimal::from(price))
        .bind(description)
        .bind(product_limit)
        .bind(is_free)
        .execute(&pool)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!(plan = %name, "Plan seeded");
        } else {
            tracing::info!(plan = %name, "Plan already present, skipped");
        }
    }

    Ok(())
}
