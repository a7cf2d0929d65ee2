//! Catalog models: products, categories, brands, attributes, variations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use treggio_core::{
    AttributeId, BrandId, CategoryId, ProductId, ProductImageId, ProductState, PropertyId, Slug,
    SpecificationId, UserId, VariationId,
};

/// A catalog product.
///
/// The three category references mirror the storefront's three-level
/// navigation; any of them may be unset.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub user_id: UserId,
    pub title: String,
    pub slug: Slug,
    pub sku: Option<String>,
    pub price: Decimal,
    /// Cover image path under the media root.
    pub image: Option<String>,
    pub state: ProductState,
    pub description: Option<String>,
    /// Free-form tag list as stored (plain array or legacy object shapes).
    pub tags: Option<serde_json::Value>,
    pub brand_id: Option<BrandId>,
    pub category_first_id: Option<CategoryId>,
    pub category_second_id: Option<CategoryId>,
    pub category_third_id: Option<CategoryId>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A gallery image attached to a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub path: String,
}

/// A category in the three-level hierarchy.
///
/// `depth` is 1 for top-level categories, 2 for subcategories, 3 for leaves;
/// `parent_id` is set for depth 2 and 3.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserId,
    pub name: String,
    pub image: Option<String>,
    pub state: bool,
    pub parent_id: Option<CategoryId>,
    pub depth: i16,
    pub created_at: DateTime<Utc>,
}

/// A product brand.
#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub id: BrandId,
    pub user_id: UserId,
    pub name: String,
    pub state: bool,
    pub created_at: DateTime<Utc>,
}

/// A variation axis (e.g., "Color", "Size") owned by a tenant.
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub user_id: UserId,
    pub name: String,
    /// Input widget hint for the admin frontend (select, radio, color...).
    pub kind: String,
    pub state: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// A selectable value under an attribute (e.g., "Red" with code `#ff0000`).
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub id: PropertyId,
    pub attribute_id: AttributeId,
    pub name: String,
    pub code: Option<String>,
}

/// A sellable variation of a product. Nested variations reference their
/// parent (e.g., Color=Red -> Size=M).
#[derive(Debug, Clone, Serialize)]
pub struct Variation {
    pub id: VariationId,
    pub product_id: ProductId,
    pub parent_id: Option<VariationId>,
    pub attribute_id: AttributeId,
    pub property_id: PropertyId,
    /// Price delta added to the product's base price.
    pub add_price: Decimal,
    pub stock: i32,
}

/// A descriptive attribute/value pair shown on the product page.
#[derive(Debug, Clone, Serialize)]
pub struct Specification {
    pub id: SpecificationId,
    pub product_id: ProductId,
    pub attribute_id: AttributeId,
    pub property_id: PropertyId,
}
