//! Product catalog service
//!
//! Product reads embed derived per-outlet stock so listings never depend on
//! a stored counter; the numbers come from the same ledger aggregation the
//! settlement engine uses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use shared::types::{PaginatedResponse, Pagination};
use shared::validation::{validate_price_pair, validate_sku};

use crate::error::{AppError, AppResult};

/// Product service for catalog reads and activation toggles
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product row with merchant display name
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    merchant_id: Uuid,
    name: String,
    sku: String,
    cost_price: Decimal,
    selling_price: Decimal,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    merchant_name: Option<String>,
}

/// Derived on-hand stock of a product at one outlet
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OutletStock {
    #[serde(skip_serializing)]
    pub product_id: Uuid,
    pub outlet_id: Uuid,
    pub outlet_name: Option<String>,
    pub qty: i64,
}

/// A product flattened for presentation, with derived stock
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub name: String,
    pub sku: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub profit: Decimal,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub merchant_name: String,
    /// Total derived stock across outlets
    pub stock: i64,
    pub inventory_details: Vec<OutletStock>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    pub merchant_id: Uuid,
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub sku: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub image_url: Option<String>,
}

/// Input for updating a product
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub image_url: Option<String>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products with merchant names and derived per-outlet stock
    pub async fn list(
        &self,
        search: Option<&str>,
        merchant_id: Option<Uuid>,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<ProductView>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM products
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::uuid IS NULL OR merchant_id = $2)
            "#,
        )
        .bind(search)
        .bind(merchant_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT pr.id, pr.merchant_id, pr.name, pr.sku, pr.cost_price, pr.selling_price,
                   pr.image_url, pr.is_active, pr.created_at, pr.updated_at,
                   m.name AS merchant_name
            FROM products pr
            LEFT JOIN merchants m ON m.id = pr.merchant_id
            WHERE ($1::text IS NULL OR pr.name ILIKE '%' || $1 || '%')
              AND ($2::uuid IS NULL OR pr.merchant_id = $2)
            ORDER BY pr.name ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(search)
        .bind(merchant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let stocks = self.derived_stocks(&ids).await?;

        let products = rows
            .into_iter()
            .map(|row| {
                let details: Vec<OutletStock> = stocks
                    .iter()
                    .filter(|s| s.product_id == row.id)
                    .cloned()
                    .collect();
                build_view(row, details)
            })
            .collect();

        Ok(PaginatedResponse::new(products, pagination, total as u64))
    }

    /// Get a product by id with derived stock
    pub async fn get(&self, id: Uuid) -> AppResult<ProductView> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT pr.id, pr.merchant_id, pr.name, pr.sku, pr.cost_price, pr.selling_price,
                   pr.image_url, pr.is_active, pr.created_at, pr.updated_at,
                   m.name AS merchant_name
            FROM products pr
            LEFT JOIN merchants m ON m.id = pr.merchant_id
            WHERE pr.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let stocks = self.derived_stocks(&[id]).await?;

        Ok(build_view(row, stocks))
    }

    /// Create a product for a merchant
    pub async fn create(&self, actor: Uuid, input: CreateProductInput) -> AppResult<ProductView> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_sku(&input.sku).map_err(|msg| AppError::Validation {
            field: "sku".to_string(),
            message: msg.to_string(),
            message_id: "SKU tidak valid".to_string(),
        })?;
        validate_price_pair(input.cost_price, input.selling_price).map_err(|msg| {
            AppError::Validation {
                field: "selling_price".to_string(),
                message: msg.to_string(),
                message_id: "Harga tidak valid".to_string(),
            }
        })?;

        // Validate the merchant reference before inserting
        let merchant_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM merchants WHERE id = $1)")
                .bind(input.merchant_id)
                .fetch_one(&self.db)
                .await?;

        if !merchant_exists {
            return Err(AppError::NotFound("Merchant".to_string()));
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (merchant_id, name, sku, cost_price, selling_price, image_url, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.merchant_id)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(&input.image_url)
        .bind(actor)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                if db_err.code().as_deref() == Some("23505") {
                    return AppError::DuplicateEntry("sku".to_string());
                }
            }
            AppError::DatabaseError(err)
        })?;

        self.get(id).await
    }

    /// Update a product's details
    pub async fn update(&self, id: Uuid, input: UpdateProductInput) -> AppResult<ProductView> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = self.get(id).await?;

        let cost_price = input.cost_price.unwrap_or(existing.cost_price);
        let selling_price = input.selling_price.unwrap_or(existing.selling_price);
        validate_price_pair(cost_price, selling_price).map_err(|msg| AppError::Validation {
            field: "selling_price".to_string(),
            message: msg.to_string(),
            message_id: "Harga tidak valid".to_string(),
        })?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $1, cost_price = $2, selling_price = $3, image_url = $4, updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(cost_price)
        .bind(selling_price)
        .bind(input.image_url.or(existing.image_url))
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        self.get(id).await
    }

    /// Toggle the active flag
    pub async fn toggle_active(&self, id: Uuid, is_active: bool) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE products SET is_active = $1, updated_at = NOW() WHERE id = $2")
                .bind(is_active)
                .bind(id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    /// Derived stock per (product, outlet) for a set of products, straight
    /// from the event log.
    async fn derived_stocks(&self, product_ids: &[Uuid]) -> AppResult<Vec<OutletStock>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let stocks = sqlx::query_as::<_, OutletStock>(
            r#"
            SELECT sl.product_id, sl.outlet_id, o.name AS outlet_name,
                   SUM(CASE WHEN sl.type IN ('IN', 'ADJUSTMENT') THEN sl.quantity ELSE -sl.quantity END)::bigint AS qty
            FROM stock_logs sl
            LEFT JOIN outlets o ON o.id = sl.outlet_id
            WHERE sl.product_id = ANY($1)
            GROUP BY sl.product_id, sl.outlet_id, o.name
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(stocks)
    }
}

fn build_view(row: ProductRow, inventory_details: Vec<OutletStock>) -> ProductView {
    let stock = inventory_details.iter().map(|s| s.qty).sum();

    ProductView {
        id: row.id,
        merchant_id: row.merchant_id,
        name: row.name,
        sku: row.sku,
        cost_price: row.cost_price,
        selling_price: row.selling_price,
        profit: row.selling_price - row.cost_price,
        image_url: row.image_url,
        is_active: row.is_active,
        merchant_name: row
            .merchant_name
            .unwrap_or_else(|| "Unknown Merchant".to_string()),
        stock,
        inventory_details,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
