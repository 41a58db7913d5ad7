//! Merchant catalog service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use shared::types::{PaginatedResponse, Pagination};
use shared::validation::validate_indonesian_phone;

use crate::error::{AppError, AppResult};

/// Merchant service for catalog reads and activation toggles
#[derive(Clone)]
pub struct MerchantService {
    db: PgPool,
}

/// Merchant row with creator display name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MerchantView {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub creator_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a merchant
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMerchantInput {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub phone_number: String,
    pub address: Option<String>,
    pub image_url: Option<String>,
}

/// Input for updating a merchant
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMerchantInput {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
}

fn check_phone(phone: &str) -> AppResult<()> {
    validate_indonesian_phone(phone).map_err(|msg| AppError::Validation {
        field: "phone_number".to_string(),
        message: msg.to_string(),
        message_id: "Nomor telepon tidak valid".to_string(),
    })
}

impl MerchantService {
    /// Create a new MerchantService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List merchants by name, alphabetically, with an exact total
    pub async fn list(
        &self,
        search: Option<&str>,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<MerchantView>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM merchants
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            "#,
        )
        .bind(search)
        .fetch_one(&self.db)
        .await?;

        let merchants = sqlx::query_as::<_, MerchantView>(
            r#"
            SELECT m.id, m.name, m.phone_number, m.address, m.image_url, m.is_active,
                   p.fullname AS creator_name, m.created_at, m.updated_at
            FROM merchants m
            LEFT JOIN profiles p ON p.id = m.created_by
            WHERE ($1::text IS NULL OR m.name ILIKE '%' || $1 || '%')
            ORDER BY m.name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(merchants, pagination, total as u64))
    }

    /// Get a merchant by id
    pub async fn get(&self, id: Uuid) -> AppResult<MerchantView> {
        sqlx::query_as::<_, MerchantView>(
            r#"
            SELECT m.id, m.name, m.phone_number, m.address, m.image_url, m.is_active,
                   p.fullname AS creator_name, m.created_at, m.updated_at
            FROM merchants m
            LEFT JOIN profiles p ON p.id = m.created_by
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Merchant".to_string()))
    }

    /// Register a merchant
    pub async fn create(&self, actor: Uuid, input: CreateMerchantInput) -> AppResult<MerchantView> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        check_phone(&input.phone_number)?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO merchants (name, phone_number, address, image_url, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone_number)
        .bind(&input.address)
        .bind(&input.image_url)
        .bind(actor)
        .fetch_one(&self.db)
        .await?;

        self.get(id).await
    }

    /// Update a merchant's details
    pub async fn update(&self, id: Uuid, input: UpdateMerchantInput) -> AppResult<MerchantView> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        if let Some(phone) = &input.phone_number {
            check_phone(phone)?;
        }

        let existing = self.get(id).await?;

        let result = sqlx::query(
            r#"
            UPDATE merchants
            SET name = $1, phone_number = $2, address = $3, image_url = $4, updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.phone_number.unwrap_or(existing.phone_number))
        .bind(input.address.or(existing.address))
        .bind(input.image_url.or(existing.image_url))
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Merchant".to_string()));
        }

        self.get(id).await
    }

    /// Toggle the active flag
    pub async fn toggle_active(&self, id: Uuid, is_active: bool) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE merchants SET is_active = $1, updated_at = NOW() WHERE id = $2")
                .bind(is_active)
                .bind(id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Merchant".to_string()));
        }

        Ok(())
    }
}
