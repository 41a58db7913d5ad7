//! Outlet catalog service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use shared::models::Outlet;
use shared::types::{PaginatedResponse, Pagination};

use crate::error::{AppError, AppResult};

/// Outlet service for catalog reads and activation toggles
#[derive(Clone)]
pub struct OutletService {
    db: PgPool,
}

/// Input for creating an outlet
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOutletInput {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub address: Option<String>,
}

/// Input for updating an outlet
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOutletInput {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    pub address: Option<String>,
}

impl OutletService {
    /// Create a new OutletService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List outlets by name, alphabetically, with an exact total
    pub async fn list(
        &self,
        search: Option<&str>,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Outlet>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM outlets
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            "#,
        )
        .bind(search)
        .fetch_one(&self.db)
        .await?;

        let outlets = sqlx::query_as::<_, OutletRow>(
            r#"
            SELECT id, name, address, is_active, created_at, updated_at
            FROM outlets
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(
            outlets.into_iter().map(Outlet::from).collect(),
            pagination,
            total as u64,
        ))
    }

    /// Get an outlet by id
    pub async fn get(&self, id: Uuid) -> AppResult<Outlet> {
        sqlx::query_as::<_, OutletRow>(
            r#"
            SELECT id, name, address, is_active, created_at, updated_at
            FROM outlets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(Outlet::from)
        .ok_or_else(|| AppError::NotFound("Outlet".to_string()))
    }

    /// Create an outlet
    pub async fn create(&self, input: CreateOutletInput) -> AppResult<Outlet> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let outlet = sqlx::query_as::<_, OutletRow>(
            r#"
            INSERT INTO outlets (name, address)
            VALUES ($1, $2)
            RETURNING id, name, address, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(outlet.into())
    }

    /// Update an outlet's details
    pub async fn update(&self, id: Uuid, input: UpdateOutletInput) -> AppResult<Outlet> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let existing = self.get(id).await?;

        let outlet = sqlx::query_as::<_, OutletRow>(
            r#"
            UPDATE outlets
            SET name = $1, address = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, address, is_active, created_at, updated_at
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.address.or(existing.address))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(outlet.into())
    }

    /// Toggle the active flag
    pub async fn toggle_active(&self, id: Uuid, is_active: bool) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE outlets SET is_active = $1, updated_at = NOW() WHERE id = $2")
                .bind(is_active)
                .bind(id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Outlet".to_string()));
        }

        Ok(())
    }
}

/// Database row mapped into the shared model
#[derive(Debug, FromRow)]
struct OutletRow {
    id: Uuid,
    name: String,
    address: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OutletRow> for Outlet {
    fn from(row: OutletRow) -> Self {
        Outlet {
            id: row.id,
            name: row.name,
            address: row.address,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
