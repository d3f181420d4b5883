use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub async fn create(pool: &PgPool, username: &str) -> Result<Self> {
        let user = sqlx::query_as::<_, User>(
            "
            INSERT INTO users (username)
            VALUES ($1)
            RETURNING user_id, username, created_at, updated_at
            ",
        )
        .bind(username)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            "
            SELECT user_id, username, created_at, updated_at
            FROM users
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_token(pool: &PgPool, token: Uuid) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            "
            SELECT u.user_id, u.username, u.created_at, u.updated_at
            FROM users u
            JOIN api_tokens t ON t.user_id = u.user_id
            WHERE t.token = $1
            ",
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

/// Opaque credential a client presents as `Authorization: Token <uuid>`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApiToken {
    pub token: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ApiToken {
    pub async fn create(pool: &PgPool, user_id: Uuid) -> Result<Self> {
        let token = sqlx::query_as::<_, ApiToken>(
            "
            INSERT INTO api_tokens (user_id)
            VALUES ($1)
            RETURNING token, user_id, created_at
            ",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }
}
