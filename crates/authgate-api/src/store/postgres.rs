//! PostgreSQL-backed identity and session storage
//!
//! Implements both collaborator traits over a shared connection pool.
//! Row structs stay private to this module; the rest of the crate only
//! sees the domain models.

use async_trait::async_trait;
use authgate_core::{
    IdentityResolver, Session, SessionStore, StoreError, StoreResult, User, UserRole,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Internal user row
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: Option<String>,
    name: String,
    avatar_url: Option<String>,
    role: String,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> StoreResult<User> {
        let role = UserRole::parse(&self.role)
            .ok_or_else(|| StoreError::Database(format!("unknown role: {}", self.role)))?;
        Ok(User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            avatar_url: self.avatar_url,
            role,
            email_verified: self.email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Internal session row
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    user_agent: Option<String>,
    ip_address: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            user_agent: row.user_agent,
            ip_address: row.ip_address,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL store for users and sessions
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        other => StoreError::Database(other.to_string()),
    }
}

#[async_trait]
impl IdentityResolver for PostgresStore {
    async fn find_user_by_id(&self, id: &str) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, name, avatar_url, role, email_verified, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.into_user()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, name, avatar_url, role, email_verified, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.into_user()
    }

    async fn create_user(&self, user: &mut User) -> StoreResult<()> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, name, avatar_url, role, email_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING id, email, password_hash, name, avatar_url, role, email_verified, created_at, updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .bind(user.role.as_str())
        .bind(user.email_verified)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        user.created_at = row.created_at;
        user.updated_at = row.updated_at;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PostgresStore {
    async fn create_session(&self, session: &mut Session) -> StoreResult<()> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, user_id, user_agent, ip_address, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, user_id, user_agent, ip_address, expires_at, created_at
            "#,
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        session.created_at = row.created_at;
        Ok(())
    }

    async fn find_session_by_id(&self, id: &str) -> StoreResult<Session> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, user_agent, ip_address, expires_at, created_at FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.into())
    }

    async fn list_active_sessions(&self, user_id: &str) -> StoreResult<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, user_agent, ip_address, expires_at, created_at
            FROM sessions
            WHERE user_id = $1 AND expires_at > NOW()
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(Session::from).collect())
    }

    async fn delete_session(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(result.rows_affected())
    }
}
