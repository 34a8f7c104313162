//! # User Repository
//!
//! Staff accounts. Passwords are stored as Argon2 PHC strings and never
//! selected back out: every query here lists its columns explicitly and
//! leaves `password_hash` behind.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use kasir_core::input::{CreateUserInput, UpdateUserInput};
use kasir_core::User;

const USER_COLUMNS: &str = "id, username, full_name, role, is_active, created_at, updated_at";

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user with a freshly hashed password.
    ///
    /// ## Errors
    /// * `Domain(Validation)` - username/full name/password rules
    /// * `UniqueViolation` - username taken
    pub async fn create(&self, input: &CreateUserInput) -> DbResult<User> {
        input.validate()?;
        debug!(username = %input.username, role = ?input.role, "Creating user");

        let password_hash = hash_password(&input.password)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, full_name, role, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
            "#,
        )
        .bind(input.username.trim())
        .bind(&password_hash)
        .bind(input.full_name.trim())
        .bind(input.role)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(user_id = id, username = %input.username, "User created");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Applies the fields present in `input`; absent fields are left alone.
    pub async fn update(&self, input: &UpdateUserInput) -> DbResult<User> {
        input.validate()?;
        debug!(user_id = input.id, "Updating user");

        let password_hash = match &input.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let result = sqlx::query(
            r#"
            UPDATE users SET
                username      = COALESCE(?2, username),
                full_name     = COALESCE(?3, full_name),
                password_hash = COALESCE(?4, password_hash),
                role          = COALESCE(?5, role),
                is_active     = COALESCE(?6, is_active),
                updated_at    = ?7
            WHERE id = ?1
            "#,
        )
        .bind(input.id)
        .bind(input.username.as_deref().map(str::trim))
        .bind(input.full_name.as_deref().map(str::trim))
        .bind(password_hash)
        .bind(input.role)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", input.id));
        }

        self.get_by_id(input.id)
            .await?
            .ok_or_else(|| DbError::not_found("User", input.id))
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// All users, oldest account first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password into an Argon2 PHC string with a random salt.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
