//! # User Repository
//!
//! Stored logins. Passwords are kept as argon2 PHC strings; the plain text
//! never reaches the database.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use mostrador_core::{User, ValidationError};

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a login with a freshly salted argon2 hash.
    ///
    /// ## Errors
    /// - `Domain(Validation)` for a blank username or password
    /// - `UniqueViolation` when the username is taken
    pub async fn create(&self, username: &str, password: &str) -> DbResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::required("username").into());
        }
        if password.is_empty() {
            return Err(ValidationError::required("password").into());
        }

        let password_hash = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES (?1, ?2)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("username", username))?;

        info!(username = %user.username, "User created");
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?1",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Checks a username/password pair. Unknown users simply don't match.
    pub async fn verify(&self, username: &str, password: &str) -> DbResult<bool> {
        let Some(user) = self.get_by_username(username).await? else {
            debug!(username = %username.trim(), "Unknown username");
            return Ok(false);
        };

        Ok(verify_password(password, &user.password_hash))
    }
}

fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_verify() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let user = users.create("caja1", "s3creta").await.unwrap();
        assert_ne!(user.password_hash, "s3creta");
        assert!(user.password_hash.starts_with("$argon2"));

        assert!(users.verify("caja1", "s3creta").await.unwrap());
        assert!(!users.verify("caja1", "otra").await.unwrap());
        assert!(!users.verify("nadie", "s3creta").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        users.create("caja1", "uno").await.unwrap();
        let err = users.create("caja1", "dos").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::UniqueViolation { ref field, .. } if field == "username"
        ));
    }

    #[tokio::test]
    async fn test_blank_credentials_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.users().create("  ", "x").await.is_err());
        assert!(db.users().create("caja1", "").await.is_err());
    }
}
