use crate::auth::repo_types::{PasswordResetToken, User};
use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, created_at, last_login, session_version";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by username, or by email (compared lower-cased).
    pub async fn find_by_login(db: &SqlitePool, identifier: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? OR email = ? LIMIT 1"
        ))
        .bind(identifier)
        .bind(identifier.to_lowercase())
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// True when either the username or the email is already registered.
    pub async fn exists(db: &SqlitePool, username: &str, email: &str) -> anyhow::Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(db)
                .await?;
        Ok(count > 0)
    }

    /// Create a new user with hashed password.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    pub async fn touch_last_login(db: &SqlitePool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(OffsetDateTime::now_utc())
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Store a new hash and bump the session version, which signs out every
    /// session issued before the change. Returns the new version.
    pub async fn update_password(db: &SqlitePool, id: Uuid, password_hash: &str) -> anyhow::Result<i64> {
        let (version,): (i64,) = sqlx::query_as(
            r#"
            UPDATE users
               SET password_hash = ?, session_version = session_version + 1
             WHERE id = ?
            RETURNING session_version
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .fetch_one(db)
        .await
        .context("update password")?;
        Ok(version)
    }

    /// Delete the user; step events and reset tokens go with it (ON DELETE CASCADE).
    pub async fn delete(db: &SqlitePool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }
}

impl PasswordResetToken {
    pub async fn create(
        db: &SqlitePool,
        user_id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<PasswordResetToken> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, expires_at, used_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
        .context("insert reset token")?;
        Ok(token)
    }

    pub async fn find_by_hash(
        db: &SqlitePool,
        token_hash: &str,
    ) -> anyhow::Result<Option<PasswordResetToken>> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, user_id, expires_at, used_at
            FROM password_reset_tokens
            WHERE token_hash = ?
            "#,
        )
        .bind(token_hash)
        .fetch_optional(db)
        .await?;
        Ok(token)
    }

    /// Set the new password, bump the session version and burn the token in
    /// one transaction. Returns false if the token was consumed concurrently.
    pub async fn consume(
        db: &SqlitePool,
        token_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let mut tx = db.begin().await.context("begin tx")?;

        let burned = sqlx::query(
            "UPDATE password_reset_tokens SET used_at = ? WHERE id = ? AND used_at IS NULL",
        )
        .bind(OffsetDateTime::now_utc())
        .bind(token_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if burned == 0 {
            tx.rollback().await.context("rollback tx")?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE users SET password_hash = ?, session_version = session_version + 1 WHERE id = ?",
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.context("commit tx")?;
        Ok(true)
    }
}
