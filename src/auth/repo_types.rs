use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String, // trimmed, lower-cased
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub session_version: i64,
}

/// Password reset token. Only the SHA-256 digest of the raw token is stored.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
    pub used_at: Option<OffsetDateTime>,
}

impl PasswordResetToken {
    pub fn is_active(&self, now: OffsetDateTime) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn token(expires_in: Duration, used: bool) -> PasswordResetToken {
        let now = OffsetDateTime::now_utc();
        PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            expires_at: now + expires_in,
            used_at: used.then_some(now),
        }
    }

    #[test]
    fn fresh_token_is_active() {
        assert!(token(Duration::hours(1), false).is_active(OffsetDateTime::now_utc()));
    }

    #[test]
    fn used_or_expired_token_is_inactive() {
        let now = OffsetDateTime::now_utc();
        assert!(!token(Duration::hours(1), true).is_active(now));
        assert!(!token(Duration::seconds(-1), false).is_active(now));
    }
}
