//! User persistence.
//!
//! Session resolution depends only on the [`UserStore`] trait; the Postgres
//! implementation is injected at bootstrap so nothing above this layer
//! needs a database to be exercised.
use crate::domain::user::User;
use anyhow::Context;
use async_trait::async_trait;
use secrecy::SecretBox;
use sqlx::{PgPool, Row};
use std::sync::Arc;

/// Look up a user by primary key.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_by_id(&self, id: i32) -> Result<Option<User>, anyhow::Error>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn user_by_id(&self, id: i32) -> Result<Option<User>, anyhow::Error> {
        let row = sqlx::query("SELECT id, username, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query user by id")?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            username: r.get("username"),
            email: r.get("email"),
        }))
    }
}

/// Resolves the identifier the session stores into a full user.
pub struct UserLoader {
    store: Arc<dyn UserStore>,
}

impl UserLoader {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Never fails: a malformed identifier or a lookup error is logged and
    /// resolves to no user, so session resolution cannot crash a request.
    #[tracing::instrument(name = "Load user from session id", skip(self))]
    pub async fn load(&self, raw_id: &str) -> Option<User> {
        let id = match raw_id.parse::<i32>() {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(raw_id, error = %e, "session holds an invalid user id");
                return None;
            }
        };

        match self.store.user_by_id(id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(
                    user_id = id,
                    error.cause_chain = ?e,
                    "failed to load user for session"
                );
                None
            }
        }
    }
}

#[tracing::instrument(name = "Get stored credentials", skip(username, pool))]
pub async fn stored_credentials(
    username: &str,
    pool: &PgPool,
) -> Result<Option<(i32, SecretBox<String>)>, anyhow::Error> {
    let result = sqlx::query("SELECT id, password FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to perform a query to retrieve stored credentials")?
        .map(|r| {
            (
                r.get::<i32, _>("id"),
                SecretBox::new(Box::new(r.get::<String, _>("password"))),
            )
        });

    Ok(result)
}

#[tracing::instrument(name = "Find user by email", skip(pool))]
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, anyhow::Error> {
    let row = sqlx::query("SELECT id, username, email FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to query user by email")?;

    Ok(row.map(|r| User {
        id: r.get("id"),
        username: r.get("username"),
        email: r.get("email"),
    }))
}

#[tracing::instrument(name = "Update password hash", skip(password_hash, pool))]
pub async fn update_password_hash(
    user_id: i32,
    password_hash: String,
    pool: &PgPool,
) -> Result<(), anyhow::Error> {
    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to change the user's password in the db")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{UserLoader, UserStore};
    use crate::domain::user::User;
    use async_trait::async_trait;
    use claims::{assert_none, assert_some};
    use std::sync::Arc;

    struct StubStore {
        user: Option<User>,
        fail: bool,
    }

    #[async_trait]
    impl UserStore for StubStore {
        async fn user_by_id(&self, _id: i32) -> Result<Option<User>, anyhow::Error> {
            if self.fail {
                Err(anyhow::anyhow!("store unavailable"))
            } else {
                Ok(self.user.clone())
            }
        }
    }

    fn loader(user: Option<User>, fail: bool) -> UserLoader {
        UserLoader::new(Arc::new(StubStore { user, fail }))
    }

    fn a_user() -> User {
        User {
            id: 7,
            username: "mjimenez".to_string(),
            email: "mjimenez@example.com".to_string(),
        }
    }

    #[actix_web::test]
    async fn non_integer_identifier_resolves_to_no_user() {
        assert_none!(loader(Some(a_user()), false).load("not-an-integer").await);
    }

    #[actix_web::test]
    async fn store_errors_resolve_to_no_user() {
        assert_none!(loader(Some(a_user()), true).load("7").await);
    }

    #[actix_web::test]
    async fn known_identifier_resolves_to_the_user() {
        let user = assert_some!(loader(Some(a_user()), false).load("7").await);
        assert_eq!(user.username, "mjimenez");
    }

    #[actix_web::test]
    async fn unknown_identifier_resolves_to_no_user() {
        assert_none!(loader(None, false).load("7").await);
    }
}
