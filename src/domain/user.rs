use serde::Serialize;
use sqlx::FromRow;

#[derive(Clone, Debug, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// The authenticated identity resolved from the session, exposed to
/// handlers as request data by the authentication middleware.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);
