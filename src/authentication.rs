use crate::domain::user::CurrentUser;
use crate::error::authentication::AuthError;
use crate::repository::users::{UserLoader, stored_credentials};
use crate::session_state::TypedSession;
use crate::telemetry::spawn_blocking_with_tracing;
use crate::util::e500;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{
    FromRequest, HttpMessage, HttpResponse,
    body::{EitherBody, MessageBody},
    http::header,
    web::Data,
};
use actix_web_flash_messages::FlashMessage;
use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier};
use secrecy::{ExposeSecret, SecretBox};
use sqlx::PgPool;

/// Login policy: where unauthenticated requests are sent, and the flash
/// message (category *info*) they see there.
pub const LOGIN_VIEW: &str = "/auth/login";
pub const LOGIN_MESSAGE: &str = "Por favor, inicia sesión para acceder a esta página.";

pub struct Credentials {
    pub username: String,
    pub password: SecretBox<String>,
}

#[tracing::instrument(name = "Verify password", skip(expected_password, password))]
fn verify_password(
    expected_password: SecretBox<String>,
    password: SecretBox<String>,
) -> Result<(), AuthError> {
    let expected_password = PasswordHash::new(expected_password.expose_secret())
        .context("Failed to parse hash in PHC string format")
        .map_err(AuthError::UnexpectedError)?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &expected_password)
        .context("Invalid password")
        .map_err(AuthError::InvalidCredentials)
}

#[tracing::instrument(name = "Validate credentials", skip(credentials, pool))]
pub async fn validate_credentials(
    credentials: Credentials,
    pool: &PgPool,
) -> Result<i32, AuthError> {
    let mut user_id = None;
    // Fallback hash so unknown usernames take as long as wrong passwords.
    let mut expected_password = SecretBox::new(Box::new(
        "$argon2id$v=19$m=15000,t=2,p=1$h1UJKS5nfDpeNWSscpDd6g$Hm5+wPVIJo5N+Rt+PUlHLhk88e5EHYdb7lRUKCWiW8s".to_string(),
    ));

    if let Some((stored_user_id, stored_expected_password)) =
        stored_credentials(&credentials.username, pool)
            .await
            .map_err(AuthError::UnexpectedError)?
    {
        user_id = Some(stored_user_id);
        expected_password = stored_expected_password;
    };

    spawn_blocking_with_tracing(move || verify_password(expected_password, credentials.password))
        .await
        .context("Failed to spawn blocking task")
        .map_err(AuthError::UnexpectedError)??;

    user_id.ok_or_else(|| AuthError::InvalidCredentials(anyhow::anyhow!("Unknown username.")))
}

#[tracing::instrument(name = "Update password", skip(password, pool))]
pub async fn update_password(
    user_id: i32,
    password: String,
    pool: &PgPool,
) -> Result<(), anyhow::Error> {
    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await?
        .context("Failed to hash password")?;

    crate::repository::users::update_password_hash(user_id, password_hash, pool).await
}

pub fn compute_password_hash(password: String) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let params = Params::new(15000, 2, 1, None)
        .map_err(|e| anyhow::anyhow!("Invalid argon2 parameters: {e}"))?;
    let password_hash = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?
        .to_string();

    Ok(password_hash)
}

/// Middleware guarding the business blueprints. A resolved user is exposed
/// to handlers as [`CurrentUser`]; anyone else is flashed the login message
/// and redirected to the login view.
#[tracing::instrument(name = "Anonymous check", skip(loader, req, next))]
pub async fn reject_anonymous_users(
    loader: Data<UserLoader>,
    mut req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, actix_web::Error> {
    let session = {
        let (http_request, payload) = req.parts_mut();
        TypedSession::from_request(http_request, payload).await
    }?;

    let user = match session.get_user_id().map_err(e500)? {
        Some(raw_id) => loader.load(&raw_id).await,
        None => None,
    };

    match user {
        Some(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            let res = next.call(req).await?;
            Ok(res.map_body(|_, body| EitherBody::left(body)))
        }
        None => {
            FlashMessage::info(LOGIN_MESSAGE).send();
            let response = HttpResponse::SeeOther()
                .insert_header((header::LOCATION, LOGIN_VIEW))
                .finish();

            let res = req.into_response(response);
            Ok(res.map_body(|_, body| EitherBody::right(body)))
        }
    }
}
