use crate::authentication::{Credentials, update_password, validate_credentials};
use crate::domain::email::UserEmail;
use crate::domain::password::Password;
use crate::error::authentication::{AuthError, LoginError, StdResponse};
use crate::error::password_reset::PasswordResetError;
use crate::mailer::Mailer;
use crate::repository::users::find_by_email;
use crate::session_state::TypedSession;
use crate::startup::ApplicationBaseUrl;
use crate::tokens::TokenSerializer;
use crate::util::e500;
use actix_web::dev::HttpServiceFactory;
use actix_web::{HttpResponse, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use secrecy::SecretBox;
use sqlx::PgPool;
use std::fmt::Write;
use std::time::Duration;
use utoipa::ToSchema;

/// Reset tokens stay valid for one hour.
const RESET_TOKEN_MAX_AGE: Duration = Duration::from_secs(3600);

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/auth")
        .service(log_in)
        .service(login_form)
        .service(log_out)
        .service(forgot_password)
        .service(reset_password)
}

#[derive(serde::Deserialize, ToSchema, Debug)]
pub struct LoginData {
    username: String,
    password: String,
}

#[tracing::instrument(name = "Logging in", skip(form, pool, session), fields(username))]
#[utoipa::path(post, path = "/auth/login", responses(
    (status=200, description="Authentication successful"),
    (status=401, description="Authentication failed")))]
#[post("/login")]
pub async fn log_in(
    form: web::Form<LoginData>,
    pool: web::Data<PgPool>,
    session: TypedSession,
) -> Result<HttpResponse, LoginError> {
    let credentials = Credentials {
        username: form.0.username,
        password: SecretBox::new(Box::new(form.0.password)),
    };

    tracing::Span::current().record("username", tracing::field::display(&credentials.username));

    match validate_credentials(credentials, &pool).await {
        Ok(user_id) => {
            session.renew();
            session
                .insert_user_id(&user_id.to_string())
                .map_err(|e| LoginError::UnexpectedError(e.into()))?;

            Ok(HttpResponse::Ok().json(StdResponse {
                message: "inicio de sesión correcto",
            }))
        }
        Err(e) => match e {
            AuthError::InvalidCredentials(_) => Err(LoginError::AuthError(e.into())),
            AuthError::UnexpectedError(_) => Err(LoginError::UnexpectedError(e.into())),
        },
    }
}

/// The login view. Renders pending flash messages (the "please log in"
/// notice, login failures) for the caller.
#[tracing::instrument(name = "Login view", skip(flash_msgs))]
#[utoipa::path(get, path = "/auth/login", responses(
    (status=200, description="Login view with pending flash messages")))]
#[get("/login")]
pub async fn login_form(flash_msgs: IncomingFlashMessages) -> HttpResponse {
    let mut msg = String::new();

    for m in flash_msgs.iter() {
        writeln!(msg, "{}", m.content()).unwrap();
    }

    HttpResponse::Ok().json(serde_json::json!({ "message": msg }))
}

#[tracing::instrument(name = "Logging out", skip(session))]
#[utoipa::path(post, path = "/auth/logout", responses(
    (status=200, description="Session terminated")))]
#[post("/logout")]
pub async fn log_out(session: TypedSession) -> Result<HttpResponse, actix_web::Error> {
    if session.get_user_id().map_err(e500)?.is_some() {
        session.log_out();
        FlashMessage::info("Has cerrado sesión.").send();
    }

    Ok(HttpResponse::Ok().json(StdResponse {
        message: "sesión cerrada",
    }))
}

#[derive(serde::Deserialize, ToSchema, Debug)]
pub struct ForgotPasswordData {
    email: String,
}

/// Mints a time-limited reset token and mails a reset link. The response is
/// deliberately identical whether or not the address is known.
#[tracing::instrument(
    name = "Request password reset",
    skip(form, pool, serializer, mailer, base_url)
)]
#[utoipa::path(post, path = "/auth/forgot-password", responses(
    (status=200, description="Reset email dispatched if the address exists"),
    (status=400, description="Malformed email address")))]
#[post("/forgot-password")]
pub async fn forgot_password(
    form: web::Form<ForgotPasswordData>,
    pool: web::Data<PgPool>,
    serializer: web::Data<TokenSerializer>,
    mailer: web::Data<Mailer>,
    base_url: web::Data<ApplicationBaseUrl>,
) -> Result<HttpResponse, PasswordResetError> {
    let email = UserEmail::parse(form.0.email).map_err(PasswordResetError::ValidationError)?;

    if let Some(user) = find_by_email(&pool, email.as_ref()).await? {
        let token = serializer.sign(&user.id.to_string(), RESET_TOKEN_MAX_AGE)?;
        let reset_url = format!("{}/auth/reset-password?token={}", base_url.0, token);

        // Mail failures degrade: they are logged, never surfaced to the
        // caller, so the response stays uniform.
        if let Err(e) = mailer.send_password_reset(email.as_ref(), &reset_url).await {
            tracing::warn!(
                error.cause_chain = ?e,
                "failed to send the password reset email"
            );
        }
    }

    Ok(HttpResponse::Ok().json(StdResponse {
        message: "Si la dirección existe, se ha enviado un correo de recuperación.",
    }))
}

#[derive(serde::Deserialize, ToSchema)]
pub struct ResetPasswordData {
    token: String,
    new_password: String,
}

#[tracing::instrument(name = "Reset password", skip(form, pool, serializer))]
#[utoipa::path(post, path = "/auth/reset-password", responses(
    (status=200, description="Password updated"),
    (status=400, description="Invalid or expired token")))]
#[post("/reset-password")]
pub async fn reset_password(
    form: web::Form<ResetPasswordData>,
    pool: web::Data<PgPool>,
    serializer: web::Data<TokenSerializer>,
) -> Result<HttpResponse, PasswordResetError> {
    let new_password =
        Password::parse(form.0.new_password).map_err(PasswordResetError::ValidationError)?;

    let user_id = serializer
        .verify(&form.0.token)
        .map_err(PasswordResetError::InvalidToken)?
        .parse::<i32>()
        .map_err(|e| PasswordResetError::InvalidToken(e.into()))?;

    update_password(user_id, new_password.into_inner(), &pool).await?;

    FlashMessage::info("Tu contraseña ha sido actualizada.").send();
    Ok(HttpResponse::Ok().json(StdResponse {
        message: "contraseña actualizada",
    }))
}
