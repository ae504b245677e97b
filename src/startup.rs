//! Application bootstrap.
//!
//! `Application::build` is the single factory: it takes the finalized
//! settings and returns a bound, fully wired server. Only the database
//! configuration is load-bearing; mail and Notion degrade with warnings.
use crate::configuration::Settings;
use crate::mailer::Mailer;
use crate::notion::{NotionHandle, build_notion_client};
use crate::repository::users::{PgUserStore, UserLoader};
use crate::routes;
use crate::tokens::TokenSerializer;
use actix_files::Files;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web::Data};
use actix_web_flash_messages::FlashMessagesFramework;
use actix_web_flash_messages::storage::CookieMessageStore;
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Public base URI of the deployment, used to build absolute links.
pub struct ApplicationBaseUrl(pub String);

/// Embedded schema migrations, applied via [`apply_migrations`] by the test
/// harness and ops tooling, never implicitly at boot.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: &Settings) -> Result<Self, anyhow::Error> {
        // The pool comes first: everything that touches the database hangs
        // off it.
        let pool = get_connection_pool(configuration)?;

        let notion_client = build_notion_client(&configuration.notion);
        let mailer = Mailer::new(
            &configuration.mail,
            &configuration.application.template_dir(),
        );

        // Built from the final secret key, after every configuration read.
        let serializer = TokenSerializer::new(&configuration.secret_key);

        let listener = TcpListener::bind((
            configuration.application.host.as_str(),
            configuration.application.port,
        ))?;
        let port = listener.local_addr()?.port();

        let server = run(
            listener,
            pool,
            serializer,
            NotionHandle::from(notion_client),
            mailer,
            configuration.application.base_uri.clone(),
            configuration.application.static_dir(),
            &configuration.secret_key,
        )?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

/// Lazy pool: connections are established on first use, so building the
/// application does not require the database to be reachable.
pub fn get_connection_pool(configuration: &Settings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy(&configuration.database_url)
}

pub async fn apply_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Cookie-signing key derived from the configured secret. SHA-512 output is
/// exactly the 64 bytes `Key::from` requires, so any non-empty secret works.
fn signing_key(secret_key: &str) -> Key {
    let digest = Sha512::digest(secret_key.as_bytes());
    Key::from(&digest)
}

#[allow(clippy::too_many_arguments)]
fn run(
    listener: TcpListener,
    pool: PgPool,
    serializer: TokenSerializer,
    notion: NotionHandle,
    mailer: Mailer,
    base_uri: String,
    static_dir: PathBuf,
    secret_key: &str,
) -> std::io::Result<Server> {
    let user_loader = Data::new(UserLoader::new(Arc::new(PgUserStore::new(pool.clone()))));
    let pool = Data::new(pool);
    let serializer = Data::new(serializer);
    let notion = Data::new(notion);
    let mailer = Data::new(mailer);
    let base_url = Data::new(ApplicationBaseUrl(base_uri));

    let key = signing_key(secret_key);
    let message_store = CookieMessageStore::builder(key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let openapi = routes::docs::ApiDoc::openapi();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                key.clone(),
            ))
            .wrap(Logger::default())
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .service(Files::new("/static", static_dir.clone()))
            .service(routes::health_check)
            .service(routes::index::index_page)
            .service(routes::auth::scope())
            .service(routes::solicitudes::scope())
            .service(routes::ajustes::scope())
            .service(routes::proyectos::scope())
            .service(routes::accesorios::scope())
            .service(routes::almacen::scope())
            .service(routes::compras::scope())
            .app_data(pool.clone())
            .app_data(serializer.clone())
            .app_data(notion.clone())
            .app_data(mailer.clone())
            .app_data(user_loader.clone())
            .app_data(base_url.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
