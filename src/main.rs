use autointelli::configuration::get_configuration;
use autointelli::startup::Application;
use autointelli::telemetry::{get_tracing_subscriber, init_tracing_subscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_tracing_subscriber("autointelli".into(), "info".into(), std::io::stdout);
    init_tracing_subscriber(subscriber);

    // Panic if we can't read configuration. A missing DATABASE_URL surfaces
    // here, before any other component is wired up.
    let configuration = get_configuration().expect("Failed to read configuration");

    let application = Application::build(&configuration)
        .await
        .expect("Failed to build application");

    tracing::info!("serving on port {}", application.port());
    application.run_until_stopped().await
}
