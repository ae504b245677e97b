use utoipa::OpenApi;

// API configuration and documentation
#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "autointelli", description = "Inventory, procurement and project management API")
    ),
    paths(
        crate::routes::health_check::health_check,
        crate::routes::index::index_page,
        crate::routes::auth::log_in,
        crate::routes::auth::login_form,
        crate::routes::auth::log_out,
        crate::routes::auth::forgot_password,
        crate::routes::auth::reset_password,
        crate::routes::solicitudes::overview,
        crate::routes::ajustes::overview,
        crate::routes::proyectos::overview,
        crate::routes::accesorios::overview,
        crate::routes::almacen::overview,
        crate::routes::compras::overview,
    )
)]
pub struct ApiDoc;
