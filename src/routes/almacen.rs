//! Warehouse ("almacen") blueprint.
use crate::authentication::reject_anonymous_users;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, get, web};

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/almacen")
        .wrap(from_fn(reject_anonymous_users))
        .service(overview)
}

#[utoipa::path(get, path = "/almacen", responses(
    (status=200, description="Module overview"),
    (status=303, description="Redirect to the login view")))]
#[get("")]
pub async fn overview() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "modulo": "almacen" }))
}
