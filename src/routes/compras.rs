//! Purchasing ("compras") blueprint. The overview reports which materiales
//! databases the Notion integration can serve.
use crate::authentication::reject_anonymous_users;
use crate::notion::NotionHandle;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, get, web};

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/compras")
        .wrap(from_fn(reject_anonymous_users))
        .service(overview)
}

#[utoipa::path(get, path = "/compras", responses(
    (status=200, description="Module overview"),
    (status=303, description="Redirect to the login view")))]
#[get("")]
pub async fn overview(notion: web::Data<NotionHandle>) -> HttpResponse {
    let materiales = notion
        .client()
        .map(|c| {
            let dbs = c.databases();
            (dbs.materiales_db1.is_some(), dbs.materiales_db2.is_some())
        })
        .unwrap_or((false, false));

    HttpResponse::Ok().json(serde_json::json!({
        "modulo": "compras",
        "materiales_db1": materiales.0,
        "materiales_db2": materiales.1,
    }))
}
