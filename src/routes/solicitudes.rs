//! Material request ("solicitudes") blueprint. Business routes live behind
//! the login guard; only the module surface is wired here.
use crate::authentication::reject_anonymous_users;
use crate::domain::user::CurrentUser;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, get, web};

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/solicitudes")
        .wrap(from_fn(reject_anonymous_users))
        .service(overview)
}

#[utoipa::path(get, path = "/solicitudes", responses(
    (status=200, description="Module overview"),
    (status=303, description="Redirect to the login view")))]
#[get("")]
pub async fn overview(user: web::ReqData<CurrentUser>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "modulo": "solicitudes",
        "usuario": user.0.username,
    }))
}
