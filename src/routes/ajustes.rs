//! Settings ("ajustes") blueprint.
use crate::authentication::reject_anonymous_users;
use crate::domain::user::CurrentUser;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, get, web};

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/ajustes")
        .wrap(from_fn(reject_anonymous_users))
        .service(overview)
}

#[utoipa::path(get, path = "/ajustes", responses(
    (status=200, description="Module overview"),
    (status=303, description="Redirect to the login view")))]
#[get("")]
pub async fn overview(user: web::ReqData<CurrentUser>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "modulo": "ajustes",
        "usuario": user.0.username,
        "email": user.0.email,
    }))
}
