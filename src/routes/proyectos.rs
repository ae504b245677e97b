//! Projects ("proyectos") blueprint. The overview reports whether the
//! Notion-backed project boards are reachable from this deployment.
use crate::authentication::reject_anonymous_users;
use crate::domain::user::CurrentUser;
use crate::notion::NotionHandle;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, get, web};

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/proyectos")
        .wrap(from_fn(reject_anonymous_users))
        .service(overview)
}

#[utoipa::path(get, path = "/proyectos", responses(
    (status=200, description="Module overview"),
    (status=303, description="Redirect to the login view")))]
#[get("")]
pub async fn overview(
    user: web::ReqData<CurrentUser>,
    notion: web::Data<NotionHandle>,
) -> HttpResponse {
    let boards_available = notion
        .client()
        .map(|c| c.databases().proyectos.is_some())
        .unwrap_or(false);

    HttpResponse::Ok().json(serde_json::json!({
        "modulo": "proyectos",
        "usuario": user.0.username,
        "tableros_notion": boards_available,
    }))
}
