use crate::notion::NotionHandle;
use actix_web::{HttpResponse, get, web};
use serde::Serialize;

#[derive(Serialize)]
struct AppStatus<'a> {
    aplicacion: &'a str,
    notion_integration: bool,
}

#[utoipa::path(get,
    path="/",
    responses((status=200, description="Application status")))]
#[get("/")]
pub async fn index_page(notion: web::Data<NotionHandle>) -> HttpResponse {
    HttpResponse::Ok().json(AppStatus {
        aplicacion: "autointelli",
        notion_integration: notion.is_enabled(),
    })
}
