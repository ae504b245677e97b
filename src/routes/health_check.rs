use actix_web::HttpResponse;
use actix_web::get;
use serde::Serialize;

#[derive(Serialize)]
struct HealthStatus<'a> {
    estado: &'a str,
}

#[utoipa::path(get,
    path="/health_check",
    responses((status=200, description="Liveness of the autointelli service")))]
#[get("/health_check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus { estado: "ok" })
}
