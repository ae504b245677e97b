use crate::common::spawn_app;

#[actix_web::test]
async fn bundled_stylesheet_is_served() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/static/css/main.css", app.address))
        .send()
        .await
        .expect("failed to execute request");

    assert!(response.status().is_success());
    let body = response.text().await.expect("invalid body");
    assert!(body.contains("flash-info"));
}
