use crate::common::spawn_app;

#[actix_web::test]
async fn health_check_works() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/health_check", app.address))
        .send()
        .await
        .expect("failed to execute request");

    // Assert
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("invalid body");
    assert_eq!(body["estado"], serde_json::json!("ok"));
}

#[actix_web::test]
async fn index_reports_the_notion_integration_as_disabled() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/", app.address))
        .send()
        .await
        .expect("failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("invalid body");
    assert_eq!(body["notion_integration"], serde_json::json!(false));
}
