use crate::common::spawn_app;

fn client_without_redirects() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .expect("failed to build client")
}

#[actix_web::test]
async fn protected_blueprints_redirect_anonymous_users_to_the_login_view() {
    // Arrange
    let app = spawn_app().await;
    let client = client_without_redirects();

    for prefix in [
        "/solicitudes",
        "/ajustes",
        "/proyectos",
        "/accesorios",
        "/almacen",
        "/compras",
    ] {
        // Act
        let response = client
            .get(format!("{}{}", app.address, prefix))
            .send()
            .await
            .expect("failed to execute request");

        // Assert
        assert_eq!(303, response.status().as_u16(), "prefix {prefix}");
        assert_eq!(
            Some("/auth/login"),
            response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            "prefix {prefix}"
        );
    }
}

#[actix_web::test]
async fn the_login_view_renders_the_flash_message_after_a_redirect() {
    // Arrange
    let app = spawn_app().await;
    let client = client_without_redirects();

    // Act: hit a protected route, then follow the policy by hand.
    let response = client
        .get(format!("{}/solicitudes", app.address))
        .send()
        .await
        .expect("failed to execute request");
    assert_eq!(303, response.status().as_u16());

    let response = client
        .get(format!("{}/auth/login", app.address))
        .send()
        .await
        .expect("failed to execute request");

    // Assert
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("invalid body");
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("inicia sesión"),
        "unexpected body: {body}"
    );
}

#[actix_web::test]
async fn the_flash_message_is_consumed_after_being_shown() {
    let app = spawn_app().await;
    let client = client_without_redirects();

    client
        .get(format!("{}/solicitudes", app.address))
        .send()
        .await
        .expect("failed to execute request");
    client
        .get(format!("{}/auth/login", app.address))
        .send()
        .await
        .expect("failed to execute request");

    // A second visit shows no pending messages.
    let response = client
        .get(format!("{}/auth/login", app.address))
        .send()
        .await
        .expect("failed to execute request");

    let body: serde_json::Value = response.json().await.expect("invalid body");
    assert_eq!(body["message"].as_str().unwrap_or_default().trim(), "");
}

#[actix_web::test]
async fn logging_out_without_a_session_is_a_no_op() {
    let app = spawn_app().await;
    let client = client_without_redirects();

    let response = client
        .post(format!("{}/auth/logout", app.address))
        .send()
        .await
        .expect("failed to execute request");

    assert!(response.status().is_success());
}
