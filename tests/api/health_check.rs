use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check_works() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app
        .api_client
        .get(format!("{}/health_check", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    // assert
    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn unknown_routes_answer_with_json() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app
        .api_client
        .get(format!("{}/catalogue", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    // assert
    assert_eq!(404, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "route_not_found");
}
