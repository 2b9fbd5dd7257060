use crate::helpers::spawn_app;
use chrono::Duration;

#[tokio::test]
async fn fine_summary_counts_outstanding_fines() {
    // arrange
    let app = spawn_app().await;
    let reader = app.subscriber(365);
    let first = app.borrowed(reader, app.book(1)).await;
    let second = app.borrowed(reader, app.book(1)).await;
    app.clock.advance(Duration::days(31));
    app.return_book(reader, first).await;
    app.return_book(reader, second).await;

    // act
    let response = app.get("/profile/fines/summary", reader).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], "1.00");
}

#[tokio::test]
async fn paying_all_fines_lets_the_reader_borrow_again() {
    // arrange
    let app = spawn_app().await;
    let reader = app.subscriber(365);
    let next_book = app.book(1);
    let borrowing_id = app.borrowed(reader, app.book(1)).await;
    app.clock.advance(Duration::days(35));
    app.return_book(reader, borrowing_id).await;

    // act
    let response = app.post("/profile/fines/pay-all", reader).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["paid"], "2.50");

    let summary: serde_json::Value = app
        .get("/profile/fines/summary", reader)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(summary["count"], 0);
    assert_eq!(app.borrow(reader, next_book).await.status().as_u16(), 200);
}

#[tokio::test]
async fn paying_without_fines_pays_nothing() {
    // arrange
    let app = spawn_app().await;
    let reader = app.subscriber(365);

    // act
    let response = app.post("/profile/fines/pay-all", reader).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["paid"], "0");
    assert!(app.store.notifications().unwrap().is_empty());
}
