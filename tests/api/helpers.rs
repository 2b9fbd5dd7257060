use chrono::{DateTime, Duration, TimeZone, Utc};
use elibrary::clock::FixedClock;
use elibrary::configuration::get_configuration;
use elibrary::startup::Application;
use elibrary::store::InMemoryStore;
use elibrary::telemetry::{get_subscriber, init_subscriber};
use fake::faker::lorem::en::Words;
use fake::faker::name::en::Name;
use fake::Fake;
use once_cell::sync::Lazy;
use std::sync::Arc;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".into();
    let subscriber_name = "test".into();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to install the tracing subscriber.");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).expect("Failed to install the tracing subscriber.");
    }
});

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
    pub api_client: reqwest::Client,
}

pub fn opening_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = None;
        c.application.host = "127.0.0.1".parse().unwrap();
        c
    };

    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(FixedClock::new(opening_day()));

    let app = Application::build(&configuration, store.clone(), clock.clone())
        .await
        .expect("Failed to build the application.");
    let port = app.port.get();
    let _ = tokio::spawn(app.server.launch());
    TestApp {
        address: format!(
            "http://127.0.0.1:{}",
            port.await.expect("The server never bound a port.")
        ),
        store,
        clock,
        api_client: reqwest::Client::new(),
    }
}

impl TestApp {
    /// A reader whose subscription runs for `days` more days.
    pub fn subscriber(&self, days: i64) -> Uuid {
        let user_id = Uuid::new_v4();
        self.store
            .add_subscription(user_id, opening_day() + Duration::days(days), true)
            .unwrap();
        user_id
    }

    pub fn book(&self, copies: i32) -> i32 {
        let title: Vec<String> = Words(2..5).fake();
        let author: String = Name().fake();
        self.store
            .add_book(&title.join(" "), Some(&author), copies)
            .unwrap()
            .id
    }

    pub async fn get(&self, path: &str, user_id: Uuid) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", &self.address, path))
            .header("X-User-Id", user_id.to_string())
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_with_roles(&self, path: &str, user_id: Uuid, roles: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", &self.address, path))
            .header("X-User-Id", user_id.to_string())
            .header("X-User-Roles", roles)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post(&self, path: &str, user_id: Uuid) -> reqwest::Response {
        self.post_with_roles(path, user_id, "Reader").await
    }

    pub async fn post_with_roles(&self, path: &str, user_id: Uuid, roles: &str) -> reqwest::Response {
        self.api_client
            .post(format!("{}{}", &self.address, path))
            .header("X-User-Id", user_id.to_string())
            .header("X-User-Roles", roles)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn borrow(&self, user_id: Uuid, book_id: i32) -> reqwest::Response {
        self.post(&format!("/borrowings/{}", book_id), user_id).await
    }

    /// Borrows and returns the new borrowing id, failing the test on any refusal.
    pub async fn borrowed(&self, user_id: Uuid, book_id: i32) -> Uuid {
        let response = self.borrow(user_id, book_id).await;
        assert_eq!(200, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        body["borrowingId"].as_str().unwrap().parse().unwrap()
    }

    pub async fn return_book(&self, user_id: Uuid, borrowing_id: Uuid) -> reqwest::Response {
        self.post(&format!("/borrowings/{}/return", borrowing_id), user_id)
            .await
    }
}

pub async fn error_code(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}
