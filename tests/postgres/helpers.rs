use chrono::{DateTime, Duration, TimeZone, Utc};
use diesel::prelude::*;
use elibrary::clock::FixedClock;
use elibrary::configuration::{get_configuration, DatabaseSettings};
use elibrary::domain::Borrower;
use elibrary::lending::{BorrowingService, LendingPolicy};
use elibrary::schema::{books, user_subscriptions};
use elibrary::store::{establish_connection_pool, run_migrations, DbPool, LendingStore, PgStore};
use elibrary::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
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

/// A lending service over its own freshly migrated database.
pub struct TestLibrary {
    pub db_pool: DbPool,
    pub store: Arc<PgStore>,
    pub clock: Arc<FixedClock>,
    pub service: BorrowingService,
}

pub fn opening_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn spawn_library() -> TestLibrary {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.database.database_name = Uuid::new_v4().to_string();
        c.database.max_connections = 4;
        c
    };
    let db_pool = setup_database(&configuration.database);

    let store = Arc::new(PgStore::new(db_pool.clone()));
    let clock = Arc::new(FixedClock::new(opening_day()));
    let shared_store: Arc<dyn LendingStore> = store.clone();
    let service = BorrowingService::new(shared_store, clock.clone(), LendingPolicy::default());
    TestLibrary {
        db_pool,
        store,
        clock,
        service,
    }
}

fn setup_database(settings: &DatabaseSettings) -> DbPool {
    let mut connection =
        PgConnection::establish(settings.connection_string_without_database().expose_secret())
            .expect("Failed to connect to Postgres.");
    diesel::sql_query(format!("CREATE DATABASE \"{}\"", settings.database_name))
        .execute(&mut connection)
        .expect("Failed to create the test database.");

    let db_pool = establish_connection_pool(settings).expect("Failed to build the pool.");
    run_migrations(&db_pool).expect("Failed to migrate the test database.");
    db_pool
}

impl TestLibrary {
    /// A reader whose subscription runs for `days` more days.
    pub fn subscriber(&self, days: i64) -> Borrower {
        let user_id = Uuid::new_v4();
        diesel::insert_into(user_subscriptions::table)
            .values((
                user_subscriptions::id.eq(Uuid::new_v4()),
                user_subscriptions::user_id.eq(user_id),
                user_subscriptions::start_date.eq(opening_day() - Duration::days(1)),
                user_subscriptions::end_date.eq(opening_day() + Duration::days(days)),
                user_subscriptions::is_active.eq(true),
            ))
            .execute(&mut self.db_pool.get().unwrap())
            .unwrap();
        Borrower::patron(user_id)
    }

    pub fn book(&self, title: &str, copies: i32) -> i32 {
        diesel::insert_into(books::table)
            .values((
                books::title.eq(title),
                books::author.eq(Some("Octavia E. Butler")),
                books::copies_total.eq(copies),
                books::copies_available.eq(copies),
            ))
            .returning(books::id)
            .get_result(&mut self.db_pool.get().unwrap())
            .unwrap()
    }

    pub fn copies_available(&self, book_id: i32) -> i32 {
        books::table
            .find(book_id)
            .select(books::copies_available)
            .first(&mut self.db_pool.get().unwrap())
            .unwrap()
    }

    pub fn notification_count(&self, user_id: Uuid) -> i64 {
        let mut tx = self.store.begin().unwrap();
        tx.count_notifications(user_id, false).unwrap()
    }
}
