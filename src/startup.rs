use crate::catchers::*;
use crate::clock::Clock;
use crate::configuration::Settings;
use crate::lending::BorrowingService;
use crate::notifications::NotificationInbox;
use crate::port_saver;
use crate::port_saver::Port;
use crate::routes::*;
use crate::store::LendingStore;
use rocket::config::LogLevel;
use rocket::{Config, Ignite, Rocket};
use std::sync::Arc;

pub struct Application {
    pub server: Rocket<Ignite>,
    pub port: Port,
}

impl Application {
    /// Wires the lending core to its HTTP surface. Port `None` binds a random free port.
    pub async fn build(
        configuration: &Settings,
        store: Arc<dyn LendingStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Application, rocket::Error> {
        let (port_saver, port) = port_saver::create_pair();
        let borrowing_service = Arc::new(BorrowingService::new(
            store.clone(),
            clock.clone(),
            configuration.lending.clone(),
        ));
        let inbox = Arc::new(NotificationInbox::new(store, clock));

        let server = rocket::custom(Config {
            address: configuration.application.host,
            port: configuration.application.port.unwrap_or(0),
            log_level: LogLevel::Critical,
            ..Config::default()
        })
        .attach(port_saver)
        .manage(borrowing_service)
        .manage(inbox)
        .mount(
            "/",
            routes![
                health_check::health_check,
                eligibility,
                borrow,
                return_book,
                active_borrowings,
                borrowing_history,
                fine_summary,
                pay_all_fines,
                list_notifications,
                count_notifications,
                mark_notification_read,
                mark_all_notifications_read,
            ],
        )
        .register(
            "/",
            catchers![
                unauthorized_to_json,
                not_found_to_json,
                unprocessable_entity_to_bad_request
            ],
        )
        .ignite()
        .await?;

        Ok(Application { server, port })
    }
}
