use elibrary::clock::SystemClock;
use elibrary::configuration::get_configuration;
use elibrary::startup::Application;
use elibrary::store::{establish_connection_pool, run_migrations, PgStore};
use elibrary::telemetry::{get_subscriber, init_subscriber};
use std::sync::Arc;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("elibrary".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    let configuration = get_configuration()?;
    let db_pool = establish_connection_pool(&configuration.database)?;
    run_migrations(&db_pool)?;

    let application = Application::build(
        &configuration,
        Arc::new(PgStore::new(db_pool)),
        Arc::new(SystemClock),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to build the application: {}", e))?;
    application
        .server
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("The server stopped unexpectedly: {}", e))?;
    Ok(())
}
