#[macro_use]
extern crate rocket;

pub mod catchers;
pub mod clock;
pub mod configuration;
pub mod domain;
pub mod guards;
pub mod lending;
pub mod models;
pub mod notifications;
pub mod port_saver;
pub mod routes;
pub mod schema;
pub mod startup;
pub mod store;
pub mod telemetry;
