mod not_found;
mod unauthorized;
mod unprocessable_entity;

pub use not_found::*;
pub use unauthorized::*;
pub use unprocessable_entity::*;
