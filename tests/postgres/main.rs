mod helpers;
mod lending;
mod store;
