pub mod handlers;
pub mod routes;

#[cfg(test)]
mod routes_tests;

pub use routes::create_app;
