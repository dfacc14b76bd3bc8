//! Admin back-office API

pub mod routes;

pub use routes::router;
