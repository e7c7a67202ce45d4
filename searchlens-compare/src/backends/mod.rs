//! Concrete search backend implementations.

pub mod api;

pub use api::ApiBackend;
