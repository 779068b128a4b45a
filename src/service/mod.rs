mod errors;
pub mod models;
pub mod projector;
mod service;
mod tracker;

pub use errors::Error;
pub use service::{Service, ServiceBuilder};
pub use tracker::SessionTracker;
