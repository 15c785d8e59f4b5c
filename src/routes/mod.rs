pub mod health_checks;
pub(crate) mod order;
pub(crate) mod service;
pub(crate) mod upload;
pub(crate) mod user;

pub use health_checks::*;
