pub mod milestone;
pub mod order;
pub mod service;
pub mod user;

pub use service::{ServiceForm, ServiceListQuery, SortBy};
