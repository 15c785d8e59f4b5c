pub mod service;
pub mod upload;
pub mod user;
