mod milestone;
pub(crate) mod order;
pub(crate) mod service;
mod user;

pub use milestone::*;
pub use order::*;
pub use service::*;
pub use user::*;
