pub mod form;
pub(crate) mod json;
pub mod password;
pub mod token;
pub mod upload;

pub use form::parse_form;
pub use json::*;
pub use upload::{UploadError, UploadPolicy};
