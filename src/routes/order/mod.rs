mod action;
mod add;
mod delete;
mod get;
mod milestone;
mod update;

pub use action::*;
pub use add::*;
pub use delete::*;
pub use get::*;
pub use milestone::*;
pub use update::*;
