pub mod error;
pub mod local_datetime;
pub mod response;
pub mod time;

pub use error::{AppError, AppResult, FieldErrors};
pub use time::ZoneId;
