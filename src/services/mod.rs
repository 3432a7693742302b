pub mod events;
pub mod mapper;
pub mod validation;

pub use events::EventService;
pub use mapper::{EventMapper, EventMapping};
pub use validation::validate;
