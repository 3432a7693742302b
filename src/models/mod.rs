pub mod event;

pub use event::{EventEntity, EventPayload, NewEvent};
