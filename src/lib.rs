pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use services::{EventMapper, EventService};
use store::EventStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventService>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            events: Arc::new(EventService::new(store, Arc::new(EventMapper::new()))),
        }
    }
}
