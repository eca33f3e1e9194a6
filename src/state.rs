use crate::repository::ItemRepository;
use std::sync::Arc;

/// Shared application state
///
/// The repository is chosen at startup and handed to the router here.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ItemRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self { repository }
    }
}
