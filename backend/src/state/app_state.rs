//! Shared application state
//!
//! Handed to every axum handler through `State`. Holds no mutable data of
//! its own; all records live behind the store.

use crate::services::IouService;
use crate::store::IouStore;
use std::sync::Arc;

/// State shared across request handlers
#[derive(Clone)]
pub struct AppState {
    /// IOU operations
    pub ious: IouService,
}

impl AppState {
    /// Wire the service layer over a store
    pub fn new(store: Arc<dyn IouStore>) -> Self {
        Self {
            ious: IouService::new(store),
        }
    }
}
