use crate::{delegation::Delegate, locator::LocatorResolver};
use std::sync::Arc;

/// Shared application state
///
/// Read-only after startup; every request works on its own clone.
#[derive(Clone)]
pub struct AppState {
    pub resolver: LocatorResolver,
    pub delegate: Arc<dyn Delegate>,
}

impl AppState {
    pub fn new(resolver: LocatorResolver, delegate: Arc<dyn Delegate>) -> Self {
        Self { resolver, delegate }
    }
}
