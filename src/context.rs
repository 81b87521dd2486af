//! Collaborators shared by every handler.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::store::RecordStore;

/// Explicitly constructed collaborators, cloned into each handler call.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn RecordStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppContext {
    pub fn new(store: Arc<dyn RecordStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }
}
