use std::collections::HashMap;
use std::sync::Arc;

use weighbridge_application::LockArbiterService;
use weighbridge_core::UserIdentity;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub lock_arbiter: LockArbiterService,
    pub token_identities: Arc<HashMap<String, UserIdentity>>,
}
