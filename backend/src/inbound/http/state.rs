//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::{Accounts, AdminOps, Inventory, ThingExport};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn Accounts>,
    pub inventory: Arc<dyn Inventory>,
    pub export: Arc<dyn ThingExport>,
    pub admin: Arc<dyn AdminOps>,
}

impl HttpState {
    /// Bundle the port implementations handlers depend on.
    pub fn new(
        accounts: Arc<dyn Accounts>,
        inventory: Arc<dyn Inventory>,
        export: Arc<dyn ThingExport>,
        admin: Arc<dyn AdminOps>,
    ) -> Self {
        Self {
            accounts,
            inventory,
            export,
            admin,
        }
    }
}
