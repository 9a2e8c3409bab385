use std::sync::Arc;

use tokio::sync::Mutex;

use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    /// Held across every write so saves and deletes reach storage one at a time.
    pub writes: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            writes: Arc::new(Mutex::new(())),
        }
    }
}
