use crate::storage::ContactRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared handler state. Holds no mutable data of its own; the repository
/// owns the connection pool.
#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<dyn ContactRepository>,
}

impl AppState {
    pub fn new<R: ContactRepository + 'static>(contacts: R) -> Self {
        Self {
            contacts: Arc::new(contacts),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
