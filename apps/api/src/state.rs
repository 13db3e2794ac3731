use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::token::TokenSigner;
use crate::config::Config;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Built once at startup. Tests swap in a fake.
    pub llm: Arc<dyn CompletionClient>,
    pub tokens: TokenSigner,
    pub config: Config,
}
