use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtVerifier;
use crate::config;
use crate::services::{ArchiveClient, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: config::Config,
    pub jwt: Arc<JwtVerifier>,
    /// Absent when object storage is not configured; attachment flows then
    /// degrade per the best-effort enrichment policy.
    pub storage: Option<Arc<StorageClient>>,
    /// Absent when the PDF archival gateway is not configured.
    pub archive: Option<Arc<ArchiveClient>>,
}

impl AppState {
    pub fn new(db: PgPool, env: config::Config) -> Self {
        let jwt = Arc::new(JwtVerifier::new(&env.auth.jwt_secret));
        let http = reqwest::Client::new();
        let storage = env
            .storage
            .clone()
            .map(|cfg| Arc::new(StorageClient::new(http.clone(), cfg)));
        let archive = env
            .archive
            .clone()
            .map(|cfg| Arc::new(ArchiveClient::new(http.clone(), cfg)));
        Self {
            db,
            env,
            jwt,
            storage,
            archive,
        }
    }
}
