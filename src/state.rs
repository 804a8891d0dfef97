use std::sync::Arc;

use anyhow::{Context, Result};

use crate::auth::{Argon2Hasher, CredentialStore, TokenService};
use crate::config::AppConfig;
use crate::database::Repositories;

/// Everything a handler needs. Built once at startup and shared read-only.
pub struct AppState {
    pub config: AppConfig,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub repos: Repositories,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories) -> Result<SharedState> {
        let tokens = TokenService::from_config(&config.security).context("failed to initialize token service")?;
        let hasher = Argon2Hasher::new(
            config.security.password_hash_memory_kib,
            config.security.password_hash_iterations,
        )
        .context("invalid password hashing parameters")?;
        let credentials =
            CredentialStore::new(repos.users.clone(), hasher).context("failed to initialize credential store")?;

        Ok(Arc::new(Self {
            config,
            tokens,
            credentials,
            repos,
        }))
    }
}
