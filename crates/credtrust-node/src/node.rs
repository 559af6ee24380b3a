//! The CredTrust node orchestrator.
//!
//! Opens storage, builds the trust service on top of it, and serves the HTTP
//! API. The node owns the stores; the service only borrows them through
//! shared handles.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

use credtrust_credentials::{
    CredentialStore, InMemoryCredentialStore, InMemoryIssuerStore, IssuerStore, TrustService,
};

use crate::config::{CredTrustConfig, StorageBackend};
use crate::state::AppState;
use crate::storage::Storage;

/// A running CredTrust node.
pub struct CredTrustNode {
    /// Node configuration.
    config: CredTrustConfig,
    /// Persistent storage, when the RocksDB backend is selected.
    storage: Option<Arc<Storage>>,
    /// The trust engine, available once started.
    service: Option<Arc<TrustService>>,
    /// Background HTTP server task.
    api_task: Option<JoinHandle<Result<()>>>,
}

impl CredTrustNode {
    /// Create a node with the given config. Nothing is opened until `start`.
    pub fn new(config: CredTrustConfig) -> Result<Self> {
        tracing::info!(
            backend = %config.storage.backend,
            api = %config.api_addr(),
            "CredTrust node created"
        );
        Ok(Self {
            config,
            storage: None,
            service: None,
            api_task: None,
        })
    }

    /// Open storage, build the trust service, and spawn the HTTP API.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting CredTrust node");

        let service = Arc::new(self.build_service()?);

        let api_addr: SocketAddr = self.config.api_addr().parse()?;
        let state = Arc::new(AppState::new(service.clone(), self.config.storage.backend));
        self.api_task = Some(tokio::spawn(async move {
            crate::api::start_api_server(api_addr, state).await
        }));

        self.service = Some(service);
        Ok(())
    }

    fn build_service(&mut self) -> Result<TrustService> {
        let policy = self.config.policy.clone();
        let service = match self.config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("using in-memory storage; state is lost on shutdown");
                TrustService::new(
                    Arc::new(InMemoryIssuerStore::new()),
                    Arc::new(InMemoryCredentialStore::new()),
                    policy,
                )
            }
            StorageBackend::Rocksdb => {
                let storage = Arc::new(Storage::open(&self.config.storage.data_dir)?);
                tracing::info!(path = %self.config.storage.data_dir.display(), "storage initialized");
                let issuers: Arc<dyn IssuerStore> = storage.clone();
                let credentials: Arc<dyn CredentialStore> = storage.clone();
                self.storage = Some(storage);
                TrustService::new(issuers, credentials, policy)
            }
        };
        Ok(service)
    }

    /// Wait for the API server; returns when it exits.
    pub async fn run(&mut self) -> Result<()> {
        let task = self
            .api_task
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        let result = task.await;
        self.api_task = None;
        result?
    }

    /// Gracefully shut down the node.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down CredTrust node");

        if let Some(task) = self.api_task.take() {
            task.abort();
            // Wait until the server future is dropped so it releases the service.
            let _ = task.await;
        }
        self.service = None;

        if let Some(storage) = self.storage.take() {
            drop(storage);
            tracing::info!("storage closed");
        }

        tracing::info!("CredTrust node shut down");
        Ok(())
    }

    /// The trust service, once started.
    pub fn service(&self) -> Option<&Arc<TrustService>> {
        self.service.as_ref()
    }
}
