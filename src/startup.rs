//! src/startup.rs
use crate::configuration::{Settings, StorageBackend};
use crate::pipeline::StageService;
use crate::run_id::{RandomRunIds, RunIdGenerator, SeededRunIds};
use crate::service::{WordCount, WordCountServer};
use crate::storage::{InMemoryStorage, ObjectStore, S3Storage};
use anyhow::Context;
use futures::{StreamExt, future};
use std::net::SocketAddr;
use std::sync::Arc;
use tarpc::server::{self, Channel};
use tarpc::tokio_serde::formats::Json;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const MAX_CONCURRENT_CONNECTIONS: usize = 64;

pub fn build_store(configuration: &Settings) -> Arc<dyn ObjectStore> {
    match configuration.storage.backend {
        StorageBackend::S3 => Arc::new(S3Storage::new(&configuration.storage)),
        StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
    }
}

pub fn build_run_ids(configuration: &Settings) -> Arc<dyn RunIdGenerator> {
    match configuration.pipeline.run_id_seed {
        Some(seed) => Arc::new(SeededRunIds::new(seed)),
        None => Arc::new(RandomRunIds),
    }
}

/// A running word count service.
#[derive(Debug)]
pub struct Application {
    address: SocketAddr,
    handle: JoinHandle<anyhow::Result<()>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Application {
    #[tracing::instrument(name = "Build Application", skip_all)]
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let stages = StageService::new(
            build_store(&configuration),
            build_run_ids(&configuration),
            configuration.pipeline.max_chunk_count,
        );
        let address = configuration.rpc.address()?;
        Self::serve(address, stages).await
    }

    /// Binds `address` (port 0 picks a free one) and serves `stages` on it.
    #[tracing::instrument(name = "Start word count service", skip(stages))]
    pub async fn serve(address: SocketAddr, stages: StageService) -> Result<Self, anyhow::Error> {
        let mut listener = tarpc::serde_transport::tcp::listen(&address, Json::default)
            .await
            .context(format!("Failed to bind {address}"))?;
        listener.config_mut().max_frame_length(usize::MAX);
        let address = listener.local_addr();

        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let mut shutdown_rx = shutdown_tx.subscribe();
        let server = WordCountServer::new(stages);

        let handle = tokio::spawn(async move {
            let serving = listener
                .filter_map(|r| future::ready(r.ok()))
                .map(server::BaseChannel::with_defaults)
                .map(|channel| {
                    channel
                        .execute(server.clone().serve())
                        .for_each(|response| async move {
                            tokio::spawn(response);
                        })
                })
                .buffer_unordered(MAX_CONCURRENT_CONNECTIONS)
                .for_each(|_| async {});

            tokio::select! {
                _ = serving => {
                    tracing::warn!("Listener closed");
                    Ok(())
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Word count service shutting down");
                    Ok(())
                }
            }
        });

        tracing::info!(%address, "Word count service listening");
        Ok(Self {
            address,
            handle,
            shutdown_tx,
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.address.port()
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        self.handle.await?
    }

    #[tracing::instrument("Shutdown Application", skip_all)]
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.shutdown_tx.send(()).ok();
        self.handle.await??;
        tracing::info!("Word count service shut down gracefully");
        Ok(())
    }
}
