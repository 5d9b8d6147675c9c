//! src/driver.rs
use crate::pipeline::{MapRequest, ReduceRequest, SplitRequest};
use crate::run_id::RunId;
use crate::service::WordCountClient;
use anyhow::Context;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tarpc::client::Config;
use tarpc::context;
use tarpc::tokio_serde::formats::Json;

/// Wall-clock seconds spent in each stage of one job.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StageTimings {
    pub split: f64,
    pub map_sum: f64,
    pub map_max: f64,
    pub reduce: f64,
    /// `split + map_sum + reduce`: the job time if maps ran one after another.
    pub end_to_end_serial: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct JobReport {
    pub run_id: RunId,
    pub chunk_refs: Vec<String>,
    pub map_refs: Vec<String>,
    pub result_ref: String,
    pub timings: StageTimings,
}

/// Runs whole jobs against a word count service: one Split, one Map per
/// chunk issued concurrently, then one Reduce.
pub struct Driver {
    client: WordCountClient,
    timeout: Duration,
}

impl Driver {
    #[tracing::instrument(name = "Connect driver")]
    pub async fn connect(address: SocketAddr, timeout: Duration) -> Result<Self, anyhow::Error> {
        let mut transport = tarpc::serde_transport::tcp::connect(address, Json::default);
        transport.config_mut().max_frame_length(usize::MAX);
        let client = WordCountClient::new(
            Config::default(),
            transport
                .await
                .context(format!("Failed to connect to {address}"))?,
        )
        .spawn();
        Ok(Self { client, timeout })
    }

    fn request_context(&self) -> context::Context {
        let mut ctx = context::current();
        ctx.deadline = Instant::now() + self.timeout;
        ctx
    }

    pub async fn health(&self) -> Result<bool, anyhow::Error> {
        self.client
            .health(self.request_context())
            .await
            .context("Health check failed")
    }

    #[tracing::instrument(name = "Run job", skip(self))]
    pub async fn run(&self, source_ref: &str, chunk_count: i64) -> Result<JobReport, anyhow::Error> {
        let started = Instant::now();
        let split = self
            .client
            .split(
                self.request_context(),
                SplitRequest {
                    source_ref: source_ref.to_string(),
                    chunk_count,
                },
            )
            .await
            .context("Split request failed")??;
        let split_time = started.elapsed();
        tracing::info!(run_id = %split.run_id, chunks = split.chunk_refs.len(), "Split done");

        let maps = futures::future::try_join_all(split.chunk_refs.iter().map(|chunk_ref| {
            let request = MapRequest {
                chunk_ref: chunk_ref.clone(),
            };
            async move {
                let started = Instant::now();
                let response = self
                    .client
                    .map(self.request_context(), request)
                    .await
                    .context(format!("Map request for {chunk_ref} failed"))??;
                Ok::<_, anyhow::Error>((response.map_ref, started.elapsed()))
            }
        }))
        .await?;
        let map_sum: Duration = maps.iter().map(|(_, t)| *t).sum();
        let map_max = maps.iter().map(|(_, t)| *t).max().unwrap_or_default();
        let map_refs: Vec<String> = maps.into_iter().map(|(r, _)| r).collect();

        let started = Instant::now();
        let reduce = self
            .client
            .reduce(
                self.request_context(),
                ReduceRequest {
                    map_refs: map_refs.clone(),
                },
            )
            .await
            .context("Reduce request failed")??;
        let reduce_time = started.elapsed();

        Ok(JobReport {
            run_id: split.run_id,
            chunk_refs: split.chunk_refs,
            map_refs,
            result_ref: reduce.result_ref,
            timings: StageTimings {
                split: split_time.as_secs_f64(),
                map_sum: map_sum.as_secs_f64(),
                map_max: map_max.as_secs_f64(),
                reduce: reduce_time.as_secs_f64(),
                end_to_end_serial: (split_time + map_sum + reduce_time).as_secs_f64(),
            },
        })
    }
}
