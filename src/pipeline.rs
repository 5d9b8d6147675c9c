//! src/pipeline.rs
//!
//! The three stages of a word count run. Each call is one request/response
//! against the object store and nothing is kept in memory between calls;
//! stages only coordinate through the keys they write.
//!
//! Writes are not transactional. A Split that fails on its third chunk has
//! already stored the first two, and a failed Reduce may have read some
//! map results. Keys are deterministic for a given run id and index, so
//! calling the stage again overwrites whatever a failed attempt left.
use crate::counts::WordCounts;
use crate::error::PipelineError;
use crate::mappers::count_words;
use crate::reducers::merge;
use crate::reference::{ObjectRef, chunk_key, extract_run_and_index, map_key, result_key};
use crate::run_id::{RunId, RunIdGenerator};
use crate::storage::ObjectStore;
use crate::text_splitter::{effective_chunk_count, split_text};
use anyhow::Context;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SplitRequest {
    pub source_ref: String,
    #[serde(default)]
    pub chunk_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SplitResponse {
    pub run_id: RunId,
    pub chunk_refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MapRequest {
    pub chunk_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MapResponse {
    pub map_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReduceRequest {
    pub map_refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReduceResponse {
    pub result_ref: String,
}

#[derive(Debug, Clone)]
pub struct StageService {
    store: Arc<dyn ObjectStore>,
    run_ids: Arc<dyn RunIdGenerator>,
    max_chunk_count: usize,
}

impl StageService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        run_ids: Arc<dyn RunIdGenerator>,
        max_chunk_count: usize,
    ) -> Self {
        Self {
            store,
            run_ids,
            max_chunk_count,
        }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Fetches the source, cuts it into chunks and stores each one under a
    /// fresh run id. Chunks are written in index order.
    #[tracing::instrument(
        name = "Split",
        skip(self, request),
        fields(source_ref = %request.source_ref, run_id = tracing::field::Empty)
    )]
    pub async fn split(&self, request: SplitRequest) -> Result<SplitResponse, PipelineError> {
        let source = ObjectRef::parse(&request.source_ref)?;
        let chunk_count = effective_chunk_count(request.chunk_count);
        if chunk_count > self.max_chunk_count {
            return Err(PipelineError::InvalidInput(format!(
                "chunk_count {chunk_count} exceeds the limit of {}",
                self.max_chunk_count
            )));
        }

        let data = self
            .store
            .get(source.bucket(), source.key())
            .await
            .map_err(|e| PipelineError::store(format!("Failed to fetch source {source}"), e))?;
        let text = String::from_utf8_lossy(&data);

        let run_id = self.run_ids.generate();
        tracing::Span::current().record("run_id", tracing::field::display(&run_id));

        let mut chunk_refs = Vec::with_capacity(chunk_count);
        for chunk in split_text(&text, chunk_count) {
            let chunk_ref = source.with_key(chunk_key(&run_id, chunk.index));
            self.store
                .put(chunk_ref.bucket(), chunk_ref.key(), chunk.text.as_bytes())
                .await
                .map_err(|e| {
                    PipelineError::store(format!("Failed to store chunk {chunk_ref}"), e)
                })?;
            tracing::debug!(index = chunk.index, size = chunk.text.len(), "Stored chunk");
            chunk_refs.push(chunk_ref.to_string());
        }

        tracing::info!(chunks = chunk_refs.len(), "Split complete");
        Ok(SplitResponse { run_id, chunk_refs })
    }

    /// Counts the words of one chunk and stores the counts next to it, under
    /// the chunk's run id and index.
    #[tracing::instrument(
        name = "Map",
        skip(self, request),
        fields(chunk_ref = %request.chunk_ref, run_id = tracing::field::Empty)
    )]
    pub async fn map(&self, request: MapRequest) -> Result<MapResponse, PipelineError> {
        let chunk = ObjectRef::parse(&request.chunk_ref)?;
        let data = self
            .store
            .get(chunk.bucket(), chunk.key())
            .await
            .map_err(|e| PipelineError::store(format!("Failed to fetch chunk {chunk}"), e))?;

        let counts = count_words(&String::from_utf8_lossy(&data));

        let (run_id, index) = extract_run_and_index(chunk.key())?;
        tracing::Span::current().record("run_id", tracing::field::display(&run_id));
        let map_ref = chunk.with_key(map_key(&run_id, index));
        let payload = counts
            .to_json()
            .context("Failed to encode word counts")?;
        self.store
            .put(map_ref.bucket(), map_ref.key(), &payload)
            .await
            .map_err(|e| PipelineError::store(format!("Failed to store map result {map_ref}"), e))?;

        tracing::info!(words = counts.len(), "Map complete");
        Ok(MapResponse {
            map_ref: map_ref.to_string(),
        })
    }

    /// Merges the given map results and stores the sum under the run id of
    /// the first reference that carries one.
    #[tracing::instrument(
        name = "Reduce",
        skip(self, request),
        fields(map_refs = request.map_refs.len(), run_id = tracing::field::Empty)
    )]
    pub async fn reduce(&self, request: ReduceRequest) -> Result<ReduceResponse, PipelineError> {
        if request.map_refs.is_empty() {
            return Err(PipelineError::InvalidInput(
                "map_refs must contain at least one reference".into(),
            ));
        }
        let map_refs = request
            .map_refs
            .iter()
            .map(|r| ObjectRef::parse(r))
            .collect::<Result<Vec<_>, _>>()?;

        let mut partials = Vec::with_capacity(map_refs.len());
        for map_ref in &map_refs {
            partials.push(self.fetch_counts(map_ref).await?);
        }

        let (target, run_id) = map_refs
            .iter()
            .find_map(|r| extract_run_and_index(r.key()).ok().map(|(id, _)| (r, id)))
            .ok_or_else(|| {
                PipelineError::MalformedKey(format!(
                    "none of {} map references carries a run id",
                    map_refs.len()
                ))
            })?;
        tracing::Span::current().record("run_id", tracing::field::display(&run_id));

        let merged = merge(partials)?;
        let result_ref = target.with_key(result_key(&run_id));
        let payload = merged
            .to_json()
            .context("Failed to encode word counts")?;
        self.store
            .put(result_ref.bucket(), result_ref.key(), &payload)
            .await
            .map_err(|e| PipelineError::store(format!("Failed to store result {result_ref}"), e))?;

        tracing::info!(words = merged.len(), total = merged.total(), "Reduce complete");
        Ok(ReduceResponse {
            result_ref: result_ref.to_string(),
        })
    }

    /// Reads a stored word count mapping.
    pub async fn fetch_counts(&self, reference: &ObjectRef) -> Result<WordCounts, PipelineError> {
        let data = self
            .store
            .get(reference.bucket(), reference.key())
            .await
            .map_err(|e| PipelineError::store(format!("Failed to fetch {reference}"), e))?;
        WordCounts::from_json(&data).map_err(|source| PipelineError::MalformedResult {
            reference: reference.to_string(),
            source,
        })
    }
}
