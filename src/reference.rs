//! src/reference.rs
//!
//! Object references (`<scheme>://<bucket>/<key>`) and the key layout each
//! stage writes under:
//!
//! | Stage  | Key                                    |
//! |--------|----------------------------------------|
//! | Split  | `chunks/run-<run id>/chunk-<index>.txt` |
//! | Map    | `maps/run-<run id>/map-<index>.json`    |
//! | Reduce | `reduce/run-<run id>/result.json`       |
use crate::error::PipelineError;
use crate::run_id::RunId;
use std::fmt;

const RUN_PREFIX: &str = "run-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    scheme: String,
    bucket: String,
    key: String,
}

impl ObjectRef {
    pub fn new(scheme: &str, bucket: &str, key: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    /// Parses `<scheme>://<bucket>/<key>`. The key may itself contain `/`.
    pub fn parse(reference: &str) -> Result<Self, PipelineError> {
        let invalid = || PipelineError::InvalidInput(format!("Invalid object reference: {reference}"));
        let (scheme, rest) = reference.split_once("://").ok_or_else(invalid)?;
        let (bucket, key) = rest.split_once('/').ok_or_else(invalid)?;
        if scheme.is_empty() || bucket.is_empty() || key.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(scheme, bucket, key))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Same scheme and bucket, different key.
    pub fn with_key(&self, key: String) -> Self {
        Self {
            scheme: self.scheme.clone(),
            bucket: self.bucket.clone(),
            key,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.bucket, self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Split,
    Map,
    Reduce,
}

impl Stage {
    fn directory(&self) -> &'static str {
        match self {
            Stage::Split => "chunks",
            Stage::Map => "maps",
            Stage::Reduce => "reduce",
        }
    }

    fn from_directory(directory: &str) -> Option<Self> {
        match directory {
            "chunks" => Some(Stage::Split),
            "maps" => Some(Stage::Map),
            "reduce" => Some(Stage::Reduce),
            _ => None,
        }
    }
}

/// Typed form of a stage output key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageKey {
    pub run_id: RunId,
    pub stage: Stage,
    /// `None` only for the reduce result.
    pub index: Option<usize>,
}

impl StageKey {
    pub fn chunk(run_id: RunId, index: usize) -> Self {
        Self {
            run_id,
            stage: Stage::Split,
            index: Some(index),
        }
    }

    pub fn map(run_id: RunId, index: usize) -> Self {
        Self {
            run_id,
            stage: Stage::Map,
            index: Some(index),
        }
    }

    pub fn result(run_id: RunId) -> Self {
        Self {
            run_id,
            stage: Stage::Reduce,
            index: None,
        }
    }

    pub fn to_key(&self) -> String {
        let directory = self.stage.directory();
        let run_id = &self.run_id;
        let index = self.index.unwrap_or(0);
        match self.stage {
            Stage::Split => format!("{directory}/run-{run_id}/chunk-{index}.txt"),
            Stage::Map => format!("{directory}/run-{run_id}/map-{index}.json"),
            Stage::Reduce => format!("{directory}/run-{run_id}/result.json"),
        }
    }

    /// Recovers the typed key from a stored key. The stage directory must be
    /// one of `chunks`, `maps` or `reduce`.
    pub fn parse(key: &str) -> Result<Self, PipelineError> {
        let (run_id, index) = split_key(key)?;
        let directory = key.split('/').next().unwrap_or_default();
        let stage = Stage::from_directory(directory).ok_or_else(|| {
            PipelineError::MalformedKey(format!(
                "{key}: unknown stage directory `{directory}`"
            ))
        })?;
        let index = match stage {
            Stage::Reduce => None,
            Stage::Split | Stage::Map => Some(index.unwrap_or_else(|| index_fallback(key))),
        };
        Ok(Self {
            run_id,
            stage,
            index,
        })
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

pub fn chunk_key(run_id: &RunId, index: usize) -> String {
    StageKey::chunk(run_id.clone(), index).to_key()
}

pub fn map_key(run_id: &RunId, index: usize) -> String {
    StageKey::map(run_id.clone(), index).to_key()
}

pub fn result_key(run_id: &RunId) -> String {
    StageKey::result(run_id.clone()).to_key()
}

/// Reads the run id and index out of a chunk or map key.
///
/// The key needs at least three `/`-separated segments and a non-empty run
/// segment. An index that does not parse as a non-negative integer falls
/// back to 0.
pub fn extract_run_and_index(key: &str) -> Result<(RunId, usize), PipelineError> {
    let (run_id, index) = split_key(key)?;
    Ok((run_id, index.unwrap_or_else(|| index_fallback(key))))
}

fn split_key(key: &str) -> Result<(RunId, Option<usize>), PipelineError> {
    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() < 3 {
        return Err(PipelineError::MalformedKey(format!(
            "{key}: expected <stage>/run-<id>/<file>"
        )));
    }

    let run_segment = segments[1];
    let run_id = run_segment.strip_prefix(RUN_PREFIX).unwrap_or(run_segment);
    if run_id.is_empty() {
        return Err(PipelineError::MalformedKey(format!("{key}: empty run id")));
    }

    let file = segments[segments.len() - 1];
    Ok((RunId::new(run_id), parse_index(file)))
}

// `chunk-12.txt` -> 12
fn parse_index(file: &str) -> Option<usize> {
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    let (_, digits) = stem.split_once('-')?;
    digits.parse().ok()
}

fn index_fallback(key: &str) -> usize {
    tracing::warn!(key, "Index segment is not a non-negative integer, using 0");
    0
}
