//! src/run_id.rs
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Mutex;
use uuid::Uuid;

const RUN_ID_LEN: usize = 8;
const HEX: &[u8; 16] = b"0123456789abcdef";

/// Opaque token shared by every object one job writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait RunIdGenerator: Send + Sync + fmt::Debug {
    fn generate(&self) -> RunId;
}

/// Eight hex characters taken from a fresh v4 UUID.
#[derive(Debug, Default)]
pub struct RandomRunIds;

impl RunIdGenerator for RandomRunIds {
    fn generate(&self) -> RunId {
        let uuid = Uuid::new_v4().simple().to_string();
        RunId(uuid[..RUN_ID_LEN].to_string())
    }
}

/// Deterministic sequence of run ids for a given seed.
#[derive(Debug)]
pub struct SeededRunIds {
    rng: Mutex<StdRng>,
}

impl SeededRunIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RunIdGenerator for SeededRunIds {
    fn generate(&self) -> RunId {
        // A poisoned lock still holds a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let id = (0..RUN_ID_LEN)
            .map(|_| HEX[rng.random_range(0..HEX.len())] as char)
            .collect();
        RunId(id)
    }
}
