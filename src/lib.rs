//! src/lib.rs
pub mod configuration;
pub mod counts;
pub mod driver;
pub mod error;
pub mod mappers;
pub mod pipeline;
pub mod reducers;
pub mod reference;
pub mod run_id;
pub mod service;
pub mod startup;
pub mod storage;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod text_splitter;
pub mod verify;
