//! tests/api/main.rs
mod helpers;
mod pipeline;
mod stages;
