//! src/reducers/mod.rs
mod adder;

pub use adder::merge;
