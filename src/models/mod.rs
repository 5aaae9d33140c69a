// src/models/mod.rs

pub mod chain;

pub use chain::{ChainModel, ChainState};
