// src/math/mod.rs

pub mod banded;
pub mod error;
pub mod integrator;
pub mod statistics;
pub mod tableau;

pub use banded::TridiagonalBands;
pub use error::MathError;
pub use integrator::{AdaptiveIntegrator, Derivative, IntegratorSnapshot};
pub use statistics::moving_average;
pub use tableau::{ScaledTableau, TableauVariant};
