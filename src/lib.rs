//! Model-based planning and tile-coded function approximation for reinforcement learning
//!
//! Two learners live here:
//! - [`PrioritizedSweepingAgent`](algo::planning::PrioritizedSweepingAgent) learns a model of a
//!   finite environment and spends planning updates where the value estimates are changing most
//! - [`TileCodedSarsaAgent`](algo::sarsa::TileCodedSarsaAgent) runs on-policy Sarsa over a
//!   continuous state space using a [`TileCodedQ`](approx::TileCodedQ)

/// Agent interface
pub mod agent;

/// Implemented RL algorithms
pub mod algo;

/// Tile coding over bounded continuous domains
pub mod approx;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

mod error;

/// Exploration policies
pub mod exploration;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

pub mod persist;

/// Conversions to `burn` tensors
pub mod traits;

pub mod util;

pub use error::{Error, Result};
