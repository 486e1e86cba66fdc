/// Model-based planning with prioritized sweeping
pub mod planning;

/// Sarsa over tile-coded action values
pub mod sarsa;

/// Dense tabular value storage
pub mod tabular;

pub use planning::{PrioritizedSweepingAgent, PriorityPlanner};
pub use sarsa::TileCodedSarsaAgent;
