mod agent;
mod model;
mod planner;

pub use agent::{PrioritizedSweepingAgent, PrioritizedSweepingAgentConfig};
pub use model::EnvironmentModel;
pub use planner::{PlannerConfig, PriorityPlanner};
