use rand::Rng;

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// A policy for picking one of a discrete state's actions from their current value estimates
pub trait Exploration {
    /// Select an action index in `0..q_values.len()`
    ///
    /// ### Parameters
    /// - `state` - Dense index of the state the action is taken in
    /// - `episode` - Number of episodes completed so far
    /// - `q_values` - Current value estimate of each action in `state`
    /// - `rng` - Source of randomness for exploration and tie-breaking
    fn select<R: Rng + ?Sized>(
        &mut self,
        state: usize,
        episode: u32,
        q_values: &[f32],
        rng: &mut R,
    ) -> usize;
}

mod epsilon_greedy;
mod ucb;

pub use epsilon_greedy::EpsilonGreedy;
pub use ucb::UCB;
