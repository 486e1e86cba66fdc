use crate::env::Environment;

/// Summary of a single episode
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Episode {
    /// Number of real environment steps taken
    pub steps: usize,
    /// Undiscounted sum of rewards
    pub reward: f32,
    /// Whether the episode ended in a terminal state rather than being truncated
    pub terminated: bool,
}

/// An agent that learns by interacting with an environment one episode at a time
pub trait Agent<E: Environment> {
    /// Run a single episode in `env`, learning as it goes
    fn go(&mut self, env: &mut E) -> Episode;
}
