use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{decay::Decay, util};

use super::{Choice, Exploration};

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Value of epsilon for the given episode
    pub fn epsilon(&self, episode: u32) -> f32 {
        self.epsilon.evaluate(episode as f32)
    }

    /// Invoke epsilon greedy policy for current episode
    pub fn choose<R: Rng + ?Sized>(&self, episode: u32, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon(episode) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}

impl<D: Decay> Exploration for EpsilonGreedy<D> {
    fn select<R: Rng + ?Sized>(
        &mut self,
        _state: usize,
        episode: u32,
        q_values: &[f32],
        rng: &mut R,
    ) -> usize {
        match self.choose(episode, rng) {
            Choice::Explore => rng.gen_range(0..q_values.len()),
            Choice::Exploit => util::argmax(q_values, rng),
        }
    }
}
