use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::util;

use super::Exploration;

/// Upper confidence bound exploration policy, with visit counts kept per state
///
/// Each action is scored `q + c * sqrt(ln(t + 1) / (n + 1e-5))`, where `t` is the number of
/// times the state has been acted in and `n` the number of times the action was chosen there.
/// Untried actions therefore dominate until every action has been taken once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UCB {
    c: f32,
    counts: HashMap<usize, Vec<u32>>,
}

impl UCB {
    /// Initialize UCB policy with exploration parameter `c`
    ///
    /// A higher `c` value equates to more exploration. If unsure where to start, 1 is a good default value.
    pub fn new(c: f32) -> Self {
        assert!(c >= 0.0, "UCB exploration parameter must be non-negative");
        Self {
            c,
            counts: HashMap::new(),
        }
    }

    /// Number of times each action was selected in `state`
    pub fn counts(&self, state: usize) -> Option<&[u32]> {
        self.counts.get(&state).map(Vec::as_slice)
    }
}

impl Exploration for UCB {
    fn select<R: Rng + ?Sized>(
        &mut self,
        state: usize,
        _episode: u32,
        q_values: &[f32],
        rng: &mut R,
    ) -> usize {
        let counts = self
            .counts
            .entry(state)
            .or_insert_with(|| vec![0; q_values.len()]);
        assert_eq!(
            counts.len(),
            q_values.len(),
            "action count changed for state {state}"
        );

        let t = counts.iter().sum::<u32>() as f32;
        let k = (t + 1.0).ln();
        let scores = q_values
            .iter()
            .zip(counts.iter())
            .map(|(&q, &n)| q + self.c * (k / (n as f32 + 1e-5)).sqrt())
            .collect::<Vec<_>>();

        let choice = util::argmax(&scores, rng);
        counts[choice] += 1;
        choice
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn ucb_tries_every_action_first() {
        let mut policy = UCB::new(1.0);
        let mut rng = StdRng::seed_from_u64(3);
        let q_values = [0.0, 5.0, 0.0];
        let mut first = (0..3)
            .map(|_| policy.select(0, 0, &q_values, &mut rng))
            .collect::<Vec<_>>();
        first.sort();
        assert_eq!(first, [0, 1, 2], "each action tried once before repeats");
        assert_eq!(policy.counts(0), Some([1, 1, 1].as_slice()));
    }

    #[test]
    fn ucb_counts_are_per_state() {
        let mut policy = UCB::new(1.0);
        let mut rng = StdRng::seed_from_u64(3);
        policy.select(4, 0, &[0.0, 0.0], &mut rng);
        assert!(policy.counts(0).is_none(), "other states untouched");
        assert_eq!(policy.counts(4).map(|c| c.iter().sum::<u32>()), Some(1));
    }

    #[test]
    fn ucb_settles_on_best_action() {
        let mut policy = UCB::new(0.1);
        let mut rng = StdRng::seed_from_u64(3);
        let q_values = [0.0, 1.0];
        for _ in 0..200 {
            policy.select(0, 0, &q_values, &mut rng);
        }
        let counts = policy.counts(0).unwrap();
        assert!(counts[1] > counts[0] * 10, "best action dominates: {counts:?}");
    }
}
