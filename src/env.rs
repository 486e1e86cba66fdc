use std::{
    collections::{btree_map::Entry, BTreeMap},
    ops::Index,
};

use rand::{seq::IteratorRandom, Rng};

/// Outcome of a single environment step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<S> {
    /// The state the environment moved into
    pub next_state: S,
    /// The reward received for the transition
    pub reward: f32,
    /// Whether `next_state` is terminal
    pub terminated: bool,
    /// Whether the episode was cut short, e.g. by a step limit
    pub truncated: bool,
}

impl<S> Step<S> {
    /// Whether the episode is over for either reason
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Update the environment in response to an action taken by an agent
    fn step(&mut self, action: Self::Action) -> Step<Self::State>;

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;
}

/// An environment whose states are the dense indices `0..num_states()`
pub trait DiscreteStateSpace: Environment<State = usize> {
    fn num_states(&self) -> usize;
}

/// An environment with a finite set of actions, indexable as `0..num_actions()`
pub trait DiscreteActionSpace: Environment<Action: Copy + From<usize> + Into<usize>> {
    /// Size of the action set
    fn num_actions(&self) -> usize;

    /// All actions, in index order
    fn actions(&self) -> Vec<Self::Action> {
        (0..self.num_actions()).map(Into::into).collect()
    }

    /// Choose an action uniformly at random
    fn random_action<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Action {
        self.actions()
            .into_iter()
            .choose(rng)
            .expect("There is always at least one action available")
    }
}

/// Named accumulators for episode statistics
///
/// Environments keep a `Report` and add to it as they are stepped; a driver
/// calls [`Report::take`] at the end of each episode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    data: BTreeMap<&'static str, f64>,
}

impl Report {
    pub fn new(keys: Vec<&'static str>) -> Self {
        Self {
            data: keys.into_iter().map(|k| (k, 0.0)).collect(),
        }
    }

    /// Access an accumulator by name
    pub fn entry(&mut self, key: &'static str) -> Entry<'_, &'static str, f64> {
        self.data.entry(key)
    }

    /// Names of the accumulators, in sorted order
    pub fn keys(&self) -> Vec<&'static str> {
        self.data.keys().copied().collect()
    }

    /// Return the current values and reset every accumulator to zero
    pub fn take(&mut self) -> BTreeMap<&'static str, f64> {
        let reset = self.data.keys().map(|&k| (k, 0.0)).collect();
        std::mem::replace(&mut self.data, reset)
    }
}

impl Index<&str> for Report {
    type Output = f64;

    fn index(&self, key: &str) -> &Self::Output {
        &self.data[key]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    /// Deterministic chain `0 -> 1 -> ... -> len - 1` where action 1 moves right
    /// and action 0 stays put; reaching the end pays 1
    pub struct Chain {
        pub len: usize,
        pub pos: usize,
    }

    impl Chain {
        pub fn new(len: usize) -> Self {
            Self { len, pos: 0 }
        }
    }

    impl Environment for Chain {
        type State = usize;
        type Action = usize;

        fn step(&mut self, action: usize) -> Step<usize> {
            if action == 1 {
                self.pos += 1;
            }
            let terminated = self.pos == self.len - 1;
            Step {
                next_state: self.pos,
                reward: if terminated { 1.0 } else { 0.0 },
                terminated,
                truncated: false,
            }
        }

        fn reset(&mut self) -> usize {
            self.pos = 0;
            self.pos
        }
    }

    impl DiscreteStateSpace for Chain {
        fn num_states(&self) -> usize {
            self.len
        }
    }

    impl DiscreteActionSpace for Chain {
        fn num_actions(&self) -> usize {
            2
        }
    }

    #[test]
    fn report_take_resets() {
        let mut report = Report::new(vec!["steps", "reward"]);
        report.entry("steps").and_modify(|x| *x += 1.0);
        report.entry("steps").and_modify(|x| *x += 1.0);
        report.entry("reward").and_modify(|x| *x -= 0.5);

        assert_eq!(report.keys(), ["reward", "steps"], "keys are sorted");
        assert_eq!(report["steps"], 2.0);

        let taken = report.take();
        assert_eq!(taken["reward"], -0.5, "taken values returned");
        assert_eq!(report["steps"], 0.0, "accumulators reset");
    }

    #[test]
    fn random_action_covers_action_set() {
        let env = Chain::new(4);
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [0; 2];
        for _ in 0..200 {
            seen[env.random_action(&mut rng)] += 1;
        }
        assert!(seen.iter().all(|&n| n > 50), "both actions drawn often: {seen:?}");
    }

    #[test]
    fn chain_actions() {
        let mut env = Chain::new(3);
        assert_eq!(env.actions(), vec![0, 1], "actions in index order");
        assert_eq!(env.reset(), 0);
        assert!(!env.step(1).is_done());
        let step = env.step(1);
        assert!(step.terminated && step.reward == 1.0, "end of chain pays out");
    }
}
