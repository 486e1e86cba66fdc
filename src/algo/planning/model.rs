use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    util,
};

/// Memory of the most recently observed transition for every state-action pair,
/// with a reverse index from each state to the pairs observed to lead into it
///
/// The model assumes a deterministic environment: a new observation for a pair replaces
/// the old successor and reward. The reverse index only grows, and holds each
/// `(s, a) -> s'` edge at most once no matter how often it is observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelData")]
pub struct EnvironmentModel {
    n_states: usize,
    n_actions: usize,
    transitions: Vec<Option<usize>>,
    rewards: Vec<f32>,
    predecessors: Vec<Vec<(usize, usize)>>,
}

impl EnvironmentModel {
    /// Initialize an empty model over states `0..n_states` and actions `0..n_actions`
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_states,
            n_actions,
            transitions: vec![None; n_states * n_actions],
            rewards: vec![0.0; n_states * n_actions],
            predecessors: vec![Vec::new(); n_states],
        }
    }

    /// `(n_states, n_actions)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_states, self.n_actions)
    }

    fn ix(&self, state: usize, action: usize) -> usize {
        assert!(
            state < self.n_states && action < self.n_actions,
            "state-action pair ({state}, {action}) out of range for model of shape ({}, {})",
            self.n_states,
            self.n_actions,
        );
        state * self.n_actions + action
    }

    /// Record that taking `action` in `state` paid `reward` and led to `next_state`
    pub fn add(&mut self, state: usize, action: usize, reward: f32, next_state: usize) {
        assert!(
            next_state < self.n_states,
            "successor state {next_state} out of range for model with {} states",
            self.n_states
        );
        let ix = self.ix(state, action);
        self.transitions[ix] = Some(next_state);
        self.rewards[ix] = reward;

        let preds = &mut self.predecessors[next_state];
        if !preds.contains(&(state, action)) {
            preds.push((state, action));
        }
    }

    /// The recorded successor and reward for a pair
    ///
    /// The successor is `None`, and the reward zero, if the pair was never observed.
    pub fn get(&self, state: usize, action: usize) -> (Option<usize>, f32) {
        let ix = self.ix(state, action);
        (self.transitions[ix], self.rewards[ix])
    }

    /// Whether the pair has been observed at least once
    pub fn is_known(&self, state: usize, action: usize) -> bool {
        self.transitions[self.ix(state, action)].is_some()
    }

    /// Every pair observed to lead into `state`, in order of first observation
    ///
    /// Empty if `state` was never reached.
    pub fn get_predecessors(&self, state: usize) -> &[(usize, usize)] {
        assert!(
            state < self.n_states,
            "state {state} out of range for model with {} states",
            self.n_states
        );
        &self.predecessors[state]
    }

    /// Whether `state` has ever been observed as a successor
    pub fn has_predecessors(&self, state: usize) -> bool {
        !self.get_predecessors(state).is_empty()
    }

    /// Number of distinct pairs observed so far
    pub fn len(&self) -> usize {
        self.transitions.iter().filter(|t| t.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.iter().all(Option::is_none)
    }
}

#[derive(Deserialize)]
struct ModelData {
    n_states: usize,
    n_actions: usize,
    transitions: Vec<Option<usize>>,
    rewards: Vec<f32>,
    predecessors: Vec<Vec<(usize, usize)>>,
}

impl TryFrom<ModelData> for EnvironmentModel {
    type Error = Error;

    fn try_from(data: ModelData) -> Result<Self> {
        let (n_states, n_actions) = (data.n_states, data.n_actions);
        let inconsistent = |message: String| Error::Inconsistent {
            what: "environment model",
            message,
        };

        util::check_table_len("model transitions", n_states, n_actions, data.transitions.len())?;
        util::check_table_len("model rewards", n_states, n_actions, data.rewards.len())?;
        if data.predecessors.len() != n_states {
            return Err(inconsistent(format!(
                "{} predecessor sets for {n_states} states",
                data.predecessors.len()
            )));
        }
        if let Some(next) = data.transitions.iter().flatten().find(|&&s| s >= n_states) {
            return Err(inconsistent(format!("successor {next} out of range")));
        }

        let mut model = Self::new(n_states, n_actions);
        model.transitions = data.transitions;
        model.rewards = data.rewards;
        for (next, preds) in data.predecessors.into_iter().enumerate() {
            for (s, a) in preds {
                if s >= n_states || a >= n_actions {
                    return Err(inconsistent(format!("predecessor ({s}, {a}) out of range")));
                }
                if !model.is_known(s, a) {
                    return Err(inconsistent(format!(
                        "predecessor ({s}, {a}) of {next} was never observed"
                    )));
                }
                if !model.predecessors[next].contains(&(s, a)) {
                    model.predecessors[next].push((s, a));
                }
            }
        }
        Ok(model)
    }
}
