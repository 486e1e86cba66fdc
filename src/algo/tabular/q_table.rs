use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    util,
};

/// A dense table of action values `Q[s,a]` over states `0..n_states` and actions `0..n_actions`
///
/// Entries start at zero. Indexing outside the declared shape panics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QTableData")]
pub struct QTable {
    n_states: usize,
    n_actions: usize,
    values: Vec<f32>,
}

impl QTable {
    /// Initialize a zeroed table of shape `(n_states, n_actions)`
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        assert!(n_actions > 0, "a Q table needs at least one action");
        Self {
            n_states,
            n_actions,
            values: vec![0.0; n_states * n_actions],
        }
    }

    /// `(n_states, n_actions)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_states, self.n_actions)
    }

    fn ix(&self, state: usize, action: usize) -> usize {
        assert!(
            state < self.n_states && action < self.n_actions,
            "state-action pair ({state}, {action}) out of range for table of shape ({}, {})",
            self.n_states,
            self.n_actions,
        );
        state * self.n_actions + action
    }

    pub fn get(&self, state: usize, action: usize) -> f32 {
        self.values[self.ix(state, action)]
    }

    /// The action values of a single state
    pub fn row(&self, state: usize) -> &[f32] {
        let start = self.ix(state, 0);
        &self.values[start..start + self.n_actions]
    }

    /// max<sub>a</sub> Q[s,a]
    pub fn max(&self, state: usize) -> f32 {
        util::max(self.row(state))
    }

    /// Greedy action in `state`, ties broken uniformly at random
    pub fn argmax<R: Rng + ?Sized>(&self, state: usize, rng: &mut R) -> usize {
        util::argmax(self.row(state), rng)
    }

    /// Move `Q[s,a]` a fraction `alpha` of the way toward `target`
    ///
    /// Q[s,a] ← Q[s,a] + α(target - Q[s,a])
    ///
    /// **Returns** the new value
    pub fn update(&mut self, state: usize, action: usize, target: f32, alpha: f32) -> f32 {
        let ix = self.ix(state, action);
        let q = &mut self.values[ix];
        *q += alpha * (target - *q);
        *q
    }

    /// Row-major view of every value
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

#[derive(Deserialize)]
struct QTableData {
    n_states: usize,
    n_actions: usize,
    values: Vec<f32>,
}

impl TryFrom<QTableData> for QTable {
    type Error = Error;

    fn try_from(data: QTableData) -> Result<Self> {
        if data.n_actions == 0 {
            return Err(Error::Inconsistent {
                what: "Q table",
                message: "no actions".into(),
            });
        }
        util::check_table_len("Q table", data.n_states, data.n_actions, data.values.len())?;
        Ok(Self {
            n_states: data.n_states,
            n_actions: data.n_actions,
            values: data.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn q_table_starts_zeroed() {
        let table = QTable::new(3, 2);
        assert_eq!(table.shape(), (3, 2));
        assert!(table.values().iter().all(|&q| q == 0.0), "all entries zero");
        assert_eq!(table.max(2), 0.0);
    }

    #[test]
    fn q_table_update_moves_toward_target() {
        let mut table = QTable::new(2, 2);
        assert_eq!(table.update(1, 0, 2.0, 0.5), 1.0);
        assert_eq!(table.update(1, 0, 2.0, 0.5), 1.5);
        assert_eq!(table.row(1), [1.5, 0.0], "only the targeted entry moved");
        assert_eq!(table.row(0), [0.0, 0.0], "other rows untouched");

        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(table.argmax(1, &mut rng), 0);
        assert_eq!(table.max(1), 1.5);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn q_table_rejects_bad_index() {
        QTable::new(2, 2).get(2, 0);
    }
}
