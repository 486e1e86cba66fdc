use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    util,
};

/// A priority queue over state-action pairs backed by a dense `|S| × |A|` table
///
/// A priority of zero means the pair is not queued. Priorities only ever rise through
/// [`raise`](PriorityTable::raise) and drop to zero when the pair is popped. Selection is a
/// linear scan, which is cheap for the small tables planning is run on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PriorityTableData")]
pub struct PriorityTable {
    n_states: usize,
    n_actions: usize,
    priorities: Vec<f32>,
    /// Count of positive entries, rebuilt from `priorities` on load
    #[serde(skip)]
    queued: usize,
}

impl PriorityTable {
    /// Initialize an empty queue for a table of shape `(n_states, n_actions)`
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_states,
            n_actions,
            priorities: vec![0.0; n_states * n_actions],
            queued: 0,
        }
    }

    /// `(n_states, n_actions)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_states, self.n_actions)
    }

    fn ix(&self, state: usize, action: usize) -> usize {
        assert!(
            state < self.n_states && action < self.n_actions,
            "state-action pair ({state}, {action}) out of range for priority table of shape ({}, {})",
            self.n_states,
            self.n_actions,
        );
        state * self.n_actions + action
    }

    /// Current priority of a pair, zero if not queued
    pub fn get(&self, state: usize, action: usize) -> f32 {
        self.priorities[self.ix(state, action)]
    }

    /// Number of queued pairs
    pub fn len(&self) -> usize {
        self.queued
    }

    pub fn is_empty(&self) -> bool {
        self.queued == 0
    }

    /// Queue a pair with `priority` if it exceeds both `theta` and the pair's current priority
    ///
    /// **Returns** whether the stored priority changed
    pub fn raise(&mut self, state: usize, action: usize, priority: f32, theta: f32) -> bool {
        let ix = self.ix(state, action);
        let current = self.priorities[ix];
        if priority > theta && priority > current {
            if current == 0.0 {
                self.queued += 1;
            }
            self.priorities[ix] = priority;
            true
        } else {
            false
        }
    }

    /// Remove the pair with the highest priority and return it with its priority
    ///
    /// Ties go to the lowest row-major index `s * |A| + a`. Returns `None` when nothing is queued.
    pub fn pop_max(&mut self) -> Option<(usize, usize, f32)> {
        if self.queued == 0 {
            return None;
        }

        let (ix, priority) = self
            .priorities
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0), |best, (i, p)| if p > best.1 { (i, p) } else { best });
        if priority <= 0.0 {
            return None;
        }

        self.priorities[ix] = 0.0;
        self.queued -= 1;
        Some((ix / self.n_actions, ix % self.n_actions, priority))
    }

    /// Drop every queued pair
    pub fn clear(&mut self) {
        self.priorities.fill(0.0);
        self.queued = 0;
    }

    /// Row-major view of every priority
    pub fn priorities(&self) -> &[f32] {
        &self.priorities
    }
}

#[derive(Deserialize)]
struct PriorityTableData {
    n_states: usize,
    n_actions: usize,
    priorities: Vec<f32>,
}

impl TryFrom<PriorityTableData> for PriorityTable {
    type Error = Error;

    fn try_from(data: PriorityTableData) -> Result<Self> {
        util::check_table_len(
            "priority table",
            data.n_states,
            data.n_actions,
            data.priorities.len(),
        )?;
        if let Some(p) = data.priorities.iter().find(|p| !(p.is_finite() && **p >= 0.0)) {
            return Err(Error::Inconsistent {
                what: "priority table",
                message: format!("priority {p} is not a finite non-negative value"),
            });
        }
        let queued = data.priorities.iter().filter(|&&p| p > 0.0).count();
        Ok(Self {
            n_states: data.n_states,
            n_actions: data.n_actions,
            priorities: data.priorities,
            queued,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_raise_is_monotonic() {
        let mut queue = PriorityTable::new(2, 2);
        assert!(queue.raise(0, 1, 0.5, 0.1), "first raise accepted");
        assert!(!queue.raise(0, 1, 0.3, 0.1), "lower priority rejected");
        assert!(!queue.raise(0, 1, 0.5, 0.1), "equal priority rejected");
        assert_eq!(queue.get(0, 1), 0.5, "entry left at p1");
        assert!(queue.raise(0, 1, 0.7, 0.1), "higher priority accepted");
        assert_eq!(queue.get(0, 1), 0.7);
        assert_eq!(queue.len(), 1, "still a single queued pair");
    }

    #[test]
    fn priority_threshold_is_strict() {
        let mut queue = PriorityTable::new(2, 2);
        assert!(!queue.raise(1, 0, 0.1, 0.1), "priority equal to theta rejected");
        assert!(!queue.raise(1, 0, 0.05, 0.1), "priority below theta rejected");
        assert!(queue.is_empty());
        assert!(queue.raise(1, 0, 0.0001, 0.0), "anything positive passes theta = 0");
    }

    #[test]
    fn pop_max_orders_and_zeroes() {
        let mut queue = PriorityTable::new(3, 2);
        queue.raise(0, 0, 1.0, 0.0);
        queue.raise(2, 1, 3.0, 0.0);
        queue.raise(1, 1, 2.0, 0.0);

        assert_eq!(queue.pop_max(), Some((2, 1, 3.0)));
        assert_eq!(queue.get(2, 1), 0.0, "popped entry zeroed");
        assert_eq!(queue.pop_max(), Some((1, 1, 2.0)));
        assert_eq!(queue.pop_max(), Some((0, 0, 1.0)));
        assert_eq!(queue.pop_max(), None, "empty queue");
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_max_ties_go_to_lowest_index() {
        let mut queue = PriorityTable::new(2, 2);
        queue.raise(1, 0, 1.0, 0.0);
        queue.raise(0, 1, 1.0, 0.0);
        assert_eq!(queue.pop_max(), Some((0, 1, 1.0)));
        assert_eq!(queue.pop_max(), Some((1, 0, 1.0)));
    }

    #[test]
    fn clear_empties_queue() {
        let mut queue = PriorityTable::new(2, 2);
        queue.raise(1, 1, 1.0, 0.0);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop_max(), None);
    }
}
