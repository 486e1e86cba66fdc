use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{algo::tabular::QTable, assert_interval, ds::PriorityTable};

use super::EnvironmentModel;

/// Configuration for the [`PriorityPlanner`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// The learning rate α applied to every backup
    ///
    /// **Default**: `0.1`
    pub alpha: f32,
    /// The discount factor γ
    ///
    /// **Default**: `0.95`
    pub gamma: f32,
    /// Activation threshold θ a priority must exceed to be queued
    ///
    /// **Default**: `1e-4`
    pub theta: f32,
    /// Number of planning updates run after each real step
    ///
    /// **Default**: `5`
    pub n_planning: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.95,
            theta: 1e-4,
            n_planning: 5,
        }
    }
}

/// Prioritized sweeping over a learned [`EnvironmentModel`]
///
/// The planner owns the model, the priority queue and the action-value table for a single
/// training run. Each planning update pops the pair with the largest temporal difference
/// error, backs it up with
///
/// Q[s,a] ← Q[s,a] + α(r + γ max<sub>a'</sub> Q[s',a'] - Q[s,a])
///
/// and then re-prioritizes every pair known to lead into `s`, so that new information
/// flows backward through the model without further real experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityPlanner {
    model: EnvironmentModel,
    priorities: PriorityTable,
    q_table: QTable,
    alpha: f32,
    gamma: f32,
    theta: f32,
    n_planning: usize,
}

impl PriorityPlanner {
    /// Initialize a planner with empty tables of shape `(n_states, n_actions)`
    ///
    /// **Panics** if `alpha` or `gamma` is not in `(0,1]` or `theta` is negative
    pub fn new(config: PlannerConfig, n_states: usize, n_actions: usize) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        assert!(config.alpha > 0.0, "Learning rate `alpha` must be positive.");
        assert!(config.gamma > 0.0, "Discount factor `gamma` must be positive.");
        assert!(config.theta >= 0.0, "Priority threshold `theta` must be non-negative.");
        Self {
            model: EnvironmentModel::new(n_states, n_actions),
            priorities: PriorityTable::new(n_states, n_actions),
            q_table: QTable::new(n_states, n_actions),
            alpha: config.alpha,
            gamma: config.gamma,
            theta: config.theta,
            n_planning: config.n_planning,
        }
    }

    pub fn model(&self) -> &EnvironmentModel {
        &self.model
    }

    pub fn priorities(&self) -> &PriorityTable {
        &self.priorities
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Release the learned action values
    pub fn into_q_table(self) -> QTable {
        self.q_table
    }

    /// Temporal difference magnitude |r + γ max<sub>a'</sub> Q[s',a'] - Q[s,a]|
    pub fn td_priority(&self, state: usize, action: usize, reward: f32, next_state: usize) -> f32 {
        (reward + self.gamma * self.q_table.max(next_state) - self.q_table.get(state, action))
            .abs()
    }

    /// Queue a pair if `priority` exceeds θ and its current priority
    ///
    /// **Returns** whether the pair's priority changed
    pub fn enqueue(&mut self, state: usize, action: usize, priority: f32) -> bool {
        self.priorities.raise(state, action, priority, self.theta)
    }

    /// Feed a real transition to the planner
    ///
    /// The transition is recorded in the model and the pair is queued with its temporal
    /// difference magnitude against the observed reward and successor.
    pub fn observe(&mut self, state: usize, action: usize, reward: f32, next_state: usize) {
        self.model.add(state, action, reward, next_state);
        let priority = self.td_priority(state, action, reward, next_state);
        self.enqueue(state, action, priority);
    }

    /// Run one batch of the configured number of planning updates
    pub fn plan_batch(&mut self) -> usize {
        self.plan(self.n_planning)
    }

    /// Run up to `n` planning updates, stopping early once the queue is empty
    ///
    /// **Returns** the number of updates performed
    pub fn plan(&mut self, n: usize) -> usize {
        let mut updates = 0;
        while updates < n {
            let Some((state, action, priority)) = self.priorities.pop_max() else {
                break;
            };
            let (Some(next_state), reward) = self.model.get(state, action) else {
                panic!("pair ({state}, {action}) was queued without ever being observed");
            };

            let target = reward + self.gamma * self.q_table.max(next_state);
            let q = self.q_table.update(state, action, target, self.alpha);
            trace!("backup ({state}, {action}) priority={priority} q={q}");

            let state_value = self.q_table.max(state);
            for &(ps, pa) in self.model.get_predecessors(state) {
                let (_, pr) = self.model.get(ps, pa);
                let priority = (pr + self.gamma * state_value - self.q_table.get(ps, pa)).abs();
                self.priorities.raise(ps, pa, priority, self.theta);
            }

            updates += 1;
        }

        if updates < n {
            debug!("planning stopped early after {updates}/{n} updates: queue empty");
        } else {
            debug!("planning ran {updates} updates, {} pairs queued", self.priorities.len());
        }
        updates
    }
}
