use log::debug;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    agent::{Agent, Episode},
    algo::tabular::QTable,
    decay,
    env::{DiscreteActionSpace, DiscreteStateSpace, Step},
    exploration::{EpsilonGreedy, Exploration},
};

use super::{PlannerConfig, PriorityPlanner};

/// Configuration for the [`PrioritizedSweepingAgent`]
#[derive(Debug, Clone)]
pub struct PrioritizedSweepingAgentConfig<X> {
    /// Hyperparameters of the background planner
    pub planner: PlannerConfig,
    /// The exploration policy used for real steps
    ///
    /// **Default**: [`EpsilonGreedy`] with a constant epsilon of `0.1`
    pub exploration: X,
    /// Seed for the agent's random number generator, or `None` to seed from entropy
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl Default for PrioritizedSweepingAgentConfig<EpsilonGreedy<decay::Constant>> {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            exploration: EpsilonGreedy::new(decay::Constant::new(0.1)),
            seed: None,
        }
    }
}

/// A model-based agent that interleaves real steps with prioritized sweeping
///
/// After every real transition `(s, a, r, s')` the agent records it in its model, queues
/// `(s, a)` by its temporal difference error and then runs one batch of planning updates.
///
/// ### Generics
/// - `X` - The [`Exploration`] policy used to pick actions during real steps
pub struct PrioritizedSweepingAgent<X: Exploration> {
    planner: PriorityPlanner,
    exploration: X,
    rng: StdRng,
    episode: u32,
}

impl<X: Exploration> PrioritizedSweepingAgent<X> {
    /// Initialize an agent with empty tables for `n_states` states and `n_actions` actions
    pub fn new(config: PrioritizedSweepingAgentConfig<X>, n_states: usize, n_actions: usize) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            planner: PriorityPlanner::new(config.planner, n_states, n_actions),
            exploration: config.exploration,
            rng,
            episode: 0,
        }
    }

    /// Initialize an agent with tables sized for `env`
    pub fn for_env<E>(config: PrioritizedSweepingAgentConfig<X>, env: &E) -> Self
    where
        E: DiscreteStateSpace + DiscreteActionSpace,
    {
        Self::new(config, env.num_states(), env.num_actions())
    }

    pub fn planner(&self) -> &PriorityPlanner {
        &self.planner
    }

    pub fn q_table(&self) -> &QTable {
        self.planner.q_table()
    }

    /// Number of episodes completed
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Greedy action for `state` under the current value estimates
    pub fn greedy(&mut self, state: usize) -> usize {
        self.planner.q_table().argmax(state, &mut self.rng)
    }

    fn act(&mut self, state: usize) -> usize {
        let q_values = self.planner.q_table().row(state);
        self.exploration
            .select(state, self.episode, q_values, &mut self.rng)
    }
}

impl<E, X> Agent<E> for PrioritizedSweepingAgent<X>
where
    E: DiscreteStateSpace + DiscreteActionSpace,
    X: Exploration,
{
    fn go(&mut self, env: &mut E) -> Episode {
        assert_eq!(
            self.planner.q_table().shape(),
            (env.num_states(), env.num_actions()),
            "agent tables do not match the environment"
        );

        let mut summary = Episode::default();
        let mut state = env.reset();
        loop {
            let action = self.act(state);
            let Step {
                next_state,
                reward,
                terminated,
                truncated,
            } = env.step(action.into());

            self.planner.observe(state, action, reward, next_state);
            self.planner.plan_batch();

            summary.steps += 1;
            summary.reward += reward;
            if terminated || truncated {
                summary.terminated = terminated;
                break;
            }
            state = next_state;
        }

        debug!(
            "episode {} finished: steps={} reward={} terminated={}",
            self.episode, summary.steps, summary.reward, summary.terminated
        );
        self.episode += 1;
        summary
    }
}
