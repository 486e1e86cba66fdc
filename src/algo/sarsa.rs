use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    agent::{Agent, Episode},
    approx::{TileCodedQ, TileCoderConfig},
    assert_interval,
    decay::{self, Decay},
    env::{DiscreteActionSpace, Step},
    error::Result,
    exploration::{Choice, EpsilonGreedy},
};

/// Configuration for the [`TileCodedSarsaAgent`]
#[derive(Debug, Clone)]
pub struct TileCodedSarsaConfig<D: Decay> {
    /// Tilings laid over the environment's continuous state space
    pub tiles: TileCoderConfig,
    /// The exploration policy
    ///
    /// **Default**: exponentially decaying epsilon from `1.0` to `0.01`
    pub exploration: EpsilonGreedy<D>,
    /// The learning rate
    ///
    /// **Default**: `0.1`
    pub alpha: f32,
    /// The discount factor
    ///
    /// **Default**: `1.0`
    pub gamma: f32,
    /// Seed for the agent's random number generator, or `None` to seed from entropy
    pub seed: Option<u64>,
}

impl TileCodedSarsaConfig<decay::Exponential> {
    /// Default hyperparameters over the given tilings
    pub fn new(tiles: TileCoderConfig) -> Self {
        Self {
            tiles,
            exploration: EpsilonGreedy::new(
                decay::Exponential::new(5e-3, 1.0, 0.01).expect("rate and bounds agree in sign"),
            ),
            alpha: 0.1,
            gamma: 1.0,
            seed: None,
        }
    }
}

/// On-policy Sarsa over a continuous state space, with action values held in a [`TileCodedQ`]
///
/// Each step moves Q(s,a) toward r + γQ(s',a'), where a' is the action actually taken next,
/// or toward r alone when s' is terminal.
///
/// ### Generics
/// - `D` - The decay strategy for the exploration parameter
pub struct TileCodedSarsaAgent<D: Decay> {
    q: TileCodedQ,
    exploration: EpsilonGreedy<D>,
    alpha: f32,
    gamma: f32,
    rng: StdRng,
    episode: u32,
}

impl<D: Decay> TileCodedSarsaAgent<D> {
    /// Initialize an agent for an environment with `n_actions` actions
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `(0,1]`
    pub fn new(config: TileCodedSarsaConfig<D>, n_actions: usize) -> Result<Self> {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        assert!(config.alpha > 0.0, "Learning rate `alpha` must be positive.");
        assert!(config.gamma > 0.0, "Discount factor `gamma` must be positive.");
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            q: TileCodedQ::new(&config.tiles, n_actions)?,
            exploration: config.exploration,
            alpha: config.alpha,
            gamma: config.gamma,
            rng,
            episode: 0,
        })
    }

    /// Initialize an agent sized to `env`'s action set
    pub fn for_env<E: DiscreteActionSpace>(config: TileCodedSarsaConfig<D>, env: &E) -> Result<Self> {
        Self::new(config, env.num_actions())
    }

    pub fn q(&self) -> &TileCodedQ {
        &self.q
    }

    /// Number of episodes completed
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Greedy action at `point` under the current estimates
    pub fn greedy(&mut self, point: &[f32]) -> usize {
        self.q.argmax_action(point, &mut self.rng)
    }

    fn act(&mut self, point: &[f32]) -> usize {
        match self.exploration.choose(self.episode, &mut self.rng) {
            Choice::Explore => self.rng.gen_range(0..self.q.n_actions()),
            Choice::Exploit => self.q.argmax_action(point, &mut self.rng),
        }
    }

    fn learn(&mut self, point: &[f32], action: usize, target: f32) {
        let old = self.q.read(point, action);
        self.q.write(point, action, old + self.alpha * (target - old));
    }
}

impl<E, D> Agent<E> for TileCodedSarsaAgent<D>
where
    E: DiscreteActionSpace,
    E::State: AsRef<[f32]>,
    D: Decay,
{
    fn go(&mut self, env: &mut E) -> Episode {
        assert_eq!(
            self.q.n_actions(),
            env.num_actions(),
            "agent action count does not match the environment"
        );

        let mut summary = Episode::default();
        let mut state = env.reset();
        let mut action = self.act(state.as_ref());
        loop {
            let Step {
                next_state,
                reward,
                terminated,
                truncated,
            } = env.step(action.into());
            summary.steps += 1;
            summary.reward += reward;

            if terminated {
                self.learn(state.as_ref(), action, reward);
                summary.terminated = true;
                break;
            }

            let next_action = self.act(next_state.as_ref());
            let target = reward + self.gamma * self.q.read(next_state.as_ref(), next_action);
            self.learn(state.as_ref(), action, target);

            if truncated {
                break;
            }
            state = next_state;
            action = next_action;
        }

        debug!(
            "episode {} finished: steps={} reward={} epsilon={}",
            self.episode,
            summary.steps,
            summary.reward,
            self.exploration.epsilon(self.episode)
        );
        self.episode += 1;
        summary
    }
}
