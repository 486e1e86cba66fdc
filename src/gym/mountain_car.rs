use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Uniform};
use strum::{FromRepr, VariantArray};

use crate::env::{DiscreteActionSpace, Environment, Report, Step};

const MIN_POSITION: f32 = -1.2;
const MAX_POSITION: f32 = 0.6;
const MAX_SPEED: f32 = 0.07;
const GOAL_POSITION: f32 = 0.5;
const FORCE: f32 = 0.001;
const GRAVITY: f32 = 0.0025;

/// Throttle applied for one step
#[derive(FromRepr, VariantArray, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MountainCarAction {
    Reverse = 0,
    Coast = 1,
    Forward = 2,
}

impl From<usize> for MountainCarAction {
    fn from(value: usize) -> Self {
        Self::from_repr(value)
            .expect("MountainCarAction::from is only called with valid values [0, 2]")
    }
}

impl From<MountainCarAction> for usize {
    fn from(value: MountainCarAction) -> Self {
        value as usize
    }
}

/// An underpowered car in a valley that must rock back and forth to reach the hilltop on the right
///
/// The state is `[position, velocity]` with position in `[-1.2, 0.6]` and velocity in
/// `[-0.07, 0.07]`. Every step pays `-1` and the episode terminates once the position reaches
/// `0.5`. Episodes are truncated after `max_steps` steps.
pub struct MountainCar {
    position: f32,
    velocity: f32,
    steps: usize,
    max_steps: usize,
    rng: StdRng,
    pub report: Report,
}

impl MountainCar {
    pub fn new() -> Self {
        Self {
            position: -0.5,
            velocity: 0.0,
            steps: 0,
            max_steps: 200,
            rng: StdRng::from_entropy(),
            report: Report::new(vec!["reward", "steps"]),
        }
    }

    /// Truncate episodes after `max_steps` steps
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Seed the generator behind the starting position
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Lower bounds of the state space
    pub fn low() -> [f32; 2] {
        [MIN_POSITION, -MAX_SPEED]
    }

    /// Upper bounds of the state space
    pub fn high() -> [f32; 2] {
        [MAX_POSITION, MAX_SPEED]
    }

    fn state(&self) -> [f32; 2] {
        [self.position, self.velocity]
    }
}

impl Default for MountainCar {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for MountainCar {
    type State = [f32; 2];
    type Action = MountainCarAction;

    fn step(&mut self, action: Self::Action) -> Step<Self::State> {
        let throttle = action as usize as f32 - 1.0;
        self.velocity += throttle * FORCE - GRAVITY * (3.0 * self.position).cos();
        self.velocity = self.velocity.clamp(-MAX_SPEED, MAX_SPEED);
        self.position += self.velocity;
        self.position = self.position.clamp(MIN_POSITION, MAX_POSITION);
        if self.position == MIN_POSITION && self.velocity < 0.0 {
            self.velocity = 0.0;
        }
        self.steps += 1;

        let terminated = self.position >= GOAL_POSITION;
        let reward = -1.0;

        self.report.entry("steps").and_modify(|x| *x += 1.0);
        self.report
            .entry("reward")
            .and_modify(|x| *x += reward as f64);

        Step {
            next_state: self.state(),
            reward,
            terminated,
            truncated: !terminated && self.steps >= self.max_steps,
        }
    }

    fn reset(&mut self) -> Self::State {
        self.position = Uniform::new(-0.6, -0.4).sample(&mut self.rng);
        self.velocity = 0.0;
        self.steps = 0;
        self.state()
    }
}

impl DiscreteActionSpace for MountainCar {
    fn num_actions(&self) -> usize {
        MountainCarAction::VARIANTS.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mountain_car_resets_in_valley() {
        let mut env = MountainCar::new().with_seed(1);
        for _ in 0..20 {
            let [position, velocity] = env.reset();
            assert!((-0.6..-0.4).contains(&position));
            assert_eq!(velocity, 0.0);
        }
    }

    #[test]
    fn mountain_car_respects_bounds() {
        let mut env = MountainCar::new().with_seed(2).with_max_steps(1000);
        env.reset();
        for _ in 0..300 {
            let step = env.step(MountainCarAction::Reverse);
            let [position, velocity] = step.next_state;
            assert!((MIN_POSITION..=MAX_POSITION).contains(&position));
            assert!((-MAX_SPEED..=MAX_SPEED).contains(&velocity));
            assert_eq!(step.reward, -1.0);
        }
    }

    #[test]
    fn mountain_car_cannot_drive_straight_up() {
        let mut env = MountainCar::new().with_seed(3);
        env.reset();
        let mut last = None;
        for _ in 0..200 {
            last = Some(env.step(MountainCarAction::Forward));
        }
        let last = last.unwrap();
        assert!(!last.terminated, "too weak to climb without momentum");
        assert!(last.truncated);
        assert_eq!(env.report["steps"], 200.0);
    }

    #[test]
    fn mountain_car_rocking_reaches_goal() {
        let mut env = MountainCar::new().with_seed(4).with_max_steps(1000);
        env.reset();
        let mut done = false;
        for _ in 0..1000 {
            // push in the direction of travel
            let action = if env.velocity < 0.0 {
                MountainCarAction::Reverse
            } else {
                MountainCarAction::Forward
            };
            if env.step(action).terminated {
                done = true;
                break;
            }
        }
        assert!(done);
        assert!(env.position >= GOAL_POSITION);
    }

    #[test]
    fn mountain_car_actions() {
        let env = MountainCar::new();
        assert_eq!(env.num_actions(), 3);
        assert_eq!(MountainCarAction::from(2), MountainCarAction::Forward);
        assert_eq!(usize::from(MountainCarAction::Reverse), 0);
    }
}
