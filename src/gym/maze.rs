use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    SeedableRng,
};
use strum::{FromRepr, VariantArray};

use crate::{
    env::{DiscreteActionSpace, DiscreteStateSpace, Environment, Report, Step},
    error::{Error, Result},
};

/// A cell of the maze grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Empty,
    Wall,
    /// Ends the episode on entry, paying the given reward
    Terminal(f32),
}

/// Moves in the maze, in clockwise order starting from up
#[derive(FromRepr, VariantArray, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MazeAction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl From<usize> for MazeAction {
    fn from(value: usize) -> Self {
        Self::from_repr(value).expect("MazeAction::from is only called with valid values [0, 3]")
    }
}

impl From<MazeAction> for usize {
    fn from(value: MazeAction) -> Self {
        value as usize
    }
}

impl MazeAction {
    /// Rotate clockwise by `quarter_turns`
    fn turn(self, quarter_turns: usize) -> Self {
        Self::from((self as usize + quarter_turns) % 4)
    }
}

/// Probabilities of the agent slipping sideways or backward instead of moving as intended
///
/// Whatever probability remains goes to the intended direction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Slip {
    pub left: f32,
    pub right: f32,
    pub backward: f32,
}

impl Slip {
    fn forward(&self) -> f32 {
        1.0 - self.left - self.right - self.backward
    }

    fn is_deterministic(&self) -> bool {
        self.left == 0.0 && self.right == 0.0 && self.backward == 0.0
    }
}

/// A gridworld maze with walls, terminal cells and an optional slippery floor
///
/// States are the flattened cell indices `row * width + col`. Moving into a wall or off the
/// grid leaves the agent where it is. Every non-terminal step costs a small step reward, and
/// entering a terminal cell pays that cell's reward and ends the episode. With the default
/// [`Slip`] the maze is deterministic.
pub struct Maze {
    cells: Vec<Cell>,
    width: usize,
    start: usize,
    pos: usize,
    step_reward: f32,
    slip: Slip,
    slip_dist: Option<WeightedIndex<f32>>,
    max_steps: usize,
    steps: usize,
    rng: StdRng,
    pub report: Report,
}

impl Maze {
    /// Build a maze from rows of cells and a start position `(row, col)`
    pub fn new(rows: Vec<Vec<Cell>>, start: (usize, usize)) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(Error::InvalidLayout {
                message: "maze has no cells".into(),
            });
        }
        if let Some(row) = rows.iter().position(|r| r.len() != width) {
            return Err(Error::InvalidLayout {
                message: format!("row {row} has {} cells, expected {width}", rows[row].len()),
            });
        }
        if start.0 >= rows.len() || start.1 >= width {
            return Err(Error::InvalidLayout {
                message: format!("start {start:?} is outside the grid"),
            });
        }
        if rows[start.0][start.1] != Cell::Empty {
            return Err(Error::InvalidLayout {
                message: format!("start {start:?} must be an empty cell"),
            });
        }

        let start = start.0 * width + start.1;
        Ok(Self {
            cells: rows.into_iter().flatten().collect(),
            width,
            start,
            pos: start,
            step_reward: -0.01,
            slip: Slip::default(),
            slip_dist: None,
            max_steps: 10_000,
            steps: 0,
            rng: StdRng::from_entropy(),
            report: Report::new(vec!["reward", "steps"]),
        })
    }

    /// Parse an ASCII layout, one row per line
    ///
    /// `.` is an empty cell, `#` a wall, `S` the (empty) start cell, `G` a goal paying `+1`
    /// and `X` a pit paying `-1`. Surrounding whitespace on each line is ignored.
    pub fn parse(layout: &str) -> Result<Self> {
        let mut start = None;
        let mut rows = Vec::new();
        for (r, line) in layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
        {
            let row = line
                .chars()
                .enumerate()
                .map(|(c, ch)| match ch {
                    '.' => Ok(Cell::Empty),
                    '#' => Ok(Cell::Wall),
                    'G' => Ok(Cell::Terminal(1.0)),
                    'X' => Ok(Cell::Terminal(-1.0)),
                    'S' => {
                        start = Some((r, c));
                        Ok(Cell::Empty)
                    }
                    other => Err(Error::InvalidLayout {
                        message: format!("unknown cell '{other}' at row {r}, column {c}"),
                    }),
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }

        let start = start.ok_or_else(|| Error::InvalidLayout {
            message: "layout has no start cell 'S'".into(),
        })?;
        Self::new(rows, start)
    }

    /// Set the reward paid for every step that does not end the episode
    pub fn with_step_reward(mut self, step_reward: f32) -> Self {
        self.step_reward = step_reward;
        self
    }

    /// Make the floor slippery
    pub fn with_slip(mut self, slip: Slip) -> Result<Self> {
        let probs = [slip.forward(), slip.right, slip.backward, slip.left];
        if probs.iter().any(|&p| !(0.0..=1.0).contains(&p)) {
            return Err(Error::InvalidConfiguration {
                message: format!("slip probabilities {slip:?} do not form a distribution"),
            });
        }
        self.slip_dist = if slip.is_deterministic() {
            None
        } else {
            Some(WeightedIndex::new(probs).map_err(|e| Error::InvalidConfiguration {
                message: format!("slip probabilities {slip:?}: {e}"),
            })?)
        };
        self.slip = slip;
        Ok(self)
    }

    /// Truncate episodes after `max_steps` steps
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Seed the generator behind slipping
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.cells.len() / self.width
    }

    pub fn slip(&self) -> Slip {
        self.slip
    }

    /// The cell at a flattened state index
    pub fn cell(&self, state: usize) -> Cell {
        self.cells[state]
    }

    /// Cell reached by moving one step in `action`'s direction from `state`
    fn neighbor(&self, state: usize, action: MazeAction) -> usize {
        let (row, col) = (state / self.width, state % self.width);
        let target = match action {
            MazeAction::Up if row > 0 => Some(state - self.width),
            MazeAction::Right if col + 1 < self.width => Some(state + 1),
            MazeAction::Down if row + 1 < self.height() => Some(state + self.width),
            MazeAction::Left if col > 0 => Some(state - 1),
            _ => None,
        };
        match target {
            Some(next) if self.cells[next] != Cell::Wall => next,
            _ => state,
        }
    }
}

impl Environment for Maze {
    type State = usize;
    type Action = MazeAction;

    fn step(&mut self, action: Self::Action) -> Step<Self::State> {
        let action = match &self.slip_dist {
            Some(dist) => action.turn(dist.sample(&mut self.rng)),
            None => action,
        };

        self.pos = self.neighbor(self.pos, action);
        self.steps += 1;

        let (reward, terminated) = match self.cells[self.pos] {
            Cell::Terminal(reward) => (reward, true),
            _ => (self.step_reward, false),
        };

        self.report.entry("steps").and_modify(|x| *x += 1.0);
        self.report
            .entry("reward")
            .and_modify(|x| *x += reward as f64);

        Step {
            next_state: self.pos,
            reward,
            terminated,
            truncated: !terminated && self.steps >= self.max_steps,
        }
    }

    fn reset(&mut self) -> Self::State {
        self.pos = self.start;
        self.steps = 0;
        self.pos
    }
}

impl DiscreteStateSpace for Maze {
    fn num_states(&self) -> usize {
        self.cells.len()
    }
}

impl DiscreteActionSpace for Maze {
    fn num_actions(&self) -> usize {
        MazeAction::VARIANTS.len()
    }
}
