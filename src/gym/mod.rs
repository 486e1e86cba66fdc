//! Ready-made environments
pub mod maze;
pub mod mountain_car;

pub use maze::{Cell, Maze, MazeAction, Slip};
pub use mountain_car::{MountainCar, MountainCarAction};
