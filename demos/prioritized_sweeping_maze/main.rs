use std::{error::Error, fs, path::Path};

use rl_sweep::{
    agent::Agent,
    algo::planning::{PlannerConfig, PrioritizedSweepingAgent, PrioritizedSweepingAgentConfig},
    decay,
    env::{DiscreteActionSpace, Environment},
    exploration::EpsilonGreedy,
    gym::{Maze, Slip},
    persist,
};

const NUM_EPISODES: u16 = 300;

const LAYOUT: &str = "
    .........G
    .#####.#..
    .#...#.#X.
    .#.#.#.##.
    ...#...#..
    S#...#....
";

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/prioritized_sweeping_maze");

    let mut env = Maze::parse(LAYOUT)?
        .with_slip(Slip {
            left: 0.05,
            right: 0.05,
            backward: 0.0,
        })?
        .with_max_steps(1000);

    let config = PrioritizedSweepingAgentConfig {
        planner: PlannerConfig {
            alpha: 0.5,
            gamma: 0.95,
            theta: 1e-4,
            n_planning: 10,
        },
        exploration: EpsilonGreedy::new(decay::Exponential::new(0.02, 0.5, 0.01)?),
        seed: None,
    };
    let mut agent = PrioritizedSweepingAgent::for_env(config, &env);

    // random walk baseline
    let mut rng = rand::thread_rng();
    env.reset();
    while !env.step(env.random_action(&mut rng)).is_done() {}
    let baseline = env.report.take();
    println!(
        "random policy: steps={} reward={}",
        baseline["steps"], baseline["reward"]
    );

    fs::create_dir_all(path.join("out"))?;

    let mut wtr = csv::Writer::from_path(path.join("out/data.csv"))?;
    wtr.write_record(["episode", "steps", "reward"])?;

    for i in 0..NUM_EPISODES {
        agent.go(&mut env);
        let report = env.report.take();
        wtr.write_record(&[
            i.to_string(),
            report["steps"].to_string(),
            report["reward"].to_string(),
        ])?;
    }

    wtr.flush()?;

    persist::save(agent.q_table(), fs::File::create(path.join("out/q_table.json"))?)?;

    Ok(())
}
