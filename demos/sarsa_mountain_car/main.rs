use std::{error::Error, fs, path::Path};

use rl_sweep::{
    agent::Agent,
    algo::sarsa::{TileCodedSarsaAgent, TileCodedSarsaConfig},
    approx::TileCoderConfig,
    gym::MountainCar,
};

const NUM_EPISODES: u16 = 500;

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/sarsa_mountain_car");

    let mut env = MountainCar::new().with_max_steps(1000);
    let tiles = TileCoderConfig::uniform(
        MountainCar::low().to_vec(),
        MountainCar::high().to_vec(),
        8,
        8,
    );
    let config = TileCodedSarsaConfig {
        alpha: 0.5,
        ..TileCodedSarsaConfig::new(tiles)
    };
    let mut agent = TileCodedSarsaAgent::for_env(config, &env)?;

    fs::create_dir_all(path.join("out"))?;

    let mut wtr = csv::Writer::from_path(path.join("out/data.csv"))?;
    wtr.write_record(["episode", "steps"])?;

    for i in 0..NUM_EPISODES {
        agent.go(&mut env);
        let report = env.report.take();
        wtr.write_record(&[i.to_string(), report["steps"].to_string()])?;
    }

    wtr.flush()?;

    Ok(())
}
