use std::collections::BTreeMap;
use std::time::Instant;

use race_sim::{Autopilot, EnvAttributes, Environment, RaceEnv, SimError};

fn main() -> Result<(), SimError> {
    let mut env = RaceEnv::new(EnvAttributes::default())?;
    let pilot = Autopilot::default();

    println!("Simulating...");
    let num_episodes = 100;
    let mut steps: u32 = 0;
    let mut total_reward = 0.0;
    let mut ends = BTreeMap::new();

    let start = Instant::now();
    for episode in 0..num_episodes {
        env.reset(Some(episode));
        loop {
            let action = pilot.act(env.track(), env.episode().vehicle());
            let result = env.step(action)?;
            steps += 1;
            total_reward += result.reward;
            if result.done() {
                *ends.entry(format!("{:?}", result.info.end)).or_insert(0) += 1;
                break;
            }
        }
    }
    let elapsed = start.elapsed();

    println!(
        "{} episodes, {} steps: avg. step {:?} ({:.0} steps/s)",
        num_episodes,
        steps,
        elapsed / steps,
        steps as f64 / elapsed.as_secs_f64(),
    );
    println!("avg. reward {:.2}", total_reward / num_episodes as f64);
    for (end, count) in ends {
        println!("  {}: {}", end, count);
    }

    env.close();
    Ok(())
}
