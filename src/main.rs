//! Car Racer entry point
//!
//! Runs one headless episode. Usage: `car-racer [settings.json]`
//!
//! Without human mode every agent follows a radar-balancing policy. In human
//! mode each stdin line is one tick, keyed `a`/`d`/`w`/`1`/`2`/`3`.

use std::io::BufRead;
use std::path::Path;

use car_racer::sim::{Action, AgentState};
use car_racer::{Environment, Settings, SimError};

/// Episode cap in rounds (one round steps every agent once)
const MAX_ROUNDS: u64 = 5_000;

/// Flank clearance difference (pixels) below which the car holds its line
const BALANCE_DEADBAND: f32 = 8.0;

fn main() {
    env_logger::init();
    log::info!("Car Racer (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)).unwrap_or_else(|e| {
            log::warn!("Could not load settings from {}: {} (using defaults)", path, e);
            Settings::default()
        }),
        None => Settings::default(),
    };

    if let Err(e) = run(settings) {
        log::error!("Episode aborted: {}", e);
        std::process::exit(1);
    }
}

fn run(settings: Settings) -> Result<(), SimError> {
    let human = settings.human;
    let mut env = Environment::new(settings)?;
    env.reset()?;

    if human {
        drive_from_stdin(&mut env)?;
    } else {
        let mut rounds = 0;
        while rounds < MAX_ROUNDS && !env.all_terminated() {
            let actions: Vec<Action> = env.agents().iter().map(|c| balance(&c.state())).collect();
            env.step_all(&actions)?;
            rounds += 1;
        }
    }

    report(&env);
    env.close();
    Ok(())
}

fn drive_from_stdin(env: &mut Environment) -> Result<(), SimError> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let action = line.trim().chars().next().map_or(Action::Idle, Action::from_key);
        let result = env.step(0, action)?;
        log::info!(
            "tick {} reward {:.1} radar {:?}",
            result.info.tick,
            result.info.total_reward,
            result.observation
        );
        if result.terminated {
            break;
        }
    }
    Ok(())
}

/// Steer toward the flank with more clearance
fn balance(state: &AgentState<'_>) -> Action {
    let (Some(&left), Some(&right)) = (state.radar_distances.first(), state.radar_distances.last())
    else {
        return Action::Idle;
    };
    // First radar angle is the most negative offset, which steer-left turns toward
    if left - right > BALANCE_DEADBAND {
        Action::SteerLeft
    } else if right - left > BALANCE_DEADBAND {
        Action::SteerRight
    } else {
        Action::Idle
    }
}

fn report(env: &Environment) {
    log::info!("Episode finished after {} ticks", env.tick_count());
    for car in env.agents() {
        log::info!(
            "{}: reward {:.1}, progress {:.0}%, {}",
            car.id,
            car.reward,
            env.track().progress(car.position) * 100.0,
            car.death_cause
                .map_or("still driving".to_string(), |c| format!("died ({c:?})"))
        );
    }
}
