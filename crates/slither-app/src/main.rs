use anyhow::Result;
use slither_core::{PlayerInput, Point, SlitherConfig, World};
use slither_storage::HighScoreFile;
use tracing::{info, warn};

fn main() -> Result<()> {
    init_tracing();
    let mut world = bootstrap_world()?;
    run_session(&mut world);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn bootstrap_world() -> Result<World> {
    let config = SlitherConfig {
        history_capacity: 600,
        ..SlitherConfig::default()
    };
    let store = HighScoreFile::open("highscore.txt");
    let world = World::with_store(config, Box::new(store))?;
    info!(
        high_score = world.high_score(),
        bots = world.alive_bot_count(),
        food = world.food_count(),
        "Starting slither simulation shell"
    );
    Ok(world)
}

/// Drives the player on a slow circle around the map center for a couple of
/// simulated minutes; a real frontend replaces this with mouse input.
fn run_session(world: &mut World) {
    let width = world.config().world_width;
    let height = world.config().world_height;
    let ticks = 60 * 60 * 2;

    for i in 0..ticks {
        let phase = i as f32 * 0.002;
        let input = PlayerInput {
            target: Some(Point::new(
                width * 0.5 + phase.cos() * width * 0.3,
                height * 0.5 + phase.sin() * height * 0.3,
            )),
            boost: i % 240 < 30,
        };
        let events = world.step(input);

        if let Some(score) = events.new_high_score {
            info!(score, "player set a new high score");
        }
        if events.player_died {
            warn!(tick = events.tick.0, "player died; ending session");
            break;
        }
    }

    if let Some(summary) = world.history().last() {
        info!(
            tick = summary.tick.0,
            alive_bots = summary.alive_bots,
            food = summary.food_count,
            score = summary.player_score,
            "Session finished"
        );
    } else {
        warn!("Session finished without tick summaries");
    }
}
