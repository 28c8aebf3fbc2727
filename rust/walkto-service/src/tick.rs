use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::simulation::Simulation;

/// Drives the simulation at a fixed rate. Late ticks are skipped rather than
/// replayed in a burst.
pub fn spawn_tick_loop(sim: Arc<Mutex<Simulation>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let report = match sim.lock() {
                Ok(mut s) => s.tick(),
                Err(_) => {
                    error!("simulation lock poisoned; stopping tick loop");
                    break;
                }
            };
            if report.collision_changes > 0 || report.tasks_finished > 0 {
                debug!(
                    tick = report.tick,
                    collision_changes = report.collision_changes,
                    tasks_finished = report.tasks_finished,
                    entities_moved = report.entities_moved,
                    "tick"
                );
            }
        }
    })
}
