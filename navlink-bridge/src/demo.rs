//! Synthetic drive feed.
//!
//! Stands in for the navigation SDK when testing against a real display
//! without driving: a scripted loop of attached fixes goes through the real
//! normalization path at 1 Hz, so speed mapping, camera taxonomy and ETA
//! formatting all behave exactly as they would live.

use std::sync::Arc;
use std::time::Duration;

use navlink_core::{AttachedFix, RouteProgress};
use tokio::time::{interval, MissedTickBehavior};
use tokio_graceful_shutdown::SubsystemHandle;

use crate::bridge::BridgeState;
use crate::error::BridgeError;

/// Legs of the scripted route: road name, limit, turn icon at the end.
const LEGS: [(&str, i32, i32); 3] = [
    ("Jinke Rd", 80, 2),
    ("Middle Ring Rd", 100, 4),
    ("Century Ave", 60, 6),
];

/// Fixes per leg at one fix per second.
const LEG_STEPS: u64 = 40;

/// 1 Hz scripted fix generator.
pub struct DemoFeed {
    state: Arc<BridgeState>,
}

impl DemoFeed {
    pub fn new(state: Arc<BridgeState>) -> Self {
        DemoFeed { state }
    }

    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), BridgeError> {
        log::info!("Demo feed active: synthetic drive at 1 fix/s");
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut step: u64 = 0;

        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => {
                    log::debug!("Demo feed shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    self.state.apply_fix(&demo_fix(step));
                    step += 1;
                }
            }
        }

        Ok(())
    }
}

fn demo_fix(step: u64) -> AttachedFix {
    let leg = ((step / LEG_STEPS) % LEGS.len() as u64) as usize;
    let (road, limit, turn) = LEGS[leg];
    let along = step % LEG_STEPS;

    let total = (LEGS.len() as u64 * LEG_STEPS) as i32;
    let elapsed = (step % (LEGS.len() as u64 * LEG_STEPS)) as i32;

    AttachedFix {
        latitude: 31.2304 + step as f64 * 0.0001,
        longitude: 121.4737 + step as f64 * 0.00012,
        bearing: (40 * leg) as f32 + 45.0,
        road_name: road.to_string(),
        speed_limit: limit,
        // A speed check partway through each leg.
        camera_type: if (10..14).contains(&along) { 1 } else { 0 },
        next_turn_distance: (LEG_STEPS - along) as f64 * 25.0,
        turn_type: Some(turn),
        progress: Some(RouteProgress {
            distance_m: (total - elapsed) * 25,
            time_s: (total - elapsed) * 2,
        }),
        ..Default::default()
    }
}
