//! Telemetry wire model
//!
//! [`TelemetryRecord`] is the canonical snapshot of navigation state that the
//! bridge sends to the C3 display. The JSON field names are a contract with
//! the device firmware and must stay byte-for-byte stable; every field below
//! carries an explicit serde rename because the wire schema predates this
//! implementation and its naming is irregular.
//!
//! A record is always replaced wholesale: the normalization layer builds a
//! new snapshot from the previous one and the owner swaps it in under a
//! single write. Nothing ever mutates a shared record field-by-field.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Sentinel for "no alert of this kind" in the `nSdiType`/`nSdiBlockType`
/// and `sapaType`/`sapaDist` fields.
pub const NONE_SENTINEL: i32 = -1;

/// One complete navigation snapshot in wire layout.
///
/// Numeric distance/time fields are non-negative; `0` or `-1` (documented per
/// field) means "not applicable", never a real zero-distance reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryRecord {
    /// Displayed road speed limit in km/h, 0 = unknown. The speed override
    /// table has already been applied when this is set.
    #[serde(rename = "nRoadLimitSpeed")]
    pub road_limit_speed: i32,

    /// Point alert taxonomy code ([`crate::alert::SdiKind`]), -1 = none.
    #[serde(rename = "nSdiType")]
    pub sdi_type: i32,
    /// Speed limit enforced by the point alert, km/h.
    #[serde(rename = "nSdiSpeedLimit")]
    pub sdi_speed_limit: i32,
    /// Distance to the point alert in meters.
    #[serde(rename = "nSdiDist")]
    pub sdi_dist: f64,
    /// Section (average-speed) alert taxonomy code, -1 = none. Mutually
    /// exclusive with the point fields: one physical detection maps to one
    /// classification per update.
    #[serde(rename = "nSdiBlockType")]
    pub sdi_block_type: i32,
    /// Speed limit enforced over the section, km/h.
    #[serde(rename = "nSdiBlockSpeed")]
    pub sdi_block_speed: i32,
    /// Distance to the section alert in meters.
    #[serde(rename = "nSdiBlockDist")]
    pub sdi_block_dist: f64,

    /// Latitude in degrees, road-matched.
    #[serde(rename = "vpPosPointLat")]
    pub latitude: f64,
    /// Longitude in degrees, road-matched.
    #[serde(rename = "vpPosPointLon")]
    pub longitude: f64,
    /// Heading in degrees.
    #[serde(rename = "nPosAngle")]
    pub heading: f32,

    /// Current road name, empty = unknown.
    #[serde(rename = "szPosRoadName")]
    pub road_name: String,
    /// Road category code.
    #[serde(rename = "roadcate")]
    pub road_category: i32,

    /// Distance to the next turn in meters.
    #[serde(rename = "nTBTDist")]
    pub turn_distance: f64,
    /// Turn icon code for the next maneuver.
    #[serde(rename = "nTBTTurnType")]
    pub turn_type: i32,

    /// Remaining distance to destination in meters.
    #[serde(rename = "nGoPosDist")]
    pub dest_distance: i32,
    /// Remaining time to destination in seconds.
    #[serde(rename = "nGoPosTime")]
    pub dest_time: i32,

    /// Traffic light state: 0 = none, 1 = red, 2 = green, 3 = yellow.
    #[serde(rename = "nTrafficLight")]
    pub traffic_light: i32,
    /// Distance to the traffic light in meters.
    #[serde(rename = "nTrafficLightDist")]
    pub traffic_light_dist: i32,
    /// Traffic light countdown in seconds.
    #[serde(rename = "nTrafficLightSec")]
    pub traffic_light_sec: i32,

    /// Upcoming service area name, empty = none.
    #[serde(rename = "sapaName")]
    pub sapa_name: String,
    /// Distance to the service area in meters, -1 = none.
    #[serde(rename = "sapaDist")]
    pub sapa_dist: i32,
    /// Service area type code, -1 = none.
    #[serde(rename = "sapaType")]
    pub sapa_type: i32,
    /// Service area after the upcoming one.
    #[serde(rename = "nextSapaName")]
    pub next_sapa_name: String,
    #[serde(rename = "nextSapaDist")]
    pub next_sapa_dist: i32,
    #[serde(rename = "nextSapaType")]
    pub next_sapa_type: i32,

    /// Free-text estimated arrival, e.g. "ETA 18:35 (1 h 5 min)".
    #[serde(rename = "etaText")]
    pub eta_text: String,

    /// Meters of slow traffic ahead.
    #[serde(rename = "tmcSlowDist")]
    pub tmc_slow_dist: i32,
    /// Meters of jammed traffic ahead.
    #[serde(rename = "tmcJamDist")]
    pub tmc_jam_dist: i32,
    /// Meters of blocked road ahead.
    #[serde(rename = "tmcBlockDist")]
    pub tmc_block_dist: i32,

    /// Icon code for the turn after the next one.
    #[serde(rename = "nextNextTurnIcon")]
    pub next_next_turn_icon: i32,
    /// Road name after the next turn.
    #[serde(rename = "nextNextRoadName")]
    pub next_next_road_name: String,
}

impl Default for TelemetryRecord {
    fn default() -> Self {
        TelemetryRecord {
            road_limit_speed: 0,
            sdi_type: NONE_SENTINEL,
            sdi_speed_limit: 0,
            sdi_dist: 0.0,
            sdi_block_type: NONE_SENTINEL,
            sdi_block_speed: 0,
            sdi_block_dist: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            heading: 0.0,
            road_name: String::new(),
            road_category: 0,
            turn_distance: 0.0,
            turn_type: 0,
            dest_distance: 0,
            dest_time: 0,
            traffic_light: 0,
            traffic_light_dist: 0,
            traffic_light_sec: 0,
            sapa_name: String::new(),
            sapa_dist: NONE_SENTINEL,
            sapa_type: NONE_SENTINEL,
            next_sapa_name: String::new(),
            next_sapa_dist: NONE_SENTINEL,
            next_sapa_type: NONE_SENTINEL,
            eta_text: String::new(),
            tmc_slow_dist: 0,
            tmc_jam_dist: 0,
            tmc_block_dist: 0,
            next_next_turn_icon: 0,
            next_next_road_name: String::new(),
        }
    }
}

impl TelemetryRecord {
    /// Create an all-default record (everything unknown / not applicable).
    pub fn new() -> Self {
        TelemetryRecord::default()
    }

    /// Serialize to the UTF-8 JSON datagram payload.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Clear the destination fields, as happens on arrival.
    pub fn mark_arrived(&mut self) {
        self.dest_distance = 0;
        self.dest_time = 0;
    }
}
