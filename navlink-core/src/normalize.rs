//! Upstream callback normalization
//!
//! The navigation SDK delivers attached-location callbacks in its own
//! vocabulary. [`AttachedFix`] models that payload, and [`apply_fix`] folds
//! one callback into the previous [`TelemetryRecord`] snapshot, producing the
//! next snapshot for the owner to swap in wholesale.
//!
//! Normalization never fails: absent upstream data leaves the corresponding
//! record fields at their previous value or sentinel, out-of-range numbers
//! are clamped.

use chrono::{DateTime, TimeZone};

use crate::alert::normalize_camera;
use crate::eta::format_eta;
use crate::speed::SpeedMapper;
use crate::telemetry::TelemetryRecord;

/// Route progress from a route-update callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteProgress {
    /// Remaining distance to destination in meters.
    pub distance_m: i32,
    /// Remaining travel time in seconds.
    pub time_s: i32,
}

/// Traffic light ahead, when the upstream source delivers one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLight {
    /// 0 = none, 1 = red, 2 = green, 3 = yellow.
    pub state: i32,
    pub distance_m: i32,
    pub countdown_s: i32,
}

/// Service area / toll gate ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceArea {
    pub name: String,
    pub distance_m: i32,
    pub kind: i32,
}

/// Congestion stretch lengths ahead on the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Congestion {
    pub slow_m: i32,
    pub jam_m: i32,
    pub blocked_m: i32,
}

/// Preview of the maneuver after the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPreview {
    pub icon: i32,
    pub road_name: String,
}

/// One attached-location callback from the upstream SDK.
///
/// The mandatory fields are what every callback carries; the optional groups
/// arrive only from richer callbacks (route updates, traffic service) and
/// leave the record untouched when absent. There are no dedicated camera
/// magnitude fields upstream - `speed_limit` and `next_turn_distance` double
/// as the alert's approximate speed and distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachedFix {
    /// Road-matched latitude in degrees.
    pub latitude: f64,
    /// Road-matched longitude in degrees.
    pub longitude: f64,
    /// Heading in degrees.
    pub bearing: f32,
    /// Current road name; empty keeps the previously known name.
    pub road_name: String,
    /// Road category code, when delivered.
    pub road_category: Option<i32>,
    /// Road speed limit in km/h; <= 0 means unknown.
    pub speed_limit: i32,
    /// Raw upstream camera code (see [`crate::alert::CameraType`]).
    pub camera_type: i32,
    /// Distance to the next maneuver in meters.
    pub next_turn_distance: f64,
    /// Turn icon code, when delivered.
    pub turn_type: Option<i32>,
    /// Destination distance/time from a route update.
    pub progress: Option<RouteProgress>,
    pub traffic_light: Option<TrafficLight>,
    pub service_area: Option<ServiceArea>,
    pub next_service_area: Option<ServiceArea>,
    pub congestion: Option<Congestion>,
    pub next_turn_preview: Option<TurnPreview>,
}

/// Fold one upstream callback into the previous snapshot.
///
/// The speed override table is consulted exactly here, at the point the
/// limit lands on the record, so every downstream consumer (and the wire)
/// sees the displayed value. `now` anchors the ETA text.
pub fn apply_fix<Tz: TimeZone>(
    prev: &TelemetryRecord,
    fix: &AttachedFix,
    speeds: &SpeedMapper,
    now: DateTime<Tz>,
) -> TelemetryRecord
where
    Tz::Offset: std::fmt::Display,
{
    let mut record = prev.clone();

    record.latitude = fix.latitude;
    record.longitude = fix.longitude;
    record.heading = fix.bearing;

    if !fix.road_name.is_empty() {
        record.road_name = fix.road_name.clone();
    }
    if let Some(category) = fix.road_category {
        record.road_category = category;
    }

    // The raw observation is recorded for introspection even when rejected.
    let shown = speeds.apply(fix.speed_limit);
    record.road_limit_speed = shown.max(0);

    record.turn_distance = if fix.next_turn_distance.is_finite() {
        fix.next_turn_distance.max(0.0)
    } else {
        0.0
    };
    if let Some(turn_type) = fix.turn_type {
        record.turn_type = turn_type;
    }

    // Camera magnitudes are approximated from the unmapped road limit and
    // the turn distance - the upstream API has nothing better.
    normalize_camera(
        &mut record,
        fix.camera_type,
        fix.speed_limit,
        fix.next_turn_distance,
    );

    if let Some(progress) = fix.progress {
        record.dest_distance = progress.distance_m.max(0);
        record.dest_time = progress.time_s.max(0);
    }
    if record.dest_time > 0 {
        record.eta_text = format_eta(record.dest_time, now);
    }

    if let Some(light) = fix.traffic_light {
        record.traffic_light = light.state;
        record.traffic_light_dist = light.distance_m.max(0);
        record.traffic_light_sec = light.countdown_s.max(0);
    }
    if let Some(sapa) = &fix.service_area {
        record.sapa_name = sapa.name.clone();
        record.sapa_dist = sapa.distance_m;
        record.sapa_type = sapa.kind;
    }
    if let Some(sapa) = &fix.next_service_area {
        record.next_sapa_name = sapa.name.clone();
        record.next_sapa_dist = sapa.distance_m;
        record.next_sapa_type = sapa.kind;
    }
    if let Some(tmc) = fix.congestion {
        record.tmc_slow_dist = tmc.slow_m.max(0);
        record.tmc_jam_dist = tmc.jam_m.max(0);
        record.tmc_block_dist = tmc.blocked_m.max(0);
    }
    if let Some(preview) = &fix.next_turn_preview {
        record.next_next_turn_icon = preview.icon;
        record.next_next_road_name = preview.road_name.clone();
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::SdiKind;
    use crate::telemetry::NONE_SENTINEL;
    use chrono::Utc;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_speed_mapping_applied_on_record() {
        let speeds = SpeedMapper::new();
        speeds.set_mapping(120, 110);

        let fix = AttachedFix {
            speed_limit: 120,
            ..Default::default()
        };
        let record = apply_fix(&TelemetryRecord::default(), &fix, &speeds, noon());

        // Mapping happens when the limit is set on the record, not at send
        // time: the snapshot already carries the displayed value.
        assert_eq!(record.road_limit_speed, 110);
        assert_eq!(speeds.last_original_speed(), 120);
    }

    #[test]
    fn test_unknown_limit_writes_zero_but_is_recorded() {
        let speeds = SpeedMapper::new();
        let fix = AttachedFix {
            speed_limit: -1,
            ..Default::default()
        };
        let record = apply_fix(&TelemetryRecord::default(), &fix, &speeds, noon());
        assert_eq!(record.road_limit_speed, 0);
        assert_eq!(speeds.last_original_speed(), -1);
    }

    #[test]
    fn test_empty_road_name_keeps_previous() {
        let speeds = SpeedMapper::new();
        let mut prev = TelemetryRecord::default();
        prev.road_name = "Ring Rd".to_string();

        let fix = AttachedFix::default();
        let record = apply_fix(&prev, &fix, &speeds, noon());
        assert_eq!(record.road_name, "Ring Rd");

        let fix = AttachedFix {
            road_name: "Main St".to_string(),
            ..Default::default()
        };
        let record = apply_fix(&record, &fix, &speeds, noon());
        assert_eq!(record.road_name, "Main St");
    }

    #[test]
    fn test_camera_uses_proxy_magnitudes() {
        let speeds = SpeedMapper::new();
        speeds.set_mapping(100, 90);

        let fix = AttachedFix {
            speed_limit: 100,
            camera_type: 1,
            next_turn_distance: 340.0,
            ..Default::default()
        };
        let record = apply_fix(&TelemetryRecord::default(), &fix, &speeds, noon());

        // Alert magnitudes come from the raw upstream values; the displayed
        // road limit is the mapped one.
        assert_eq!(record.road_limit_speed, 90);
        assert_eq!(record.sdi_type, SdiKind::Speed.code());
        assert_eq!(record.sdi_speed_limit, 100);
        assert_eq!(record.sdi_dist, 340.0);
        assert_eq!(record.sdi_block_type, NONE_SENTINEL);
    }

    #[test]
    fn test_progress_sets_eta_text() {
        let speeds = SpeedMapper::new();
        let fix = AttachedFix {
            progress: Some(RouteProgress {
                distance_m: 9000,
                time_s: 600,
            }),
            ..Default::default()
        };
        let record = apply_fix(&TelemetryRecord::default(), &fix, &speeds, noon());
        assert_eq!(record.dest_distance, 9000);
        assert_eq!(record.dest_time, 600);
        assert_eq!(record.eta_text, "ETA 12:10 (10 min)");
    }

    #[test]
    fn test_negative_distances_clamped() {
        let speeds = SpeedMapper::new();
        let fix = AttachedFix {
            next_turn_distance: -12.5,
            progress: Some(RouteProgress {
                distance_m: -3,
                time_s: -60,
            }),
            ..Default::default()
        };
        let record = apply_fix(&TelemetryRecord::default(), &fix, &speeds, noon());
        assert_eq!(record.turn_distance, 0.0);
        assert_eq!(record.dest_distance, 0);
        assert_eq!(record.dest_time, 0);
    }

    #[test]
    fn test_ancillary_groups_applied_when_present() {
        let speeds = SpeedMapper::new();
        let fix = AttachedFix {
            traffic_light: Some(TrafficLight {
                state: 1,
                distance_m: 80,
                countdown_s: 12,
            }),
            service_area: Some(ServiceArea {
                name: "Lakeview".to_string(),
                distance_m: 5400,
                kind: 0,
            }),
            congestion: Some(Congestion {
                slow_m: 300,
                jam_m: 120,
                blocked_m: 0,
            }),
            next_turn_preview: Some(TurnPreview {
                icon: 4,
                road_name: "Exit 12".to_string(),
            }),
            ..Default::default()
        };
        let record = apply_fix(&TelemetryRecord::default(), &fix, &speeds, noon());
        assert_eq!(record.traffic_light, 1);
        assert_eq!(record.traffic_light_dist, 80);
        assert_eq!(record.traffic_light_sec, 12);
        assert_eq!(record.sapa_name, "Lakeview");
        assert_eq!(record.sapa_dist, 5400);
        assert_eq!(record.tmc_slow_dist, 300);
        assert_eq!(record.tmc_jam_dist, 120);
        assert_eq!(record.next_next_turn_icon, 4);
        assert_eq!(record.next_next_road_name, "Exit 12");

        // Next service area untouched: still at sentinel defaults.
        assert_eq!(record.next_sapa_dist, NONE_SENTINEL);
    }
}
