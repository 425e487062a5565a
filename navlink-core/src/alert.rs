//! Camera alert normalization
//!
//! The upstream navigation SDK reports enforcement cameras with its own
//! small enumeration; the C3 wire schema uses a different, richer taxonomy
//! inherited from an earlier bridge protocol. This module maps between the
//! two.
//!
//! The mapping is lossy and best-effort: the upstream API exposes no
//! dedicated camera-speed or camera-distance fields, so the caller passes
//! the road speed limit and next-turn distance as approximations. Missing
//! data degrades to zero magnitudes, never to dropping the alert.

use crate::telemetry::{TelemetryRecord, NONE_SENTINEL};

/// Camera classification as reported by the upstream SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraType {
    /// Fixed-point speed check
    Speed,
    /// Violation (red-light / lane) camera
    Violation,
    /// Average-speed measurement over a section
    Interval,
}

impl CameraType {
    /// Classify an upstream camera code.
    ///
    /// `None` for codes <= 0. Unknown positive codes collapse to [`Speed`]
    /// rather than being dropped: an unrecognized camera is still a camera.
    ///
    /// [`Speed`]: CameraType::Speed
    pub fn from_code(code: i32) -> Option<CameraType> {
        match code {
            c if c <= 0 => None,
            2 => Some(CameraType::Violation),
            3 => Some(CameraType::Interval),
            _ => Some(CameraType::Speed),
        }
    }
}

/// Stable alert taxonomy used on the wire (`nSdiType` / `nSdiBlockType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdiKind {
    /// Point speed check
    Speed,
    /// Surveillance camera
    Monitor,
    /// Red-light camera
    RedLight,
    /// Violation capture
    Violation,
    /// Start of an average-speed section
    IntervalStart,
    /// End of an average-speed section
    IntervalEnd,
}

impl SdiKind {
    /// Wire code for this alert kind.
    pub fn code(&self) -> i32 {
        match self {
            SdiKind::Speed => 0,
            SdiKind::Monitor => 1,
            SdiKind::RedLight => 2,
            SdiKind::Violation => 3,
            SdiKind::IntervalStart => 5,
            SdiKind::IntervalEnd => 6,
        }
    }
}

/// Write the normalized alert fields of `record` from an upstream camera
/// report.
///
/// Exactly one of the two field groups ends up populated:
/// - code <= 0: both groups cleared (`-1` types, zero magnitudes);
/// - interval measurement: block group populated, point group cleared;
/// - any other positive code: point group populated, block group cleared
///   (fixed-speed and violation cameras collapse to the normalized
///   point-speed category).
///
/// `proxy_speed` and `proxy_dist` are the approximate alert magnitudes;
/// negative inputs clamp to zero.
pub fn normalize_camera(record: &mut TelemetryRecord, code: i32, proxy_speed: i32, proxy_dist: f64) {
    let speed = proxy_speed.max(0);
    let dist = if proxy_dist.is_finite() {
        proxy_dist.max(0.0)
    } else {
        0.0
    };

    match CameraType::from_code(code) {
        None => {
            record.sdi_type = NONE_SENTINEL;
            record.sdi_speed_limit = 0;
            record.sdi_dist = 0.0;
            record.sdi_block_type = NONE_SENTINEL;
            record.sdi_block_speed = 0;
            record.sdi_block_dist = 0.0;
        }
        Some(CameraType::Interval) => {
            record.sdi_block_type = SdiKind::IntervalStart.code();
            record.sdi_block_speed = speed;
            record.sdi_block_dist = dist;
            record.sdi_type = NONE_SENTINEL;
            record.sdi_speed_limit = 0;
            record.sdi_dist = 0.0;
        }
        Some(_) => {
            record.sdi_type = SdiKind::Speed.code();
            record.sdi_speed_limit = speed;
            record.sdi_dist = dist;
            record.sdi_block_type = NONE_SENTINEL;
            record.sdi_block_speed = 0;
            record.sdi_block_dist = 0.0;
        }
    }
}
