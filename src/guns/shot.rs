//! Shot Classification
//!
//! Where a projectile landed relative to the target's feet decides the
//! shot type. Bands are checked in order and the first match wins, so the
//! knee band shadows the lower part of the leg band.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::vec3::Vec3;

/// Landing height above which a hit is a head shot.
const HEAD_MIN_Y: f64 = 1.5;

/// Knee band, exclusive on both ends.
const KNEE_Y: (f64, f64) = (0.25, 0.75);

/// Leg band, exclusive on both ends.
const LEG_Y: (f64, f64) = (0.1, 1.0);

/// Landing height at or below which a hit is a foot shot.
const FOOT_MAX_Y: f64 = 0.1;

/// Horizontal offset beyond which (on both X and Z) a hit is an arm shot.
const ARM_MIN_XZ: f64 = 1.0;

/// Body part a projectile landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotType {
    /// Above the shoulders
    HeadShot,
    /// Torso, the fallback
    BodyShot,
    /// Far out on both horizontal axes
    ArmShot,
    /// Leg band
    LegShot,
    /// Knee band
    KneeShot,
    /// At ground level
    FootShot,
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShotType::HeadShot => "head",
            ShotType::BodyShot => "body",
            ShotType::ArmShot => "arm",
            ShotType::LegShot => "leg",
            ShotType::KneeShot => "knee",
            ShotType::FootShot => "foot",
        };
        f.write_str(name)
    }
}

/// Classify a landing point against the target's position.
///
/// The arm check runs before the foot check: a hit far out on both
/// horizontal axes at foot height is an arm shot.
pub fn classify(land: Vec3, target: Vec3) -> ShotType {
    let offset = land - target;

    if offset.y > HEAD_MIN_Y {
        return ShotType::HeadShot;
    }

    if offset.y > KNEE_Y.0 && offset.y < KNEE_Y.1 {
        return ShotType::KneeShot;
    }

    if offset.y > LEG_Y.0 && offset.y < LEG_Y.1 {
        return ShotType::LegShot;
    }

    let outer_arm = offset.x > ARM_MIN_XZ && offset.z > ARM_MIN_XZ;
    let inner_arm = offset.x < -ARM_MIN_XZ && offset.z < -ARM_MIN_XZ;
    if outer_arm || inner_arm {
        return ShotType::ArmShot;
    }

    if offset.y <= FOOT_MAX_Y {
        return ShotType::FootShot;
    }

    ShotType::BodyShot
}
