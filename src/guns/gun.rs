//! Gun Definitions
//!
//! Static stats of guns and their bullets. Per-shooter state (magazine,
//! last shot, reloads) lives in [`crate::guns::manager::GunManager`].

use std::fmt;
use serde::{Serialize, Deserialize};

/// Milliseconds in one minute, used to turn rounds-per-minute into an interval.
const MS_PER_MINUTE: u64 = 60_000;

/// Handle of a gun registered in a [`crate::guns::manager::GunManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GunId(pub u32);

impl fmt::Display for GunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gun#{}", self.0)
    }
}

/// Entity spawned for each bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProjectileKind {
    /// Arrow (affected by gravity)
    #[default]
    Arrow,
    /// Snowball
    Snowball,
    /// Egg
    Egg,
    /// Small fireball
    Fireball,
}

/// Item a gun is displayed as.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    /// Item material name
    pub material: String,
    /// Stack size
    pub amount: u32,
    /// Damage value / variant
    pub durability: u16,
}

impl Appearance {
    /// Single item of a material.
    pub fn of(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            amount: 1,
            durability: 0,
        }
    }
}

/// Projectile stats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Name tag attached to every spawned projectile
    pub name: String,
    /// Entity kind spawned
    pub projectile: ProjectileKind,
    /// Knockback applied on hit
    pub knockback: f64,
    /// Lower damage bound
    pub min_damage: f64,
    /// Upper damage bound
    pub max_damage: f64,
}

/// A gun type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gun {
    /// Display name
    pub name: String,
    /// Held item
    pub appearance: Appearance,
    /// Rounds per minute; 0 disables the rate limit
    pub fire_rate: u32,
    /// Time before a reload restores the magazine (ms)
    pub reload_time_ms: u64,
    /// Projectile speed leaving the muzzle
    pub muzzle_velocity: f64,
    /// Per-axis spread radius added to the aim direction
    pub accuracy: f64,
    /// Factor applied to the shooter's pitch after each shot
    pub recoil: f64,
    /// Rounds per magazine
    pub magazine_size: u32,
    /// Projectiles spawned per shot
    pub bullets_per_shot: u32,
    /// Projectile stats
    pub bullet: Bullet,
}

impl Gun {
    /// Minimum time between two shots (ms).
    pub fn min_shot_interval_ms(&self) -> u64 {
        if self.fire_rate == 0 {
            return 0;
        }
        MS_PER_MINUTE / u64::from(self.fire_rate)
    }
}

impl fmt::Display for Gun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} rpm, mag {}, {}x{}, reload {}ms, dmg {}-{})",
            self.name,
            self.fire_rate,
            self.magazine_size,
            self.bullets_per_shot,
            self.bullet.name,
            self.reload_time_ms,
            self.bullet.min_damage,
            self.bullet.max_damage,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Ten-round rifle used across gun tests.
    pub(crate) fn rifle() -> Gun {
        Gun {
            name: "Rifle".to_string(),
            appearance: Appearance::of("IRON_HOE"),
            fire_rate: 600,
            reload_time_ms: 2_000,
            muzzle_velocity: 3.0,
            accuracy: 0.05,
            recoil: 0.9,
            magazine_size: 10,
            bullets_per_shot: 1,
            bullet: Bullet {
                name: "rifle_round".to_string(),
                projectile: ProjectileKind::Arrow,
                knockback: 0.5,
                min_damage: 4.0,
                max_damage: 6.0,
            },
        }
    }

    #[test]
    fn test_shot_interval() {
        let mut gun = rifle();
        assert_eq!(gun.min_shot_interval_ms(), 100);

        gun.fire_rate = 60;
        assert_eq!(gun.min_shot_interval_ms(), 1_000);

        gun.fire_rate = 0;
        assert_eq!(gun.min_shot_interval_ms(), 0);
    }

    #[test]
    fn test_display() {
        let text = rifle().to_string();
        assert!(text.starts_with("Rifle (600 rpm, mag 10"));
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "name": "Shotgun",
            "appearance": { "material": "STONE_HOE", "amount": 1, "durability": 0 },
            "fire_rate": 60,
            "reload_time_ms": 3000,
            "muzzle_velocity": 2.0,
            "accuracy": 0.2,
            "recoil": 0.8,
            "magazine_size": 6,
            "bullets_per_shot": 5,
            "bullet": {
                "name": "pellet",
                "projectile": "Snowball",
                "knockback": 0.2,
                "min_damage": 1.0,
                "max_damage": 2.0
            }
        }"#;
        let gun: Gun = serde_json::from_str(json).unwrap();
        assert_eq!(gun.bullets_per_shot, 5);
        assert_eq!(gun.bullet.projectile, ProjectileKind::Snowball);
    }
}
