//! Gun Ballistics
//!
//! Gun and bullet definitions, shot classification, and the manager that
//! tracks per-shooter fire state.

pub mod gun;
pub mod shot;
pub mod manager;

pub use gun::{Appearance, Bullet, Gun, GunId, ProjectileKind};
pub use shot::{classify, ShotType};
pub use manager::{GunError, GunManager, HitReport, ReloadTicket, ShotReport};
