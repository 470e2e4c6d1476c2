//! Gun Manager
//!
//! Owns the gun registry and every per-shooter record: last shot time,
//! tracked magazine, in-flight projectiles and scheduled reloads.
//!
//! Time is passed in by the caller as milliseconds on a monotonic clock.
//! Nothing here sleeps. A reload restoration is queued and applied by
//! whichever comes first: the shooter's next `shoot` at or after the due
//! time, or [`GunManager::poll_reloads`] from the tick driver.

use std::collections::BTreeMap;
use tracing::{debug, error, info};

use crate::core::rng::DeterministicRng;
use crate::core::vec3::Vec3;
use crate::game::events::{EventBus, EventData};
use crate::host::{EntityHost, EntityId, ProjectileId};

use super::gun::{Gun, GunId};
use super::shot::{classify, ShotType};

/// Why a gun action did not happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GunError {
    /// No gun registered under this id.
    #[error("Unknown gun: {0}")]
    UnknownGun(GunId),

    /// Fired inside the rate-limit interval.
    #[error("Fired again before the fire-rate interval elapsed")]
    RateLimited,

    /// Tracked magazine is empty.
    #[error("Magazine is empty")]
    MagazineEmpty,

    /// A listener cancelled the action.
    #[error("Cancelled by listener")]
    Cancelled,

    /// Shooter or victim is unknown to the host.
    #[error("Entity does not exist in the host")]
    MissingEntity,

    /// Projectile already resolved or never fired.
    #[error("Projectile is not registered")]
    UnknownProjectile,
}

/// Result of an accepted shot.
#[derive(Clone, Debug, PartialEq)]
pub struct ShotReport {
    /// Spawned projectiles, one per bullet
    pub projectiles: Vec<ProjectileId>,
    /// Rounds left in the tracked magazine
    pub remaining: u32,
}

/// Result of a resolved hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitReport {
    /// Who fired the projectile
    pub shooter: EntityId,
    /// Where it landed
    pub shot_type: ShotType,
    /// Damage applied after the multiplier
    pub damage: f64,
    /// Velocity applied to the victim
    pub knockback: Vec3,
}

/// A scheduled magazine restoration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReloadTicket {
    /// Per-shooter generation this restoration belongs to
    pub generation: u64,
    /// When the magazine comes back (ms)
    pub due_ms: u64,
}

#[derive(Clone, Copy, Debug)]
struct ProjectileRecord {
    shooter: EntityId,
    gun: GunId,
}

#[derive(Clone, Copy, Debug)]
struct PendingReload {
    shooter: EntityId,
    ticket: ReloadTicket,
    magazine: u32,
}

/// Registry of guns plus per-shooter state.
#[derive(Debug)]
pub struct GunManager {
    guns: Vec<Gun>,
    last_shot: BTreeMap<EntityId, u64>,
    magazines: BTreeMap<EntityId, u32>,
    projectiles: BTreeMap<ProjectileId, ProjectileRecord>,
    reload_generation: BTreeMap<EntityId, u64>,
    pending_reloads: Vec<PendingReload>,
    rng: DeterministicRng,
}

impl GunManager {
    /// Create an empty manager with a seeded spread/damage RNG.
    pub fn new(seed: u64) -> Self {
        Self {
            guns: Vec::new(),
            last_shot: BTreeMap::new(),
            magazines: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            reload_generation: BTreeMap::new(),
            pending_reloads: Vec::new(),
            rng: DeterministicRng::new(seed),
        }
    }

    /// Register a gun type.
    pub fn register(&mut self, gun: Gun) -> GunId {
        let id = GunId(self.guns.len() as u32);
        info!(%id, gun = %gun, "gun registered");
        self.guns.push(gun);
        id
    }

    /// Look up a gun.
    pub fn gun(&self, id: GunId) -> Option<&Gun> {
        self.guns.get(id.0 as usize)
    }

    /// Find a gun by name.
    pub fn find(&self, name: &str) -> Option<GunId> {
        self.guns
            .iter()
            .position(|g| g.name == name)
            .map(|i| GunId(i as u32))
    }

    /// Registered guns with their ids.
    pub fn guns(&self) -> impl Iterator<Item = (GunId, &Gun)> + '_ {
        self.guns.iter().enumerate().map(|(i, g)| (GunId(i as u32), g))
    }

    /// Tracked magazine of a shooter. `None` means never fired (full).
    ///
    /// Reloads that came due but were not yet applied are not counted; see
    /// [`GunManager::magazine_at`].
    pub fn magazine(&self, shooter: EntityId) -> Option<u32> {
        self.magazines.get(&shooter).copied()
    }

    /// Tracked magazine of a shooter as of `now_ms`, counting a due reload.
    pub fn magazine_at(&self, shooter: EntityId, now_ms: u64) -> Option<u32> {
        let current = self.reload_generation.get(&shooter);
        self.pending_reloads
            .iter()
            .find(|p| p.shooter == shooter && p.ticket.due_ms <= now_ms && Some(&p.ticket.generation) == current)
            .map(|p| p.magazine)
            .or_else(|| self.magazine(shooter))
    }

    /// Time of a shooter's last accepted shot.
    pub fn last_shot(&self, shooter: EntityId) -> Option<u64> {
        self.last_shot.get(&shooter).copied()
    }

    /// Number of projectiles still awaiting a hit.
    pub fn projectiles_in_flight(&self) -> usize {
        self.projectiles.len()
    }

    /// Shooter of an in-flight projectile.
    pub fn projectile_shooter(&self, projectile: ProjectileId) -> Option<EntityId> {
        self.projectiles.get(&projectile).map(|r| r.shooter)
    }

    /// Number of queued reload restorations, stale ones included.
    pub fn pending_reloads(&self) -> usize {
        self.pending_reloads.len()
    }

    /// Forget everything tracked for a shooter.
    pub fn forget_shooter(&mut self, shooter: EntityId) {
        self.last_shot.remove(&shooter);
        self.magazines.remove(&shooter);
        self.reload_generation.remove(&shooter);
        self.pending_reloads.retain(|p| p.shooter != shooter);
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Fire a gun.
    ///
    /// Rejected without side effects when fired inside the rate-limit
    /// interval or with an empty tracked magazine. A shooter with no tracked
    /// magazine always gets its first shot. Each bullet gets its own spread;
    /// the magazine drops by one per shot.
    pub fn shoot(
        &mut self,
        gun_id: GunId,
        shooter: EntityId,
        host: &mut dyn EntityHost,
        events: &mut EventBus,
        now_ms: u64,
    ) -> Result<ShotReport, GunError> {
        self.apply_due_reloads(Some(shooter), now_ms);
        let gun = self.guns.get(gun_id.0 as usize).ok_or(GunError::UnknownGun(gun_id))?;

        if let Some(last) = self.last_shot.get(&shooter) {
            if now_ms.saturating_sub(*last) < gun.min_shot_interval_ms() {
                debug!(?shooter, %gun_id, "shot rate limited");
                return Err(GunError::RateLimited);
            }
        }

        let tracked = self.magazines.get(&shooter).copied();
        if tracked == Some(0) {
            return Err(GunError::MagazineEmpty);
        }
        let magazine = tracked.unwrap_or(gun.magazine_size);

        let Some(mut location) = host.location(shooter) else {
            error!(?shooter, %gun_id, "shooter has no entity in the host");
            return Err(GunError::MissingEntity);
        };

        let event = events.dispatch(EventData::GunFire { shooter, gun: gun_id });
        if event.is_cancelled() {
            return Err(GunError::Cancelled);
        }

        let aim = location.direction();
        let mut spawned = Vec::with_capacity(gun.bullets_per_shot as usize);
        for _ in 0..gun.bullets_per_shot {
            let spread = Vec3::new(
                self.rng.next_spread(gun.accuracy),
                self.rng.next_spread(gun.accuracy),
                self.rng.next_spread(gun.accuracy),
            );
            let velocity = (aim + spread).scale(gun.muzzle_velocity);
            let id = host.launch_projectile(shooter, gun.bullet.projectile, velocity, &gun.bullet.name);
            self.projectiles.insert(id, ProjectileRecord { shooter, gun: gun_id });
            spawned.push(id);
        }

        location.pitch *= gun.recoil;
        host.set_location(shooter, location);

        let remaining = magazine.saturating_sub(1);
        self.magazines.insert(shooter, remaining);
        self.last_shot.insert(shooter, now_ms);

        debug!(?shooter, %gun_id, bullets = spawned.len(), remaining, "gun fired");
        Ok(ShotReport { projectiles: spawned, remaining })
    }

    /// Resolve a projectile landing on a victim.
    ///
    /// The projectile is unregistered before anything else, so it resolves
    /// at most once even if the hit is cancelled.
    pub fn hit(
        &mut self,
        projectile: ProjectileId,
        victim: EntityId,
        land: Vec3,
        host: &mut dyn EntityHost,
        events: &mut EventBus,
    ) -> Result<HitReport, GunError> {
        let record = self.projectiles.remove(&projectile).ok_or(GunError::UnknownProjectile)?;
        let gun = self.guns.get(record.gun.0 as usize).ok_or(GunError::UnknownGun(record.gun))?;

        let Some(target) = host.location(victim) else {
            error!(?victim, ?projectile, "hit victim has no entity in the host");
            return Err(GunError::MissingEntity);
        };
        let shot_type = classify(land, target.position);

        let event = events.dispatch(EventData::GunHit {
            shooter: record.shooter,
            victim,
            gun: record.gun,
            shot_type,
            damage_multiplier: 1.0,
        });
        if event.is_cancelled() {
            return Err(GunError::Cancelled);
        }
        let multiplier = event.damage_multiplier().unwrap_or(1.0);

        let knockback = target.direction().scale(-gun.bullet.knockback);
        host.set_velocity(victim, knockback);

        let damage = self.rng.next_f64_range(gun.bullet.min_damage, gun.bullet.max_damage) * multiplier;
        host.damage(victim, damage);

        debug!(?victim, %shot_type, damage, "projectile hit");
        Ok(HitReport {
            shooter: record.shooter,
            shot_type,
            damage,
            knockback,
        })
    }

    /// Empty the shooter's magazine and schedule a refill.
    ///
    /// Reloading again before the refill supersedes the earlier one; only
    /// the latest ticket restores the magazine.
    pub fn reload(
        &mut self,
        gun_id: GunId,
        shooter: EntityId,
        events: &mut EventBus,
        now_ms: u64,
    ) -> Result<ReloadTicket, GunError> {
        let gun = self.guns.get(gun_id.0 as usize).ok_or(GunError::UnknownGun(gun_id))?;

        let event = events.dispatch(EventData::GunReload { shooter, gun: gun_id });
        if event.is_cancelled() {
            return Err(GunError::Cancelled);
        }

        self.magazines.insert(shooter, 0);

        let generation = self.reload_generation.entry(shooter).or_insert(0);
        *generation += 1;
        let ticket = ReloadTicket {
            generation: *generation,
            due_ms: now_ms + gun.reload_time_ms,
        };
        self.pending_reloads.push(PendingReload {
            shooter,
            ticket,
            magazine: gun.magazine_size,
        });

        debug!(?shooter, %gun_id, generation = ticket.generation, due_ms = ticket.due_ms, "reload scheduled");
        Ok(ticket)
    }

    /// Apply every reload restoration due at `now_ms`.
    ///
    /// Superseded restorations are dropped. Returns the number applied.
    pub fn poll_reloads(&mut self, now_ms: u64) -> usize {
        self.apply_due_reloads(None, now_ms)
    }

    /// Apply due restorations, for one shooter or for everyone.
    fn apply_due_reloads(&mut self, only: Option<EntityId>, now_ms: u64) -> usize {
        let generations = &self.reload_generation;
        let magazines = &mut self.magazines;
        let mut restored = 0;

        self.pending_reloads.retain(|pending| {
            if pending.ticket.due_ms > now_ms || only.is_some_and(|s| s != pending.shooter) {
                return true;
            }
            if generations.get(&pending.shooter) == Some(&pending.ticket.generation) {
                magazines.insert(pending.shooter, pending.magazine);
                restored += 1;
            }
            false
        });

        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec3::Location;
    use crate::game::events::EventKind;
    use crate::guns::gun::tests::rifle;
    use crate::guns::gun::ProjectileKind;
    use crate::host::SimHost;

    struct Fixture {
        guns: GunManager,
        host: SimHost,
        events: EventBus,
        rifle: GunId,
        shooter: EntityId,
        victim: EntityId,
    }

    fn fixture() -> Fixture {
        let mut guns = GunManager::new(42);
        let rifle = guns.register(rifle());

        let mut host = SimHost::new(Location::new("hub", 0.0, 64.0, 0.0));
        let shooter = EntityId(uuid::Uuid::from_bytes([1; 16]));
        let victim = EntityId(uuid::Uuid::from_bytes([2; 16]));
        host.spawn_entity(shooter, Location::new("w", 0.0, 64.0, -10.0).with_rotation(0.0, 10.0));
        host.spawn_entity(victim, Location::new("w", 0.0, 64.0, 0.0));

        Fixture {
            guns,
            host,
            events: EventBus::new(),
            rifle,
            shooter,
            victim,
        }
    }

    impl Fixture {
        fn shoot(&mut self, now_ms: u64) -> Result<ShotReport, GunError> {
            self.guns.shoot(self.rifle, self.shooter, &mut self.host, &mut self.events, now_ms)
        }

        fn hit(&mut self, projectile: ProjectileId, land: Vec3) -> Result<HitReport, GunError> {
            self.guns.hit(projectile, self.victim, land, &mut self.host, &mut self.events)
        }

        fn reload(&mut self, now_ms: u64) -> Result<ReloadTicket, GunError> {
            self.guns.reload(self.rifle, self.shooter, &mut self.events, now_ms)
        }
    }

    #[test]
    fn test_first_shot_spawns_projectile() {
        let mut fx = fixture();
        let report = fx.shoot(0).unwrap();

        assert_eq!(report.projectiles.len(), 1);
        assert_eq!(report.remaining, 9);
        assert_eq!(fx.guns.magazine(fx.shooter), Some(9));
        assert_eq!(fx.guns.projectile_shooter(report.projectiles[0]), Some(fx.shooter));

        let launched = &fx.host.projectiles()[0];
        assert_eq!(launched.kind, ProjectileKind::Arrow);
        assert_eq!(launched.tag, "rifle_round");
    }

    #[test]
    fn test_rate_limit() {
        let mut fx = fixture();
        fx.shoot(1_000).unwrap();

        assert_eq!(fx.shoot(1_050), Err(GunError::RateLimited));
        assert_eq!(fx.host.projectiles().len(), 1);
        assert_eq!(fx.guns.last_shot(fx.shooter), Some(1_000));
        assert_eq!(fx.guns.magazine(fx.shooter), Some(9));

        fx.shoot(1_100).unwrap();
        assert_eq!(fx.host.projectiles().len(), 2);
    }

    #[test]
    fn test_magazine_drains() {
        let mut fx = fixture();
        for i in 0..10 {
            fx.shoot(i * 100).unwrap();
        }
        assert_eq!(fx.guns.magazine(fx.shooter), Some(0));
        assert_eq!(fx.shoot(1_000), Err(GunError::MagazineEmpty));
        assert_eq!(fx.host.projectiles().len(), 10);
    }

    #[test]
    fn test_multi_bullet_shot_uses_one_round() {
        let mut fx = fixture();
        let mut shotgun = rifle();
        shotgun.name = "Shotgun".to_string();
        shotgun.bullets_per_shot = 5;
        let id = fx.guns.register(shotgun);

        let report = fx.guns.shoot(id, fx.shooter, &mut fx.host, &mut fx.events, 0).unwrap();
        assert_eq!(report.projectiles.len(), 5);
        assert_eq!(report.remaining, 9);
        assert_eq!(fx.guns.projectiles_in_flight(), 5);
    }

    #[test]
    fn test_spread_stays_within_accuracy() {
        let mut fx = fixture();
        fx.host.spawn_entity(fx.shooter, Location::new("w", 0.0, 64.0, -10.0));
        let mut gun = rifle();
        gun.fire_rate = 0;
        gun.magazine_size = 200;
        let id = fx.guns.register(gun.clone());

        for _ in 0..100 {
            fx.guns.shoot(id, fx.shooter, &mut fx.host, &mut fx.events, 0).unwrap();
        }

        // Facing +Z with level pitch, so the unperturbed aim is (0, 0, 1)
        let bound = gun.accuracy * gun.muzzle_velocity + 1e-9;
        for launched in fx.host.projectiles() {
            let v = launched.velocity;
            assert!(v.x.abs() <= bound);
            assert!(v.y.abs() <= bound);
            assert!((v.z - gun.muzzle_velocity).abs() <= bound);
        }
    }

    #[test]
    fn test_recoil_scales_pitch() {
        let mut fx = fixture();
        fx.shoot(0).unwrap();

        let location = fx.host.location(fx.shooter).unwrap();
        assert!((location.pitch - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_cancelled_fire_changes_nothing() {
        let mut fx = fixture();
        fx.events.subscribe(EventKind::GunFire, |event| event.cancel());

        assert_eq!(fx.shoot(0), Err(GunError::Cancelled));
        assert!(fx.host.projectiles().is_empty());
        assert_eq!(fx.guns.magazine(fx.shooter), None);
        assert_eq!(fx.guns.last_shot(fx.shooter), None);
        assert!((fx.host.location(fx.shooter).unwrap().pitch - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_shooter() {
        let mut fx = fixture();
        let ghost = EntityId(uuid::Uuid::from_bytes([9; 16]));
        let result = fx.guns.shoot(fx.rifle, ghost, &mut fx.host, &mut fx.events, 0);
        assert_eq!(result, Err(GunError::MissingEntity));
        assert_eq!(fx.guns.magazine(ghost), None);
    }

    #[test]
    fn test_unknown_gun() {
        let mut fx = fixture();
        let result = fx.guns.shoot(GunId(99), fx.shooter, &mut fx.host, &mut fx.events, 0);
        assert_eq!(result, Err(GunError::UnknownGun(GunId(99))));
    }

    #[test]
    fn test_hit_applies_damage_and_knockback() {
        let mut fx = fixture();
        let projectile = fx.shoot(0).unwrap().projectiles[0];

        let report = fx.hit(projectile, Vec3::new(0.0, 66.0, 0.0)).unwrap();
        assert_eq!(report.shot_type, ShotType::HeadShot);
        assert_eq!(report.shooter, fx.shooter);
        assert!(report.damage >= 4.0 && report.damage <= 6.0);
        assert_eq!(fx.host.damage_taken(fx.victim), report.damage);

        // Victim faces +Z, knockback pushes it back along -Z
        let velocity = fx.host.velocity(fx.victim).unwrap();
        assert!((velocity.z + 0.5).abs() < 1e-9);
        assert!(velocity.x.abs() < 1e-9);
    }

    #[test]
    fn test_projectile_resolves_once() {
        let mut fx = fixture();
        let projectile = fx.shoot(0).unwrap().projectiles[0];

        let first = fx.hit(projectile, Vec3::new(0.0, 65.0, 0.0)).unwrap();
        assert_eq!(fx.hit(projectile, Vec3::new(0.0, 65.0, 0.0)), Err(GunError::UnknownProjectile));
        assert_eq!(fx.host.damage_taken(fx.victim), first.damage);
        assert_eq!(fx.guns.projectiles_in_flight(), 0);
    }

    #[test]
    fn test_cancelled_hit_still_consumes_projectile() {
        let mut fx = fixture();
        fx.events.subscribe(EventKind::GunHit, |event| event.cancel());
        let projectile = fx.shoot(0).unwrap().projectiles[0];

        assert_eq!(fx.hit(projectile, Vec3::new(0.0, 65.0, 0.0)), Err(GunError::Cancelled));
        assert_eq!(fx.host.damage_taken(fx.victim), 0.0);
        assert_eq!(fx.host.velocity(fx.victim), None);
        assert_eq!(fx.guns.projectiles_in_flight(), 0);
    }

    #[test]
    fn test_listener_multiplier_scales_damage() {
        let mut fx = fixture();
        fx.events.subscribe(EventKind::GunHit, |event| {
            let headshot = matches!(
                event.data(),
                EventData::GunHit { shot_type: ShotType::HeadShot, .. }
            );
            if headshot {
                event.set_damage_multiplier(2.0);
            }
        });
        let projectile = fx.shoot(0).unwrap().projectiles[0];

        let report = fx.hit(projectile, Vec3::new(0.0, 66.0, 0.0)).unwrap();
        assert!(report.damage >= 8.0 && report.damage <= 12.0);
    }

    #[test]
    fn test_reload_restores_after_delay() {
        let mut fx = fixture();
        fx.shoot(0).unwrap();
        fx.shoot(100).unwrap();

        let ticket = fx.reload(1_000).unwrap();
        assert_eq!(ticket.due_ms, 3_000);
        assert_eq!(fx.guns.magazine(fx.shooter), Some(0));
        assert_eq!(fx.shoot(1_500), Err(GunError::MagazineEmpty));

        assert_eq!(fx.guns.poll_reloads(2_999), 0);
        assert_eq!(fx.guns.magazine(fx.shooter), Some(0));

        assert_eq!(fx.guns.poll_reloads(3_000), 1);
        assert_eq!(fx.guns.magazine(fx.shooter), Some(10));
        assert_eq!(fx.guns.pending_reloads(), 0);
    }

    #[test]
    fn test_second_reload_supersedes_first() {
        let mut fx = fixture();
        let first = fx.reload(1_000).unwrap();
        let second = fx.reload(2_000).unwrap();
        assert!(second.generation > first.generation);

        // The first restoration comes due but is stale
        assert_eq!(fx.guns.poll_reloads(3_000), 0);
        assert_eq!(fx.guns.magazine(fx.shooter), Some(0));

        assert_eq!(fx.guns.poll_reloads(4_000), 1);
        assert_eq!(fx.guns.magazine(fx.shooter), Some(10));
    }

    #[test]
    fn test_due_reload_applies_on_next_shot() {
        let mut fx = fixture();
        fx.reload(0).unwrap();

        // No tick ran in between
        assert_eq!(fx.shoot(1_999), Err(GunError::MagazineEmpty));
        let report = fx.shoot(2_500).unwrap();
        assert_eq!(report.remaining, 9);
        assert_eq!(fx.guns.pending_reloads(), 0);
        assert_eq!(fx.guns.poll_reloads(10_000), 0);
    }

    #[test]
    fn test_magazine_at_counts_due_reload() {
        let mut fx = fixture();
        fx.reload(0).unwrap();

        assert_eq!(fx.guns.magazine_at(fx.shooter, 1_000), Some(0));
        assert_eq!(fx.guns.magazine_at(fx.shooter, 2_000), Some(10));
        assert_eq!(fx.guns.magazine(fx.shooter), Some(0));

        // A superseded ticket never counts
        fx.reload(1_000).unwrap();
        assert_eq!(fx.guns.magazine_at(fx.shooter, 2_500), Some(0));
        assert_eq!(fx.guns.magazine_at(fx.shooter, 3_000), Some(10));
    }

    #[test]
    fn test_untracked_empty_gun_fires_once() {
        let mut fx = fixture();
        let mut derringer = rifle();
        derringer.name = "Derringer".to_string();
        derringer.magazine_size = 0;
        let id = fx.guns.register(derringer);

        let report = fx.guns.shoot(id, fx.shooter, &mut fx.host, &mut fx.events, 0).unwrap();
        assert_eq!(report.remaining, 0);
        assert_eq!(
            fx.guns.shoot(id, fx.shooter, &mut fx.host, &mut fx.events, 1_000),
            Err(GunError::MagazineEmpty)
        );
    }

    #[test]
    fn test_find_by_name() {
        let mut fx = fixture();
        let mut pistol = rifle();
        pistol.name = "Pistol".to_string();
        let id = fx.guns.register(pistol);

        assert_eq!(fx.guns.find("Rifle"), Some(fx.rifle));
        assert_eq!(fx.guns.find("Pistol"), Some(id));
        assert_eq!(fx.guns.find("Bazooka"), None);
    }

    #[test]
    fn test_cancelled_reload_changes_nothing() {
        let mut fx = fixture();
        fx.shoot(0).unwrap();
        fx.events.subscribe(EventKind::GunReload, |event| event.cancel());

        assert_eq!(fx.reload(100), Err(GunError::Cancelled));
        assert_eq!(fx.guns.magazine(fx.shooter), Some(9));
        assert_eq!(fx.guns.pending_reloads(), 0);
    }

    #[test]
    fn test_forget_shooter() {
        let mut fx = fixture();
        fx.shoot(0).unwrap();
        fx.reload(100).unwrap();
        fx.guns.forget_shooter(fx.shooter);

        assert_eq!(fx.guns.magazine(fx.shooter), None);
        assert_eq!(fx.guns.last_shot(fx.shooter), None);
        assert_eq!(fx.guns.pending_reloads(), 0);
    }
}
