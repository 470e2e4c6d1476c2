//! Host Boundary
//!
//! The arena and gun code never touch connections or entities directly.
//! Everything observable goes through these traits so the core can run
//! inside any host event layer. [`SimHost`] is an in-memory host used by
//! the demo binary and the tests.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

use crate::core::vec3::{Location, Vec3};
use crate::game::player::PlayerId;
use crate::guns::gun::ProjectileKind;

/// Identifier of any living entity that can shoot or be hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub uuid::Uuid);

impl From<PlayerId> for EntityId {
    fn from(player: PlayerId) -> Self {
        Self(player.0)
    }
}

/// Identifier of an in-flight projectile, assigned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u64);

/// Interaction mode applied to a player by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Normal play
    #[default]
    Survival,
    /// Play without world editing
    Adventure,
    /// Fly-through observer
    Spectator,
}

/// Player connection side of the host.
pub trait PlayerHost {
    /// Whether the player has a live connection.
    fn is_online(&self, player: PlayerId) -> bool;

    /// Deliver a chat line to a player.
    fn send_message(&mut self, player: PlayerId, message: &str);

    /// Move a player to a location.
    fn teleport(&mut self, player: PlayerId, location: &Location);

    /// Make `target` visible to `viewer`.
    fn show_player(&mut self, viewer: PlayerId, target: PlayerId);

    /// Make `target` invisible to `viewer`.
    fn hide_player(&mut self, viewer: PlayerId, target: PlayerId);

    /// Change the interaction mode of a player.
    fn set_game_mode(&mut self, player: PlayerId, mode: GameMode);

    /// Fallback location for players leaving an arena.
    fn default_spawn(&self) -> Location;

    /// Mode restored on players leaving an arena.
    fn default_game_mode(&self) -> GameMode {
        GameMode::Survival
    }
}

/// Entity side of the host, used by guns.
pub trait EntityHost {
    /// Current location (with facing) of an entity, if it exists.
    fn location(&self, entity: EntityId) -> Option<Location>;

    /// Move or rotate an entity.
    fn set_location(&mut self, entity: EntityId, location: Location);

    /// Spawn a projectile from `shooter` with the given velocity and tag.
    fn launch_projectile(
        &mut self,
        shooter: EntityId,
        kind: ProjectileKind,
        velocity: Vec3,
        tag: &str,
    ) -> ProjectileId;

    /// Overwrite the velocity of an entity.
    fn set_velocity(&mut self, entity: EntityId, velocity: Vec3);

    /// Apply damage to an entity.
    fn damage(&mut self, entity: EntityId, amount: f64);
}

/// Full host surface.
pub trait Host: PlayerHost + EntityHost {}

impl<T: PlayerHost + EntityHost> Host for T {}

// =============================================================================
// IN-MEMORY HOST
// =============================================================================

/// A projectile recorded by [`SimHost`].
#[derive(Clone, Debug, PartialEq)]
pub struct LaunchedProjectile {
    /// Host-assigned id
    pub id: ProjectileId,
    /// Who fired it
    pub shooter: EntityId,
    /// Projectile kind
    pub kind: ProjectileKind,
    /// Launch velocity
    pub velocity: Vec3,
    /// Bullet name tag
    pub tag: String,
}

/// In-memory host that records every effect.
#[derive(Debug)]
pub struct SimHost {
    spawn: Location,
    online: BTreeSet<PlayerId>,
    locations: BTreeMap<EntityId, Location>,
    messages: BTreeMap<PlayerId, Vec<String>>,
    hidden: BTreeSet<(PlayerId, PlayerId)>,
    modes: BTreeMap<PlayerId, GameMode>,
    projectiles: Vec<LaunchedProjectile>,
    velocities: BTreeMap<EntityId, Vec3>,
    damage_taken: BTreeMap<EntityId, f64>,
    next_projectile: u64,
}

impl SimHost {
    /// Create a host whose default spawn is `spawn`.
    pub fn new(spawn: Location) -> Self {
        Self {
            spawn,
            online: BTreeSet::new(),
            locations: BTreeMap::new(),
            messages: BTreeMap::new(),
            hidden: BTreeSet::new(),
            modes: BTreeMap::new(),
            projectiles: Vec::new(),
            velocities: BTreeMap::new(),
            damage_taken: BTreeMap::new(),
            next_projectile: 0,
        }
    }

    /// Mark a player as connected, standing at the default spawn.
    pub fn connect(&mut self, player: PlayerId) {
        self.online.insert(player);
        self.locations.insert(player.into(), self.spawn.clone());
    }

    /// Drop a player's connection.
    pub fn disconnect(&mut self, player: PlayerId) {
        self.online.remove(&player);
    }

    /// Add a non-player entity at a location.
    pub fn spawn_entity(&mut self, entity: EntityId, location: Location) {
        self.locations.insert(entity, location);
    }

    /// Messages received by a player, oldest first.
    pub fn messages(&self, player: PlayerId) -> &[String] {
        self.messages.get(&player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `viewer` can currently see `target`.
    pub fn can_see(&self, viewer: PlayerId, target: PlayerId) -> bool {
        !self.hidden.contains(&(viewer, target))
    }

    /// Current mode of a player.
    pub fn game_mode(&self, player: PlayerId) -> GameMode {
        self.modes.get(&player).copied().unwrap_or_default()
    }

    /// Projectiles launched so far.
    pub fn projectiles(&self) -> &[LaunchedProjectile] {
        &self.projectiles
    }

    /// Last velocity set on an entity.
    pub fn velocity(&self, entity: EntityId) -> Option<Vec3> {
        self.velocities.get(&entity).copied()
    }

    /// Total damage applied to an entity.
    pub fn damage_taken(&self, entity: EntityId) -> f64 {
        self.damage_taken.get(&entity).copied().unwrap_or(0.0)
    }
}

impl PlayerHost for SimHost {
    fn is_online(&self, player: PlayerId) -> bool {
        self.online.contains(&player)
    }

    fn send_message(&mut self, player: PlayerId, message: &str) {
        if self.online.contains(&player) {
            self.messages.entry(player).or_default().push(message.to_string());
        }
    }

    fn teleport(&mut self, player: PlayerId, location: &Location) {
        self.locations.insert(player.into(), location.clone());
    }

    fn show_player(&mut self, viewer: PlayerId, target: PlayerId) {
        self.hidden.remove(&(viewer, target));
    }

    fn hide_player(&mut self, viewer: PlayerId, target: PlayerId) {
        self.hidden.insert((viewer, target));
    }

    fn set_game_mode(&mut self, player: PlayerId, mode: GameMode) {
        self.modes.insert(player, mode);
    }

    fn default_spawn(&self) -> Location {
        self.spawn.clone()
    }
}

impl EntityHost for SimHost {
    fn location(&self, entity: EntityId) -> Option<Location> {
        self.locations.get(&entity).cloned()
    }

    fn set_location(&mut self, entity: EntityId, location: Location) {
        self.locations.insert(entity, location);
    }

    fn launch_projectile(
        &mut self,
        shooter: EntityId,
        kind: ProjectileKind,
        velocity: Vec3,
        tag: &str,
    ) -> ProjectileId {
        let id = ProjectileId(self.next_projectile);
        self.next_projectile += 1;
        self.projectiles.push(LaunchedProjectile {
            id,
            shooter,
            kind,
            velocity,
            tag: tag.to_string(),
        });
        id
    }

    fn set_velocity(&mut self, entity: EntityId, velocity: Vec3) {
        self.velocities.insert(entity, velocity);
    }

    fn damage(&mut self, entity: EntityId, amount: f64) {
        *self.damage_taken.entry(entity).or_insert(0.0) += amount;
    }
}
