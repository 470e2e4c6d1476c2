//! Player State Tracking
//!
//! Per-player arena membership. Uses BTreeMap so occupant iteration is
//! stable across runs.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::game::arena::ArenaId;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Stable player identifier (UUID).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub uuid::Uuid);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }

    /// Create a fresh random id.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// Membership state of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlayerState {
    /// Not attached to any arena
    #[default]
    NotAssigned,
    /// Playing in an arena
    Alive,
    /// Watching an arena
    Spectator,
}

/// A player known to the game layer.
///
/// `arena` is `Some` exactly when `state` is not [`PlayerState::NotAssigned`];
/// the fields are private so only [`GamePlayer::assign`] and
/// [`GamePlayer::unassign`] can change them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GamePlayer {
    id: PlayerId,
    name: String,
    state: PlayerState,
    arena: Option<ArenaId>,
}

impl GamePlayer {
    /// Create an unassigned player.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            state: PlayerState::NotAssigned,
            arena: None,
        }
    }

    /// Player id.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current membership state.
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Arena the player is attached to.
    pub fn arena(&self) -> Option<ArenaId> {
        self.arena
    }

    /// Attach to an arena in an assigned state.
    ///
    /// Passing `NotAssigned` is treated as [`GamePlayer::unassign`].
    pub fn assign(&mut self, arena: ArenaId, state: PlayerState) {
        if state == PlayerState::NotAssigned {
            self.unassign();
            return;
        }
        self.state = state;
        self.arena = Some(arena);
    }

    /// Detach from any arena.
    pub fn unassign(&mut self) {
        self.state = PlayerState::NotAssigned;
        self.arena = None;
    }
}

// =============================================================================
// PLAYER REGISTRY
// =============================================================================

/// Owner of every [`GamePlayer`].
///
/// Arena occupancy is derived from here: an arena's occupants are the
/// players whose arena reference points at it.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: BTreeMap<PlayerId, GamePlayer>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player. Re-registering keeps the existing membership.
    pub fn register(&mut self, id: PlayerId, name: impl Into<String>) -> &mut GamePlayer {
        self.players.entry(id).or_insert_with(|| GamePlayer::new(id, name))
    }

    /// Forget a player entirely.
    pub fn unregister(&mut self, id: &PlayerId) -> Option<GamePlayer> {
        self.players.remove(id)
    }

    /// Get a player by id.
    pub fn get(&self, id: &PlayerId) -> Option<&GamePlayer> {
        self.players.get(id)
    }

    /// Get a player mutably by id.
    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut GamePlayer> {
        self.players.get_mut(id)
    }

    /// Arena of a player, if attached.
    pub fn arena_of(&self, id: &PlayerId) -> Option<ArenaId> {
        self.players.get(id).and_then(GamePlayer::arena)
    }

    /// Players attached to an arena, in id order.
    pub fn in_arena(&self, arena: ArenaId) -> impl Iterator<Item = &GamePlayer> + '_ {
        self.players.values().filter(move |p| p.arena == Some(arena))
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no players are registered.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
