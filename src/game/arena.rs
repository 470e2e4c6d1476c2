//! Arena
//!
//! A bounded match instance: geometry, flags, one session, and the
//! join/leave/spectate operations. Membership itself lives in the
//! [`PlayerRegistry`]; an arena's occupants are the players whose arena
//! reference points at it.
//!
//! Arenas are built in two phases. [`Arena::new`] fixes identity, then
//! [`Arena::init_geometry`] and [`Arena::attach_session`] make it ready.
//! Membership operations on an arena that is not ready are rejected.
//!
//! None of these operations lock. Callers serialize them onto one logical
//! thread (see [`crate::game::api::GameApi`]).

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::{debug, error, info, warn};

use crate::core::bounds::Bounds;
use crate::core::vec3::{Location, Vec3};
use crate::game::events::{EventBus, EventData};
use crate::game::player::{GamePlayer, PlayerId, PlayerRegistry, PlayerState};
use crate::game::session::{GameSession, GameState, Occupancy, Transition};
use crate::host::{GameMode, PlayerHost};
use crate::world::{ArenaWorld, WorldProvider};

/// Sequential arena identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArenaId(pub u32);

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-arena rule toggles. Unset flags read as enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArenaFlag {
    /// Players may damage each other
    Pvp,
    /// Players take any damage
    Damage,
    /// Hunger drains
    Hunger,
    /// Blocks may be broken
    BlockBreak,
    /// Blocks may be placed
    BlockPlace,
    /// Items may be dropped
    ItemDrop,
    /// Items may be picked up
    ItemPickup,
    /// Chat is delivered
    Chat,
}

/// Spectator spawns and play-area boxes, normalized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaGeometry {
    /// Where players wait before and between rounds
    pub lobby: Location,
    /// Spectator spawn during the main round
    pub spectator: Location,
    /// Spectator spawn during death match
    pub spectator_death_match: Location,
    /// Main play area
    pub corners: Bounds,
    /// Death match play area
    pub corners_death_match: Bounds,
}

/// Why a membership operation did not happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// Geometry has not been initialized.
    #[error("Arena is not initialized")]
    NotInitialized,

    /// No session is attached.
    #[error("Arena has no session")]
    NoSession,

    /// Occupancy has reached session capacity.
    #[error("Arena is full")]
    ArenaFull,

    /// Session is past the lobby.
    #[error("Arena is not in lobby")]
    NotInLobby,

    /// A listener cancelled the action.
    #[error("Cancelled by listener")]
    Cancelled,

    /// Player has no live connection.
    #[error("Player is offline")]
    PlayerOffline,

    /// Player is not registered.
    #[error("Unknown player")]
    UnknownPlayer,
}

/// Result of a border check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderCheck {
    /// Player is inside the active bounds, or not an alive occupant
    Inside,
    /// Player is outside and a listener allowed it
    Allowed,
    /// Player was sent back to the lobby
    Returned,
}

/// Mutable collaborators every membership operation needs.
pub struct ArenaContext<'a> {
    /// Player membership
    pub players: &'a mut PlayerRegistry,
    /// Host connection layer
    pub host: &'a mut dyn PlayerHost,
    /// Listener bus
    pub events: &'a mut EventBus,
}

/// A bounded match instance.
#[derive(Debug)]
pub struct Arena {
    id: ArenaId,
    name: String,
    geometry: Option<ArenaGeometry>,
    session: Option<GameSession>,
    world: Option<ArenaWorld>,
    flags: BTreeMap<ArenaFlag, bool>,
}

impl Arena {
    /// Create an arena with identity only. Name becomes `"<id>_<name>"`.
    pub fn new(id: ArenaId, name: &str) -> Self {
        Self {
            id,
            name: format!("{}_{}", id.0, name),
            geometry: None,
            session: None,
            world: None,
            flags: BTreeMap::new(),
        }
    }

    /// Store spawns and play areas, normalizing both corner pairs per axis.
    pub fn init_geometry(
        &mut self,
        lobby: Location,
        spectator: Location,
        spectator_death_match: Location,
        corners: Bounds,
        corners_death_match: Bounds,
    ) {
        self.geometry = Some(ArenaGeometry {
            lobby,
            spectator,
            spectator_death_match,
            corners: corners.normalized(),
            corners_death_match: corners_death_match.normalized(),
        });
    }

    /// Attach the session. Replaces any previous one.
    pub fn attach_session(&mut self, session: GameSession) {
        self.session = Some(session);
    }

    /// Attach the backing world.
    pub fn attach_world(&mut self, world: ArenaWorld) {
        self.world = Some(world);
    }

    /// Arena id.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Composed name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Geometry, once initialized.
    pub fn geometry(&self) -> Option<&ArenaGeometry> {
        self.geometry.as_ref()
    }

    /// Attached session.
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Backing world.
    pub fn world(&self) -> Option<&ArenaWorld> {
        self.world.as_ref()
    }

    /// Whether geometry and session are both in place.
    pub fn is_ready(&self) -> bool {
        self.geometry.is_some() && self.session.is_some()
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Read a flag. Unset flags are `true`.
    pub fn get_flag(&self, flag: ArenaFlag) -> bool {
        self.flags.get(&flag).copied().unwrap_or(true)
    }

    /// Set a flag.
    pub fn update_flag(&mut self, flag: ArenaFlag, value: bool) {
        self.flags.insert(flag, value);
    }

    // =========================================================================
    // Occupants
    // =========================================================================

    /// Every occupant, regardless of state.
    pub fn all_players<'r>(&self, players: &'r PlayerRegistry) -> Vec<&'r GamePlayer> {
        players.in_arena(self.id).collect()
    }

    /// Occupants in a given state.
    pub fn get_players(&self, players: &PlayerRegistry, state: PlayerState) -> Vec<PlayerId> {
        players
            .in_arena(self.id)
            .filter(|p| p.state() == state)
            .map(GamePlayer::id)
            .collect()
    }

    /// Occupant count, regardless of state.
    pub fn size(&self, players: &PlayerRegistry) -> usize {
        players.in_arena(self.id).count()
    }

    /// Whether a player is attached to this arena.
    pub fn contains_player(&self, players: &PlayerRegistry, id: &PlayerId) -> bool {
        players.arena_of(id) == Some(self.id)
    }

    /// Deliver a message to every occupant that is online.
    pub fn broadcast_message(&self, players: &PlayerRegistry, host: &mut dyn PlayerHost, message: &str) {
        for player in players.in_arena(self.id) {
            if host.is_online(player.id()) {
                host.send_message(player.id(), message);
            } else {
                debug!(arena = %self.name, player = %player.id(), "skipping offline occupant");
            }
        }
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Check the join gates: session attached, not full, still in lobby.
    pub fn check_join(&self, players: &PlayerRegistry) -> Result<(), ArenaError> {
        let session = self.session.as_ref().ok_or(ArenaError::NoSession)?;

        if self.size(players) >= session.max_players() {
            return Err(ArenaError::ArenaFull);
        }

        if session.state() != GameState::Lobby {
            return Err(ArenaError::NotInLobby);
        }

        Ok(())
    }

    /// Whether a player could join right now.
    pub fn can_join(&self, players: &PlayerRegistry) -> bool {
        self.check_join(players).is_ok()
    }

    /// Add a player as Alive and move them to the lobby.
    pub fn join(&mut self, ctx: &mut ArenaContext<'_>, player: PlayerId) -> Result<(), ArenaError> {
        let lobby = self.lobby()?.clone();
        self.check_join(ctx.players)?;
        let name = Self::player_name(ctx.players, &player)?;

        let event = ctx.events.dispatch(EventData::PlayerJoinArena {
            player,
            arena: self.id,
            message: format!("{} has joined the arena {}", name, self.name),
        });
        if event.is_cancelled() {
            return Err(ArenaError::Cancelled);
        }
        self.broadcast_event_message(ctx, event.message());

        if !ctx.host.is_online(player) {
            error!(arena = %self.name, %player, "player {} is offline on join", name);
            return Err(ArenaError::PlayerOffline);
        }

        let others: Vec<(PlayerId, PlayerState)> = ctx.players
            .in_arena(self.id)
            .filter(|p| p.id() != player)
            .map(|p| (p.id(), p.state()))
            .collect();

        if let Some(joiner) = ctx.players.get_mut(&player) {
            joiner.assign(self.id, PlayerState::Alive);
        }
        ctx.host.teleport(player, &lobby);
        ctx.host.set_game_mode(player, GameMode::Adventure);

        for (target, state) in others {
            if !ctx.host.is_online(target) {
                continue;
            }
            ctx.host.show_player(target, player);
            match state {
                PlayerState::Spectator => ctx.host.hide_player(player, target),
                PlayerState::Alive => ctx.host.show_player(player, target),
                PlayerState::NotAssigned => {}
            }
        }

        info!(arena = %self.name, %player, "player joined");
        Ok(())
    }

    /// Detach a player and send them to the host's default spawn.
    ///
    /// Membership is not checked: a non-member is still reset and the
    /// leave message is still broadcast to this arena.
    pub fn leave(&mut self, ctx: &mut ArenaContext<'_>, player: PlayerId) -> Result<(), ArenaError> {
        self.lobby()?;
        let name = Self::player_name(ctx.players, &player)?;

        let event = ctx.events.dispatch(EventData::PlayerLeaveArena {
            player,
            arena: self.id,
            message: format!("{} has left the arena {}", name, self.name),
        });
        if event.is_cancelled() {
            return Err(ArenaError::Cancelled);
        }
        self.broadcast_event_message(ctx, event.message());

        if !ctx.host.is_online(player) {
            error!(arena = %self.name, %player, "player {} is offline on leave", name);
            return Err(ArenaError::PlayerOffline);
        }

        if let Some(leaver) = ctx.players.get_mut(&player) {
            if leaver.arena().is_some_and(|a| a != self.id) {
                warn!(arena = %self.name, %player, "resetting player attached to another arena");
            }
            leaver.unassign();
        }
        let spawn = ctx.host.default_spawn();
        let mode = ctx.host.default_game_mode();
        ctx.host.teleport(player, &spawn);
        ctx.host.set_game_mode(player, mode);

        info!(arena = %self.name, %player, "player left");
        Ok(())
    }

    /// Attach a player as Spectator, hidden from every non-spectator.
    pub fn spectate(&mut self, ctx: &mut ArenaContext<'_>, player: PlayerId) -> Result<(), ArenaError> {
        let lobby = self.lobby()?.clone();
        let name = Self::player_name(ctx.players, &player)?;

        let event = ctx.events.dispatch(EventData::PlayerSpectateArena {
            player,
            arena: self.id,
            message: format!("{} is spectating the arena {}", name, self.name),
        });
        if event.is_cancelled() {
            return Err(ArenaError::Cancelled);
        }
        self.broadcast_event_message(ctx, event.message());

        if !ctx.host.is_online(player) {
            error!(arena = %self.name, %player, "player {} is offline on spectate", name);
            return Err(ArenaError::PlayerOffline);
        }

        if let Some(spectator) = ctx.players.get_mut(&player) {
            spectator.assign(self.id, PlayerState::Spectator);
        }
        ctx.host.teleport(player, &lobby);
        ctx.host.set_game_mode(player, GameMode::Spectator);

        let watchers: Vec<PlayerId> = ctx.players
            .in_arena(self.id)
            .filter(|p| p.id() != player && p.state() != PlayerState::Spectator)
            .map(GamePlayer::id)
            .collect();
        for target in watchers {
            if ctx.host.is_online(target) {
                ctx.host.hide_player(target, player);
            }
        }

        info!(arena = %self.name, %player, "player spectating");
        Ok(())
    }

    /// Broadcast a chat line from an occupant. Returns the delivered text.
    pub fn talk(
        &self,
        ctx: &mut ArenaContext<'_>,
        player: PlayerId,
        message: &str,
    ) -> Result<String, ArenaError> {
        let name = Self::player_name(ctx.players, &player)?;

        let event = ctx.events.dispatch(EventData::PlayerTalk {
            player,
            arena: self.id,
            formatted: format!("{}: {}", name, message),
        });
        if event.is_cancelled() {
            return Err(ArenaError::Cancelled);
        }

        let formatted = event.message().unwrap_or_default().to_string();
        self.broadcast_message(ctx.players, ctx.host, &formatted);
        Ok(formatted)
    }

    /// Keep alive occupants inside the active play area.
    ///
    /// During death match the death-match box applies, otherwise the main
    /// box. An escaping player is returned to the lobby unless a listener
    /// cancels the border event.
    pub fn check_border(
        &self,
        ctx: &mut ArenaContext<'_>,
        player: PlayerId,
        position: Vec3,
    ) -> Result<BorderCheck, ArenaError> {
        let geometry = self.geometry.as_ref().ok_or(ArenaError::NotInitialized)?;

        let alive_here = ctx.players.get(&player)
            .is_some_and(|p| p.arena() == Some(self.id) && p.state() == PlayerState::Alive);
        if !alive_here {
            return Ok(BorderCheck::Inside);
        }

        let bounds = match self.session.as_ref().map(GameSession::state) {
            Some(GameState::DeathMatch) => &geometry.corners_death_match,
            _ => &geometry.corners,
        };
        if bounds.contains(position) {
            return Ok(BorderCheck::Inside);
        }

        let event = ctx.events.dispatch(EventData::PlayerCrossArenaBorder {
            player,
            arena: self.id,
            position,
        });
        if event.is_cancelled() {
            return Ok(BorderCheck::Allowed);
        }

        ctx.host.teleport(player, &geometry.lobby);
        debug!(arena = %self.name, %player, "returned player inside border");
        Ok(BorderCheck::Returned)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Advance the session one game-second.
    ///
    /// Entering the finish phase raises a session-finish notification.
    pub fn tick(&mut self, ctx: &mut ArenaContext<'_>) -> Option<Transition> {
        let occupancy = Occupancy {
            alive: self.get_players(ctx.players, PlayerState::Alive).len(),
            total: self.size(ctx.players),
        };

        let transition = self.session.as_mut()?.advance(occupancy)?;
        if transition.to == GameState::Finish {
            ctx.events.dispatch(EventData::SessionFinish { arena: self.id });
        }
        Some(transition)
    }

    /// Unload the backing world and delete its directory.
    ///
    /// No-op returning false when no world is attached. Occupants are not
    /// evacuated; callers move them out first.
    pub fn close(&mut self, worlds: &mut dyn WorldProvider) -> bool {
        let Some(world) = self.world.take() else {
            return false;
        };

        let unloaded = worlds.unload_world(&world.name);
        let removed = worlds.remove_directory(&world.folder);
        info!(arena = %self.name, world = %world.name, unloaded, removed, "arena closed");
        unloaded && removed
    }

    fn lobby(&self) -> Result<&Location, ArenaError> {
        self.geometry.as_ref().map(|g| &g.lobby).ok_or(ArenaError::NotInitialized)
    }

    fn player_name(players: &PlayerRegistry, id: &PlayerId) -> Result<String, ArenaError> {
        players
            .get(id)
            .map(|p| p.name().to_string())
            .ok_or(ArenaError::UnknownPlayer)
    }

    fn broadcast_event_message(&self, ctx: &mut ArenaContext<'_>, message: Option<&str>) {
        if let Some(message) = message {
            self.broadcast_message(ctx.players, ctx.host, message);
        }
    }
}
