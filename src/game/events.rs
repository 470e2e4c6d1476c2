//! Cancellable Game Events
//!
//! Every player-visible action (join, leave, spectate, talk, fire, hit,
//! reload) is announced to listeners before its effects are committed.
//! Listeners run synchronously in registration order. Any of them may
//! cancel, and the action checks the flag once after all have run.
//!
//! Identity fields of an event are read-only. Listeners may only change
//! the auxiliary fields: the broadcast message of membership events and
//! the damage multiplier of hits.

use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::vec3::Vec3;
use crate::game::arena::ArenaId;
use crate::game::player::PlayerId;
use crate::guns::gun::GunId;
use crate::guns::shot::ShotType;
use crate::host::EntityId;

/// Discriminant of an event, used to filter subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Player is joining an arena
    PlayerJoinArena,
    /// Player is leaving an arena
    PlayerLeaveArena,
    /// Player is starting to spectate an arena
    PlayerSpectateArena,
    /// Player sent a chat line inside an arena
    PlayerTalk,
    /// Alive player stepped outside the play area
    PlayerCrossArenaBorder,
    /// Gun is about to fire
    GunFire,
    /// Projectile hit a target
    GunHit,
    /// Gun is about to reload
    GunReload,
    /// Session reached its finish phase
    SessionFinish,
}

/// Event payload, one variant per event kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventData {
    /// Player is joining an arena.
    PlayerJoinArena {
        player: PlayerId,
        arena: ArenaId,
        message: String,
    },

    /// Player is leaving an arena.
    PlayerLeaveArena {
        player: PlayerId,
        arena: ArenaId,
        message: String,
    },

    /// Player is starting to spectate.
    PlayerSpectateArena {
        player: PlayerId,
        arena: ArenaId,
        message: String,
    },

    /// Player chat inside an arena.
    PlayerTalk {
        player: PlayerId,
        arena: ArenaId,
        formatted: String,
    },

    /// Alive player left the active bounds.
    PlayerCrossArenaBorder {
        player: PlayerId,
        arena: ArenaId,
        position: Vec3,
    },

    /// Gun is about to fire.
    GunFire {
        shooter: EntityId,
        gun: GunId,
    },

    /// Projectile hit a target.
    GunHit {
        shooter: EntityId,
        victim: EntityId,
        gun: GunId,
        shot_type: ShotType,
        damage_multiplier: f64,
    },

    /// Gun is about to reload.
    GunReload {
        shooter: EntityId,
        gun: GunId,
    },

    /// Session entered its finish phase.
    SessionFinish {
        arena: ArenaId,
    },
}

impl EventData {
    /// Kind of this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            EventData::PlayerJoinArena { .. } => EventKind::PlayerJoinArena,
            EventData::PlayerLeaveArena { .. } => EventKind::PlayerLeaveArena,
            EventData::PlayerSpectateArena { .. } => EventKind::PlayerSpectateArena,
            EventData::PlayerTalk { .. } => EventKind::PlayerTalk,
            EventData::PlayerCrossArenaBorder { .. } => EventKind::PlayerCrossArenaBorder,
            EventData::GunFire { .. } => EventKind::GunFire,
            EventData::GunHit { .. } => EventKind::GunHit,
            EventData::GunReload { .. } => EventKind::GunReload,
            EventData::SessionFinish { .. } => EventKind::SessionFinish,
        }
    }
}

/// An event in flight: payload plus the shared cancellation flag.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    data: EventData,
    cancelled: bool,
}

impl Event {
    /// Wrap a payload, not cancelled.
    pub fn new(data: EventData) -> Self {
        Self { data, cancelled: false }
    }

    /// Read the payload.
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Kind of the payload.
    pub fn kind(&self) -> EventKind {
        self.data.kind()
    }

    /// Whether a listener cancelled the action.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Set or clear the cancellation flag.
    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    /// Cancel the action.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Message text carried by membership and chat events.
    pub fn message(&self) -> Option<&str> {
        match &self.data {
            EventData::PlayerJoinArena { message, .. }
            | EventData::PlayerLeaveArena { message, .. }
            | EventData::PlayerSpectateArena { message, .. } => Some(message),
            EventData::PlayerTalk { formatted, .. } => Some(formatted),
            _ => None,
        }
    }

    /// Replace the message text. Returns false for events without one.
    pub fn set_message(&mut self, text: impl Into<String>) -> bool {
        match &mut self.data {
            EventData::PlayerJoinArena { message, .. }
            | EventData::PlayerLeaveArena { message, .. }
            | EventData::PlayerSpectateArena { message, .. }
            | EventData::PlayerTalk { formatted: message, .. } => {
                *message = text.into();
                true
            }
            _ => false,
        }
    }

    /// Damage multiplier of a hit event.
    pub fn damage_multiplier(&self) -> Option<f64> {
        match &self.data {
            EventData::GunHit { damage_multiplier, .. } => Some(*damage_multiplier),
            _ => None,
        }
    }

    /// Change the damage multiplier. Returns false for non-hit events.
    pub fn set_damage_multiplier(&mut self, multiplier: f64) -> bool {
        match &mut self.data {
            EventData::GunHit { damage_multiplier, .. } => {
                *damage_multiplier = multiplier;
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// EVENT BUS
// =============================================================================

/// A registered listener callback.
pub type Listener = Box<dyn FnMut(&mut Event) + Send>;

struct Subscription {
    filter: Option<EventKind>,
    listener: Listener,
}

/// Synchronous dispatcher of [`Event`]s.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to one kind of event.
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F)
    where
        F: FnMut(&mut Event) + Send + 'static,
    {
        self.subscriptions.push(Subscription {
            filter: Some(kind),
            listener: Box::new(listener),
        });
    }

    /// Listen to every event.
    pub fn subscribe_all<F>(&mut self, listener: F)
    where
        F: FnMut(&mut Event) + Send + 'static,
    {
        self.subscriptions.push(Subscription {
            filter: None,
            listener: Box::new(listener),
        });
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Run every matching listener, in registration order.
    ///
    /// The caller inspects [`Event::is_cancelled`] on the returned event.
    pub fn dispatch(&mut self, data: EventData) -> Event {
        let mut event = Event::new(data);
        let kind = event.kind();

        for subscription in &mut self.subscriptions {
            if subscription.filter.is_some_and(|k| k != kind) {
                continue;
            }
            (subscription.listener)(&mut event);
        }

        debug!(?kind, cancelled = event.is_cancelled(), "dispatched event");
        event
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}
