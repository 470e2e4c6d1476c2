//! Game Logic Module
//!
//! Arena lifecycle, player membership and the listener bus.
//!
//! ## Module Structure
//!
//! - `player`: Player ids, membership state, registry
//! - `session`: Round state machine
//! - `arena`: Geometry, flags, join/leave/spectate
//! - `events`: Cancellable events and the listener bus
//! - `api`: Owner of every registry
//! - `tick`: Background session driver

pub mod player;
pub mod session;
pub mod arena;
pub mod events;
pub mod api;
pub mod tick;

// Re-export key types
pub use player::{GamePlayer, PlayerId, PlayerRegistry, PlayerState};
pub use session::{GameSession, GameState, SessionConfig, Transition};
pub use arena::{Arena, ArenaContext, ArenaError, ArenaFlag, ArenaId, BorderCheck};
pub use events::{Event, EventBus, EventData, EventKind};
pub use api::{ApiError, GameApi, TickReport};
pub use tick::run_tick_loop;
