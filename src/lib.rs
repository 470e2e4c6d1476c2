//! # Arena Minigames
//!
//! Arena lifecycle and gun ballistics for multiplayer minigames.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ARENA MINIGAMES                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Pure primitives                           │
//! │  ├── vec3.rs     - 3D vectors and facing locations           │
//! │  ├── bounds.rs   - Axis-aligned play areas                   │
//! │  └── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │                                                              │
//! │  game/           - Arena lifecycle                           │
//! │  ├── player.rs   - Membership state and registry             │
//! │  ├── session.rs  - Round state machine                       │
//! │  ├── arena.rs    - Join / leave / spectate                   │
//! │  ├── events.rs   - Cancellable events                        │
//! │  ├── api.rs      - Registry owner                            │
//! │  └── tick.rs     - Background session driver                 │
//! │                                                              │
//! │  guns/           - Ballistics                                │
//! │  ├── gun.rs      - Gun and bullet stats                      │
//! │  ├── shot.rs     - Shot classification                       │
//! │  └── manager.rs  - Fire / hit / reload                       │
//! │                                                              │
//! │  host.rs         - Host boundary + in-memory host            │
//! │  world.rs        - World provisioning                        │
//! │  config.rs       - JSON configuration                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Threading
//!
//! Nothing in `game/` or `guns/` locks. All state hangs off one
//! [`game::api::GameApi`]; callers share it behind a single mutex, which
//! the tick driver also takes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod guns;
pub mod host;
pub mod world;
pub mod config;

// Re-export commonly used types
pub use core::{Bounds, DeterministicRng, Location, Vec3};
pub use game::{Arena, ArenaId, EventBus, GameApi, GameSession, GameState, PlayerId, PlayerState};
pub use guns::{Gun, GunId, GunManager, ShotType};
pub use host::{EntityId, GameMode, Host, SimHost};
pub use config::GameConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default session tick period (ms). One tick is one game-second.
pub const TICK_INTERVAL_MS: u64 = 1_000;
