//! Game Session State Machine
//!
//! Round lifecycle of one arena. The session only moves forward through
//! [`GameSession::advance`], called once per game-second by the tick
//! driver. Arenas read its state and capacity to gate joins but never
//! write them.
//!
//! ```text
//! Lobby ─▶ Warmup ─▶ InGame ─▶ DeathMatch ─▶ Finish ─▶ End
//!   ▲        │          │                       ▲
//!   └────────┘          └───────────────────────┘
//!  (too few players)        (one player left)
//! ```

use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::info;

/// Phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameState {
    /// Accepting joins, waiting for enough players
    #[default]
    Lobby,
    /// Countdown before the round starts
    Warmup,
    /// Round in progress
    InGame,
    /// Final showdown in the death-match area
    DeathMatch,
    /// Round over, showing results
    Finish,
    /// Terminal
    End,
}

impl GameState {
    /// Whether a round is being played (warmup through death match).
    pub fn is_in_progress(self) -> bool {
        matches!(self, GameState::Warmup | GameState::InGame | GameState::DeathMatch)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Lobby => "lobby",
            GameState::Warmup => "warmup",
            GameState::InGame => "in-game",
            GameState::DeathMatch => "death-match",
            GameState::Finish => "finish",
            GameState::End => "end",
        };
        f.write_str(name)
    }
}

/// Configuration for a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum occupants accepted through join.
    pub max_players: usize,
    /// Alive players needed to leave the lobby.
    pub min_players: usize,
    /// Warmup countdown (seconds).
    pub warmup_secs: u32,
    /// Round length before death match (seconds).
    pub game_secs: u32,
    /// Death match length (seconds).
    pub death_match_secs: u32,
    /// Alive count at or below which the round jumps to death match.
    pub death_match_threshold: usize,
    /// Results screen length (seconds).
    pub finish_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_players: 16,
            min_players: 2,
            warmup_secs: 10,
            game_secs: 600,
            death_match_secs: 120,
            death_match_threshold: 3,
            finish_secs: 10,
        }
    }
}

/// Occupant counts sampled by the arena before each advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Occupancy {
    /// Occupants in the Alive state
    pub alive: usize,
    /// All occupants
    pub total: usize,
}

/// A state change produced by [`GameSession::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State before the tick
    pub from: GameState,
    /// State after the tick
    pub to: GameState,
}

/// Round lifecycle of one arena.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: SessionConfig,
    state: GameState,
    /// Seconds left in the current timed state
    remaining_secs: u32,
    /// Number of advances applied so far
    elapsed_ticks: u64,
}

impl GameSession {
    /// Create a session in the lobby.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: GameState::Lobby,
            remaining_secs: 0,
            elapsed_ticks: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Maximum occupants accepted through join.
    pub fn max_players(&self) -> usize {
        self.config.max_players
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Seconds left in the current timed state.
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Advances applied so far.
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Whether a round is being played.
    pub fn is_in_progress(&self) -> bool {
        self.state.is_in_progress()
    }

    /// Advance one game-second.
    ///
    /// A skipped call only delays progression; every call applies exactly
    /// one second of countdown.
    pub fn advance(&mut self, occupancy: Occupancy) -> Option<Transition> {
        if self.state == GameState::End {
            return None;
        }

        self.elapsed_ticks += 1;
        let alive = occupancy.alive;

        let next = match self.state {
            GameState::Lobby => {
                (alive >= self.config.min_players).then_some(GameState::Warmup)
            }
            GameState::Warmup => {
                if alive < self.config.min_players {
                    Some(GameState::Lobby)
                } else if self.count_down() {
                    Some(GameState::InGame)
                } else {
                    None
                }
            }
            GameState::InGame => {
                if alive <= 1 {
                    Some(GameState::Finish)
                } else if self.count_down() || alive <= self.config.death_match_threshold {
                    Some(GameState::DeathMatch)
                } else {
                    None
                }
            }
            GameState::DeathMatch => {
                if alive <= 1 || self.count_down() {
                    Some(GameState::Finish)
                } else {
                    None
                }
            }
            GameState::Finish => self.count_down().then_some(GameState::End),
            GameState::End => None,
        }?;

        Some(self.enter(next))
    }

    /// Tick the countdown. Returns true once it has run out.
    fn count_down(&mut self) -> bool {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs == 0
    }

    fn enter(&mut self, to: GameState) -> Transition {
        let from = self.state;
        self.state = to;
        self.remaining_secs = match to {
            GameState::Warmup => self.config.warmup_secs,
            GameState::InGame => self.config.game_secs,
            GameState::DeathMatch => self.config.death_match_secs,
            GameState::Finish => self.config.finish_secs,
            GameState::Lobby | GameState::End => 0,
        };
        info!(%from, %to, "session state changed");
        Transition { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupancy(alive: usize) -> Occupancy {
        Occupancy { alive, total: alive }
    }

    fn quick_config() -> SessionConfig {
        SessionConfig {
            max_players: 8,
            min_players: 2,
            warmup_secs: 2,
            game_secs: 3,
            death_match_secs: 2,
            death_match_threshold: 2,
            finish_secs: 1,
        }
    }

    #[test]
    fn test_starts_in_lobby() {
        let session = GameSession::new(SessionConfig::default());
        assert_eq!(session.state(), GameState::Lobby);
        assert!(!session.is_in_progress());
        assert_eq!(session.max_players(), 16);
    }

    #[test]
    fn test_lobby_waits_for_min_players() {
        let mut session = GameSession::new(quick_config());
        assert_eq!(session.advance(occupancy(1)), None);
        assert_eq!(session.state(), GameState::Lobby);

        let transition = session.advance(occupancy(2)).unwrap();
        assert_eq!(transition, Transition { from: GameState::Lobby, to: GameState::Warmup });
        assert_eq!(session.remaining_secs(), 2);
    }

    #[test]
    fn test_warmup_falls_back_to_lobby() {
        let mut session = GameSession::new(quick_config());
        session.advance(occupancy(2));
        assert_eq!(session.state(), GameState::Warmup);

        session.advance(occupancy(1));
        assert_eq!(session.state(), GameState::Lobby);
    }

    #[test]
    fn test_full_round() {
        let mut session = GameSession::new(quick_config());
        let players = occupancy(4);

        session.advance(players); // lobby -> warmup
        session.advance(players); // 1s left
        assert_eq!(session.state(), GameState::Warmup);
        session.advance(players); // warmup -> in-game
        assert_eq!(session.state(), GameState::InGame);
        assert!(session.is_in_progress());

        session.advance(players);
        session.advance(players);
        session.advance(players); // timer expired
        assert_eq!(session.state(), GameState::DeathMatch);

        session.advance(players);
        session.advance(players);
        assert_eq!(session.state(), GameState::Finish);

        session.advance(players);
        assert_eq!(session.state(), GameState::End);

        assert_eq!(session.advance(players), None);
        assert_eq!(session.state(), GameState::End);
    }

    #[test]
    fn test_last_player_standing_finishes_round() {
        let mut session = GameSession::new(quick_config());
        session.advance(occupancy(4));
        session.advance(occupancy(4));
        session.advance(occupancy(4));
        assert_eq!(session.state(), GameState::InGame);

        let transition = session.advance(occupancy(1)).unwrap();
        assert_eq!(transition.to, GameState::Finish);
    }

    #[test]
    fn test_threshold_triggers_death_match() {
        let mut session = GameSession::new(quick_config());
        session.advance(occupancy(4));
        session.advance(occupancy(4));
        session.advance(occupancy(4));

        let transition = session.advance(occupancy(2)).unwrap();
        assert_eq!(transition.to, GameState::DeathMatch);
    }

    #[test]
    fn test_end_does_not_count_ticks() {
        let config = SessionConfig { finish_secs: 0, ..quick_config() };
        let mut session = GameSession::new(config);
        for _ in 0..20 {
            session.advance(occupancy(3));
        }
        assert_eq!(session.state(), GameState::End);
        let ticks = session.elapsed_ticks();
        session.advance(occupancy(3));
        assert_eq!(session.elapsed_ticks(), ticks);
    }
}
