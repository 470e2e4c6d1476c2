//! Game API
//!
//! Single owner of every registry: host, players, listeners, guns, game
//! controllers and arenas. All mutating entry points take `&mut self`, so
//! wrapping the API in one lock is enough to serialize the tick against
//! player actions.
//!
//! The API also owns the game clock. Gun actions and the tick read the
//! same monotonic clock, so a reload scheduled by a player action is due
//! on the same time base the tick polls with. The `*_at` variants take an
//! explicit timestamp on that base.

use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::core::rng::DeterministicRng;
use crate::core::vec3::Vec3;
use crate::game::arena::{Arena, ArenaContext, ArenaError, ArenaId, BorderCheck};
use crate::game::events::EventBus;
use crate::game::player::{GamePlayer, PlayerId, PlayerRegistry};
use crate::game::session::{GameSession, GameState, SessionConfig, Transition};
use crate::guns::gun::GunId;
use crate::guns::manager::{GunError, GunManager, HitReport, ReloadTicket, ShotReport};
use crate::host::{EntityId, Host, ProjectileId};
use crate::world::{list_maps, ArenaWorld, WorldProvider};

/// Errors from the game API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No arena with this id.
    #[error("Unknown arena: {0}")]
    UnknownArena(ArenaId),

    /// No game registered under this name.
    #[error("Unknown game: {0}")]
    UnknownGame(String),

    /// Player is not attached to any arena.
    #[error("Player {0} is not in an arena")]
    NotInArena(PlayerId),

    /// No world could be provisioned for an arena.
    #[error("World unavailable for arena {0}")]
    WorldUnavailable(ArenaId),

    /// Arena rejected the operation.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// Gun rejected the operation.
    #[error(transparent)]
    Gun(#[from] GunError),
}

/// A registered minigame: where its maps live and how its sessions run.
#[derive(Clone, Debug)]
pub struct GameController {
    name: String,
    maps_dir: PathBuf,
    session: SessionConfig,
    arenas: Vec<ArenaId>,
}

impl GameController {
    /// Game name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source map directory.
    pub fn maps_dir(&self) -> &std::path::Path {
        &self.maps_dir
    }

    /// Session settings for new arenas.
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Arenas created for this game.
    pub fn arenas(&self) -> &[ArenaId] {
        &self.arenas
    }
}

/// What one tick changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Session transitions, by arena
    pub transitions: Vec<(ArenaId, Transition)>,
    /// Arenas whose session reached End this tick
    pub ended: Vec<ArenaId>,
    /// Magazines restored by due reloads
    pub reloads_restored: usize,
}

/// Owner of all game state.
pub struct GameApi<H> {
    host: H,
    players: PlayerRegistry,
    events: EventBus,
    guns: GunManager,
    games: BTreeMap<String, GameController>,
    arenas: BTreeMap<ArenaId, Arena>,
    next_arena: u32,
    rng: DeterministicRng,
    clock: Instant,
}

impl<H: Host> GameApi<H> {
    /// Create an empty API around a host.
    pub fn new(host: H, rng_seed: u64) -> Self {
        Self {
            host,
            players: PlayerRegistry::new(),
            events: EventBus::new(),
            guns: GunManager::new(rng_seed),
            games: BTreeMap::new(),
            arenas: BTreeMap::new(),
            next_arena: 0,
            rng: DeterministicRng::new(rng_seed.rotate_left(32)),
            clock: Instant::now(),
        }
    }

    /// Create an API and register the configured guns.
    pub fn from_config(host: H, config: &GameConfig) -> Self {
        let mut api = Self::new(host, config.rng_seed);
        for gun in &config.guns {
            api.guns.register(gun.clone());
        }
        api
    }

    /// Host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Player registry.
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// Listener bus, for subscribing.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Gun manager.
    pub fn guns(&self) -> &GunManager {
        &self.guns
    }

    /// Gun manager, mutably (registering guns).
    pub fn guns_mut(&mut self) -> &mut GunManager {
        &mut self.guns
    }

    /// Milliseconds on the game clock since the API was created.
    pub fn now_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Register a player. Re-registering keeps the existing membership.
    pub fn register_player(&mut self, id: PlayerId, name: impl Into<String>) {
        self.players.register(id, name);
    }

    /// Forget a player and its gun state.
    ///
    /// A player still attached to an arena is detached without events.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<GamePlayer> {
        self.guns.forget_shooter(id.into());
        let player = self.players.unregister(&id)?;
        if let Some(arena) = player.arena() {
            info!(%id, %arena, "removed player still attached to arena");
        }
        Some(player)
    }

    /// Arena a player is attached to.
    pub fn player_arena(&self, id: PlayerId) -> Option<ArenaId> {
        self.players.arena_of(&id)
    }

    // =========================================================================
    // Games and arenas
    // =========================================================================

    /// Register a game. Returns false if the name is taken.
    pub fn register_game(&mut self, name: &str, maps_dir: impl Into<PathBuf>, session: SessionConfig) -> bool {
        if self.games.contains_key(name) {
            warn!(game = name, "game already registered");
            return false;
        }

        self.games.insert(name.to_string(), GameController {
            name: name.to_string(),
            maps_dir: maps_dir.into(),
            session,
            arenas: Vec::new(),
        });
        info!(game = name, "game registered");
        true
    }

    /// Unregister a game. Its arenas stay until closed.
    pub fn unregister_game(&mut self, name: &str) -> Option<GameController> {
        let controller = self.games.remove(name)?;
        info!(game = name, arenas = controller.arenas.len(), "game unregistered");
        Some(controller)
    }

    /// Look up a game.
    pub fn game(&self, name: &str) -> Option<&GameController> {
        self.games.get(name)
    }

    /// Create an arena for a game, with a fresh session attached.
    ///
    /// Geometry still has to be initialized through [`GameApi::arena_mut`].
    pub fn create_arena(&mut self, game: &str, name: &str) -> Result<ArenaId, ApiError> {
        let controller = self.games.get_mut(game).ok_or_else(|| ApiError::UnknownGame(game.to_string()))?;

        let id = ArenaId(self.next_arena);
        self.next_arena += 1;

        let mut arena = Arena::new(id, name);
        arena.attach_session(GameSession::new(controller.session.clone()));
        controller.arenas.push(id);

        info!(%id, game, arena = arena.name(), "arena created");
        self.arenas.insert(id, arena);
        Ok(id)
    }

    /// Look up an arena.
    pub fn arena(&self, id: ArenaId) -> Option<&Arena> {
        self.arenas.get(&id)
    }

    /// Look up an arena mutably.
    pub fn arena_mut(&mut self, id: ArenaId) -> Option<&mut Arena> {
        self.arenas.get_mut(&id)
    }

    /// All arenas in id order.
    pub fn arenas(&self) -> impl Iterator<Item = &Arena> + '_ {
        self.arenas.values()
    }

    /// Replace an arena's world with a fresh copy of a random map.
    ///
    /// The map is picked from the owning game's maps directory and copied
    /// to `<arena name>_<map>` before loading.
    pub fn build_arena_world(&mut self, id: ArenaId, worlds: &mut dyn WorldProvider) -> Result<ArenaWorld, ApiError> {
        let maps_dir = self.games
            .values()
            .find(|g| g.arenas.contains(&id))
            .map(|g| g.maps_dir.clone())
            .ok_or(ApiError::UnknownArena(id))?;
        let arena = self.arenas.get_mut(&id).ok_or(ApiError::UnknownArena(id))?;

        arena.close(worlds);

        let maps = list_maps(&maps_dir);
        let map = self.rng.choose(&maps).ok_or(ApiError::WorldUnavailable(id))?;
        let world_name = format!("{}_{}", arena.name(), map);

        if !worlds.copy_directory(&maps_dir.join(map), &worlds.world_path(&world_name)) {
            return Err(ApiError::WorldUnavailable(id));
        }
        let world = worlds.load_world(&world_name).ok_or(ApiError::WorldUnavailable(id))?;

        arena.attach_world(world.clone());
        info!(%id, world = %world.name, "arena world built");
        Ok(world)
    }

    /// Evacuate an arena, unload its world and drop it.
    ///
    /// Returns whether the world was unloaded and removed.
    pub fn close_arena(&mut self, id: ArenaId, worlds: &mut dyn WorldProvider) -> Result<bool, ApiError> {
        let mut arena = self.arenas.remove(&id).ok_or(ApiError::UnknownArena(id))?;
        for controller in self.games.values_mut() {
            controller.arenas.retain(|a| *a != id);
        }

        let occupants: Vec<PlayerId> = self.players.in_arena(id).map(GamePlayer::id).collect();
        let spawn = self.host.default_spawn();
        let mode = self.host.default_game_mode();
        for player in occupants {
            if let Some(p) = self.players.get_mut(&player) {
                p.unassign();
            }
            self.host.teleport(player, &spawn);
            self.host.set_game_mode(player, mode);
        }

        let closed = arena.close(worlds);
        info!(%id, closed, "arena dropped");
        Ok(closed)
    }

    // =========================================================================
    // Membership
    // =========================================================================

    fn with_arena<T>(
        &mut self,
        id: ArenaId,
        op: impl FnOnce(&mut Arena, &mut ArenaContext<'_>) -> Result<T, ArenaError>,
    ) -> Result<T, ApiError> {
        let arena = self.arenas.get_mut(&id).ok_or(ApiError::UnknownArena(id))?;
        let mut ctx = ArenaContext {
            players: &mut self.players,
            host: &mut self.host,
            events: &mut self.events,
        };
        Ok(op(arena, &mut ctx)?)
    }

    fn current_arena(&self, player: PlayerId) -> Result<ArenaId, ApiError> {
        self.players.arena_of(&player).ok_or(ApiError::NotInArena(player))
    }

    /// Join an arena as Alive.
    pub fn join(&mut self, arena: ArenaId, player: PlayerId) -> Result<(), ApiError> {
        self.with_arena(arena, |a, ctx| a.join(ctx, player))
    }

    /// Leave an arena.
    pub fn leave(&mut self, arena: ArenaId, player: PlayerId) -> Result<(), ApiError> {
        self.with_arena(arena, |a, ctx| a.leave(ctx, player))
    }

    /// Spectate an arena.
    pub fn spectate(&mut self, arena: ArenaId, player: PlayerId) -> Result<(), ApiError> {
        self.with_arena(arena, |a, ctx| a.spectate(ctx, player))
    }

    /// Chat inside the player's current arena.
    pub fn talk(&mut self, player: PlayerId, message: &str) -> Result<String, ApiError> {
        let arena = self.current_arena(player)?;
        self.with_arena(arena, |a, ctx| a.talk(ctx, player, message))
    }

    /// Border check inside the player's current arena.
    pub fn check_border(&mut self, player: PlayerId, position: Vec3) -> Result<BorderCheck, ApiError> {
        let arena = self.current_arena(player)?;
        self.with_arena(arena, |a, ctx| a.check_border(ctx, player, position))
    }

    // =========================================================================
    // Guns
    // =========================================================================

    /// Fire a gun now.
    pub fn shoot(&mut self, gun: GunId, shooter: EntityId) -> Result<ShotReport, ApiError> {
        let now_ms = self.now_ms();
        self.shoot_at(gun, shooter, now_ms)
    }

    /// Fire a gun at a game-clock timestamp.
    pub fn shoot_at(&mut self, gun: GunId, shooter: EntityId, now_ms: u64) -> Result<ShotReport, ApiError> {
        Ok(self.guns.shoot(gun, shooter, &mut self.host, &mut self.events, now_ms)?)
    }

    /// Resolve a projectile hit.
    pub fn hit(&mut self, projectile: ProjectileId, victim: EntityId, land: Vec3) -> Result<HitReport, ApiError> {
        Ok(self.guns.hit(projectile, victim, land, &mut self.host, &mut self.events)?)
    }

    /// Reload a gun now.
    pub fn reload(&mut self, gun: GunId, shooter: EntityId) -> Result<ReloadTicket, ApiError> {
        let now_ms = self.now_ms();
        self.reload_at(gun, shooter, now_ms)
    }

    /// Reload a gun at a game-clock timestamp.
    pub fn reload_at(&mut self, gun: GunId, shooter: EntityId, now_ms: u64) -> Result<ReloadTicket, ApiError> {
        Ok(self.guns.reload(gun, shooter, &mut self.events, now_ms)?)
    }

    /// A shooter's magazine right now, counting a reload that came due.
    pub fn magazine(&self, shooter: EntityId) -> Option<u32> {
        self.guns.magazine_at(shooter, self.now_ms())
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance every session one game-second and apply reloads due now.
    pub fn tick(&mut self) -> TickReport {
        let now_ms = self.now_ms();
        self.tick_at(now_ms)
    }

    /// Tick with an explicit game-clock timestamp.
    pub fn tick_at(&mut self, now_ms: u64) -> TickReport {
        let mut report = TickReport::default();

        for (id, arena) in self.arenas.iter_mut() {
            let mut ctx = ArenaContext {
                players: &mut self.players,
                host: &mut self.host,
                events: &mut self.events,
            };
            if let Some(transition) = arena.tick(&mut ctx) {
                if transition.to == GameState::End {
                    report.ended.push(*id);
                }
                report.transitions.push((*id, transition));
            }
        }

        report.reloads_restored = self.guns.poll_reloads(now_ms);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use crate::core::bounds::Bounds;
    use crate::core::vec3::Location;
    use crate::game::events::EventKind;
    use crate::game::player::PlayerState;
    use crate::guns::gun::tests::rifle;
    use crate::host::{EntityHost, SimHost};
    use crate::world::DirectoryWorlds;

    fn quick_session() -> SessionConfig {
        SessionConfig {
            max_players: 4,
            min_players: 2,
            warmup_secs: 1,
            game_secs: 5,
            death_match_secs: 5,
            death_match_threshold: 1,
            finish_secs: 1,
        }
    }

    fn api_with_arena() -> (GameApi<SimHost>, ArenaId) {
        let mut api = GameApi::new(SimHost::new(Location::new("hub", 0.0, 64.0, 0.0)), 7);
        assert!(api.register_game("skywars", "maps", quick_session()));
        let id = api.create_arena("skywars", "sky").unwrap();

        let lobby = Location::new("sky", 0.0, 80.0, 0.0);
        api.arena_mut(id).unwrap().init_geometry(
            lobby.clone(),
            lobby.clone(),
            lobby,
            Bounds::new(Vec3::new(-50.0, 0.0, -50.0), Vec3::new(50.0, 256.0, 50.0)),
            Bounds::new(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 256.0, 10.0)),
        );
        (api, id)
    }

    fn add_player(api: &mut GameApi<SimHost>, n: u8) -> PlayerId {
        let id = PlayerId::new([n; 16]);
        api.register_player(id, format!("p{n}"));
        api.host_mut().connect(id);
        id
    }

    #[test]
    fn test_arena_ids_are_sequential() {
        let (mut api, first) = api_with_arena();
        let second = api.create_arena("skywars", "sky").unwrap();

        assert_eq!(first, ArenaId(0));
        assert_eq!(second, ArenaId(1));
        assert_eq!(api.arena(second).unwrap().name(), "1_sky");
        assert_eq!(api.game("skywars").unwrap().arenas(), &[first, second]);
    }

    #[test]
    fn test_unknown_game_and_arena() {
        let (mut api, _) = api_with_arena();
        let p = add_player(&mut api, 1);

        assert_eq!(api.create_arena("bedwars", "x"), Err(ApiError::UnknownGame("bedwars".to_string())));
        assert_eq!(api.join(ArenaId(9), p), Err(ApiError::UnknownArena(ArenaId(9))));
        assert_eq!(api.talk(p, "hi"), Err(ApiError::NotInArena(p)));
        assert!(!api.register_game("skywars", "maps", quick_session()));
    }

    #[test]
    fn test_unregister_game_keeps_arenas() {
        let (mut api, id) = api_with_arena();
        let p = add_player(&mut api, 1);

        let controller = api.unregister_game("skywars").unwrap();
        assert_eq!(controller.arenas(), &[id]);
        assert!(api.game("skywars").is_none());
        assert!(api.unregister_game("skywars").is_none());

        api.join(id, p).unwrap();
        assert_eq!(api.player_arena(p), Some(id));
        assert_eq!(api.arenas().count(), 1);
        assert_eq!(api.create_arena("skywars", "sky"), Err(ApiError::UnknownGame("skywars".to_string())));
    }

    #[test]
    fn test_join_and_leave_through_api() {
        let (mut api, id) = api_with_arena();
        let p = add_player(&mut api, 1);

        api.join(id, p).unwrap();
        assert_eq!(api.player_arena(p), Some(id));

        api.leave(id, p).unwrap();
        assert_eq!(api.player_arena(p), None);
        assert_eq!(api.players().get(&p).unwrap().state(), PlayerState::NotAssigned);
    }

    #[test]
    fn test_tick_drives_session_and_reports_end() {
        let (mut api, id) = api_with_arena();
        let finished = Arc::new(Mutex::new(Vec::new()));
        let seen = finished.clone();
        api.events_mut().subscribe(EventKind::SessionFinish, move |event| {
            seen.lock().unwrap().push(event.data().clone());
        });

        let a = add_player(&mut api, 1);
        let b = add_player(&mut api, 2);
        api.join(id, a).unwrap();
        api.join(id, b).unwrap();

        let report = api.tick_at(0);
        assert_eq!(report.transitions, vec![(id, Transition { from: GameState::Lobby, to: GameState::Warmup })]);

        api.tick_at(1_000); // warmup -> in-game
        assert_eq!(api.arena(id).unwrap().session().unwrap().state(), GameState::InGame);

        // Losing a player ends the round
        api.leave(id, b).unwrap();
        api.tick_at(2_000);
        assert_eq!(api.arena(id).unwrap().session().unwrap().state(), GameState::Finish);
        assert_eq!(finished.lock().unwrap().len(), 1);

        let report = api.tick_at(3_000);
        assert_eq!(report.ended, vec![id]);
    }

    #[test]
    fn test_guns_through_api() {
        let (mut api, _) = api_with_arena();
        let gun = api.guns_mut().register(rifle());
        let shooter = add_player(&mut api, 1);
        let victim = add_player(&mut api, 2);

        let shot = api.shoot_at(gun, shooter.into(), 0).unwrap();
        let hit = api.hit(shot.projectiles[0], victim.into(), Vec3::new(0.0, 64.05, 0.0)).unwrap();
        assert_eq!(hit.shot_type, crate::guns::shot::ShotType::FootShot);
        assert!(api.host().damage_taken(victim.into()) > 0.0);

        api.reload_at(gun, shooter.into(), 100).unwrap();
        assert_eq!(api.tick_at(1_000).reloads_restored, 0);
        assert_eq!(api.tick_at(2_100).reloads_restored, 1);
        assert_eq!(api.guns().magazine(shooter.into()), Some(10));
        assert!(matches!(
            api.shoot_at(GunId(5), shooter.into(), 5_000),
            Err(ApiError::Gun(GunError::UnknownGun(_)))
        ));
    }

    #[test]
    fn test_reload_comes_back_without_a_tick() {
        let (mut api, _) = api_with_arena();
        let gun = api.guns_mut().register(rifle());
        let p = add_player(&mut api, 1);

        api.reload_at(gun, p.into(), 0).unwrap();
        let shot = api.shoot_at(gun, p.into(), 2_500).unwrap();
        assert_eq!(shot.remaining, 9);
    }

    #[test]
    fn test_actions_share_the_game_clock() {
        let (mut api, _) = api_with_arena();
        let mut quick = rifle();
        quick.reload_time_ms = 10;
        let gun = api.guns_mut().register(quick);
        let p = add_player(&mut api, 1);

        let ticket = api.reload(gun, p.into()).unwrap();
        assert!(ticket.due_ms >= 10);
        assert!(ticket.due_ms <= api.now_ms() + 10);

        std::thread::sleep(std::time::Duration::from_millis(30));
        assert!(api.now_ms() >= ticket.due_ms);
        assert_eq!(api.magazine(p.into()), Some(10));
        assert_eq!(api.tick().reloads_restored, 1);
        assert_eq!(api.guns().magazine(p.into()), Some(10));
    }

    #[test]
    fn test_check_border_through_api() {
        let (mut api, id) = api_with_arena();
        let p = add_player(&mut api, 1);
        api.join(id, p).unwrap();

        let result = api.check_border(p, Vec3::new(500.0, 80.0, 0.0)).unwrap();
        assert_eq!(result, BorderCheck::Returned);
        assert_eq!(api.host().location(p.into()).unwrap().position, Vec3::new(0.0, 80.0, 0.0));
    }

    #[test]
    fn test_build_and_close_arena_world() {
        let maps = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(maps.path().join("canyon").join("region")).unwrap();
        std::fs::write(maps.path().join("canyon").join("level.dat"), b"level").unwrap();

        let mut api = GameApi::new(SimHost::new(Location::new("hub", 0.0, 64.0, 0.0)), 1);
        api.register_game("skywars", maps.path(), quick_session());
        let id = api.create_arena("skywars", "sky").unwrap();
        let mut worlds = DirectoryWorlds::new(root.path());

        let world = api.build_arena_world(id, &mut worlds).unwrap();
        assert_eq!(world.name, "0_sky_canyon");
        assert!(world.folder.join("level.dat").exists());
        assert!(worlds.is_loaded("0_sky_canyon"));

        // Rebuilding replaces the previous copy
        let again = api.build_arena_world(id, &mut worlds).unwrap();
        assert_eq!(again.name, "0_sky_canyon");

        let p = add_player(&mut api, 1);
        let lobby = Location::new("0_sky_canyon", 0.0, 80.0, 0.0);
        let bounds = Bounds::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        api.arena_mut(id).unwrap().init_geometry(lobby.clone(), lobby.clone(), lobby, bounds, bounds);
        api.join(id, p).unwrap();

        assert_eq!(api.close_arena(id, &mut worlds), Ok(true));
        assert!(!world.folder.exists());
        assert!(api.arena(id).is_none());
        assert_eq!(api.player_arena(p), None);
        assert!(api.game("skywars").unwrap().arenas().is_empty());
    }

    #[test]
    fn test_build_world_without_maps() {
        let maps = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let mut api = GameApi::new(SimHost::new(Location::new("hub", 0.0, 64.0, 0.0)), 1);
        api.register_game("skywars", maps.path(), quick_session());
        let id = api.create_arena("skywars", "sky").unwrap();

        let mut worlds = DirectoryWorlds::new(root.path());
        assert_eq!(api.build_arena_world(id, &mut worlds), Err(ApiError::WorldUnavailable(id)));
    }

    #[test]
    fn test_remove_player_forgets_gun_state() {
        let (mut api, _) = api_with_arena();
        let gun = api.guns_mut().register(rifle());
        let p = add_player(&mut api, 1);
        api.shoot(gun, p.into()).unwrap();

        assert!(api.remove_player(p).is_some());
        assert_eq!(api.guns().magazine(p.into()), None);
        assert!(api.players().get(&p).is_none());
    }
}
