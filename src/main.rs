//! Arena Minigames Demo
//!
//! Runs one arena round against the in-memory host: four players join,
//! trade shots once the round starts, and the losers drop to spectators
//! until one player is left standing.

use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arena_minigames::{
    VERSION,
    config::GameConfig,
    core::{Bounds, Location, Vec3},
    game::{run_tick_loop, ArenaId, GameApi, GameState, PlayerId},
    guns::{Appearance, Bullet, Gun, GunId, ProjectileKind},
    host::SimHost,
    world::DirectoryWorlds,
};

const GAME: &str = "duels";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Arena Minigames v{}", VERSION);
    let config = GameConfig::from_env().context("loading configuration")?;
    info!("Tick interval: {} ms", config.tick_interval_ms);

    let mut worlds = DirectoryWorlds::new(&config.worlds_dir);
    let (api, arena, players, gun) = demo_setup(&config, &mut worlds)?;
    let api = Arc::new(Mutex::new(api));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let period = Duration::from_millis(config.tick_interval_ms.max(1));
    let ticker = tokio::spawn(run_tick_loop(api.clone(), period, shutdown_rx));

    tokio::select! {
        result = demo_round(&api, arena, &players, gun, period) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    // The receiver may already be gone if the loop exited
    let _ = shutdown_tx.send(());
    let ticks = ticker.await.context("tick loop panicked")?;

    let closed = api.lock().await.close_arena(arena, &mut worlds)?;
    info!("Demo finished after {} ticks (world removed: {})", ticks, closed);
    Ok(())
}

/// Build the API, one arena and four connected players.
fn demo_setup(
    config: &GameConfig,
    worlds: &mut DirectoryWorlds,
) -> anyhow::Result<(GameApi<SimHost>, ArenaId, Vec<PlayerId>, GunId)> {
    let hub = Location::new("hub", 0.0, 64.0, 0.0);
    let mut api = GameApi::from_config(SimHost::new(hub), config);

    api.register_game(GAME, config.maps_dir.clone(), config.session.clone());
    let arena = api.create_arena(GAME, "pit")?;

    // A missing maps directory only costs the demo its world copy
    let world = match api.build_arena_world(arena, worlds) {
        Ok(world) => world.name,
        Err(e) => {
            warn!("Running without an arena world: {}", e);
            "pit".to_string()
        }
    };

    let lobby = Location::new(world.clone(), 0.0, 70.0, 0.0);
    api.arena_mut(arena)
        .context("arena vanished after creation")?
        .init_geometry(
            lobby.clone(),
            Location::new(world.clone(), 0.0, 90.0, 0.0),
            Location::new(world, 0.0, 80.0, 0.0),
            Bounds::new(Vec3::new(40.0, 0.0, 40.0), Vec3::new(-40.0, 128.0, -40.0)),
            Bounds::new(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 128.0, 10.0)),
        );

    let configured = api.guns().guns().next().map(|(id, _)| id);
    let gun = match configured {
        Some(id) => id,
        None => api.guns_mut().register(default_pistol()),
    };

    for (n, name) in ["alice", "bob", "carol", "dave"].into_iter().enumerate() {
        let id = PlayerId::random();
        api.register_player(id, name);
        api.host_mut().connect(id);
        api.join(arena, id).with_context(|| format!("{} could not join", name))?;
        info!("Player {} ({}) joined slot {}", name, id, n);
    }

    let players = players_in(&api, arena);
    Ok((api, arena, players, gun))
}

fn players_in(api: &GameApi<SimHost>, arena: ArenaId) -> Vec<PlayerId> {
    api.players().in_arena(arena).map(|p| p.id()).collect()
}

fn default_pistol() -> Gun {
    Gun {
        name: "Pistol".to_string(),
        appearance: Appearance::of("WOOD_HOE"),
        fire_rate: 300,
        reload_time_ms: 1_500,
        muzzle_velocity: 2.5,
        accuracy: 0.02,
        recoil: 0.95,
        magazine_size: 8,
        bullets_per_shot: 1,
        bullet: Bullet {
            name: "pistol_round".to_string(),
            projectile: ProjectileKind::Snowball,
            knockback: 0.3,
            min_damage: 3.0,
            max_damage: 5.0,
        },
    }
}

/// Wait for the round, fire one volley, then eliminate down to a winner.
async fn demo_round(
    api: &Mutex<GameApi<SimHost>>,
    arena: ArenaId,
    players: &[PlayerId],
    gun: GunId,
    period: Duration,
) -> anyhow::Result<()> {
    wait_for(api, arena, period, GameState::InGame).await;

    {
        let mut api = api.lock().await;
        for (i, shooter) in players.iter().enumerate() {
            let victim = players[(i + 1) % players.len()];
            let shot = match api.shoot(gun, (*shooter).into()) {
                Ok(shot) => shot,
                Err(e) => {
                    warn!("{} could not fire: {}", shooter, e);
                    continue;
                }
            };
            for projectile in shot.projectiles {
                let land = Vec3::new(0.0, 71.8, 0.0);
                match api.hit(projectile, victim.into(), land) {
                    Ok(hit) => info!("{} hit {} ({}, {:.1} damage)", shooter, victim, hit.shot_type, hit.damage),
                    Err(e) => warn!("hit not applied: {}", e),
                }
            }
        }

        // Everyone but the first player is knocked out
        for loser in players.iter().skip(1) {
            api.spectate(arena, *loser)?;
        }
    }

    wait_for(api, arena, period, GameState::End).await;
    info!("Arena {} round over", arena);
    Ok(())
}

async fn wait_for(api: &Mutex<GameApi<SimHost>>, arena: ArenaId, period: Duration, target: GameState) {
    loop {
        let state = api
            .lock()
            .await
            .arena(arena)
            .and_then(|a| a.session())
            .map(|s| s.state());
        match state {
            Some(state) if state == target || state == GameState::End => return,
            Some(_) => tokio::time::sleep(period).await,
            None => return,
        }
    }
}
