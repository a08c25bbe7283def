use bevy::prelude::*;

use bevy::app::ScheduleRunnerPlugin;
use bevy::asset::AssetPlugin;

use gdt_framework::game::GamePlugin;
use gdt_framework::game::platformer::{GameOutcome, Player2D, PlayerIntent};
use gdt_framework::game::scene3d::{FireProjectile, FrameTick, HitFlash, PartitionStats};
use gdt_framework::game::solid_object::{ObjectKind, SolidObject, SolidObjectManager};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed steps to run before the demo exits.
const DEMO_FRAMES: u64 = 600;

const LOG_DIR: &str = "logs";
/// Run logs are `gdt_demo_<timestamp>.log`, so name order is run order.
const LOG_PREFIX: &str = "gdt_demo_";
/// Run logs left behind, including the one being started.
const LOGS_KEPT: usize = 25;

/// Send tracing output to stdout and to a fresh run log. Returns the run
/// log's path.
fn init_logging() -> io::Result<PathBuf> {
    let dir = Path::new(LOG_DIR);
    fs::create_dir_all(dir)?;
    let pruned = prune_run_logs(dir, LOG_PREFIX, LOGS_KEPT.saturating_sub(1))?;

    let name = format!("{}{}.log", LOG_PREFIX, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_log = tracing_appender::rolling::never(dir, &name);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gdt_framework=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(run_log).with_ansi(false))
        .with(fmt::layer().with_writer(io::stdout).with_target(false))
        .init();

    if pruned > 0 {
        info!("[LOGS] Removed {} old run logs from {}", pruned, LOG_DIR);
    }
    Ok(dir.join(name))
}

/// Delete the oldest run logs in `dir` until at most `keep` remain.
/// Files without `prefix` or the `.log` extension are left alone.
fn prune_run_logs(dir: &Path, prefix: &str, keep: usize) -> io::Result<usize> {
    let mut runs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(prefix) && name.ends_with(".log"))
        })
        .collect();
    runs.sort();

    let stale = runs.len().saturating_sub(keep);
    for path in &runs[..stale] {
        fs::remove_file(path)?;
    }
    Ok(stale)
}

/// A small 3D scene: the player, a ring of NPCs and a few walls.
fn demo_objects() -> SolidObjectManager {
    let mut objects = SolidObjectManager::new();
    let player = objects.add(SolidObject::cube(ObjectKind::Player, Vec3::new(0.0, 0.0, 20.0), 1.0));

    for i in 0..16 {
        let angle = i as f32 / 16.0 * std::f32::consts::TAU;
        let position = Vec3::new(angle.cos() * 120.0, 0.0, angle.sin() * 120.0);
        objects.add(SolidObject::cube(ObjectKind::Npc, position, 2.0).with_lod());
    }
    for x in [-60.0, 0.0, 60.0] {
        objects.add(SolidObject::new(
            ObjectKind::Structure,
            Vec3::new(x, 0.0, -40.0),
            Vec3::new(-10.0, 0.0, -2.0),
            Vec3::new(10.0, 8.0, 2.0),
        ));
    }

    info!("Demo scene: player {} and {} objects", player, objects.len());
    objects
}

/// Walk right, hop now and then, and fire toward the NPC ring.
fn drive_demo(
    tick: Res<FrameTick>,
    mut intent: ResMut<PlayerIntent>,
    objects: Res<SolidObjectManager>,
    mut fire: MessageWriter<FireProjectile>,
) {
    intent.walk = 1.0;
    intent.jump = tick.0 % 90 == 0;

    if tick.0 % 30 == 0 {
        if let Some(player) = objects.player() {
            if let Some(object) = objects.get(player) {
                fire.write(FireProjectile {
                    origin: object.position,
                    velocity: Vec3::new(0.0, 0.0, 150.0),
                    source: Some(player),
                });
            }
        }
    }
}

fn exit_after_frames(
    tick: Res<FrameTick>,
    outcome: Res<GameOutcome>,
    stats: Res<PartitionStats>,
    flash: Res<HitFlash>,
    players: Query<&Player2D>,
    mut exit: MessageWriter<AppExit>,
) {
    if tick.0 < DEMO_FRAMES && !outcome.is_over() {
        return;
    }
    for player in players.iter() {
        info!(
            "Platformer: {:?}, lives {}, health {}, trees {}",
            *outcome, player.lives, player.health, player.trees
        );
    }
    info!("Scene: {:?}, hit flash {}", *stats, flash.is_active());
    exit.write(AppExit::Success);
}

fn main() {
    let run_log = init_logging().expect("cannot set up run logging");
    info!("[LOGS] GDT platformer + spatial partition demo, {} frames", DEMO_FRAMES);
    info!("[LOGS] Writing run log to {}", run_log.display());

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))))
        .add_plugins(AssetPlugin::default())
        .add_plugins(GamePlugin::default())
        .insert_resource(demo_objects())
        .add_systems(FixedUpdate, drive_demo.before(gdt_framework::game::platformer::Scene2dSet::Movement))
        .add_systems(Update, exit_after_frames)
        .run();
}
