use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};

/// Static configuration loaded once at startup. These values size the tile
/// map and the spatial partition and tune the actors, so changing them
/// mid-run would invalidate state built from them.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    // Simulation
    pub frame_rate: f64,

    // Tile map (2D)
    pub map_levels: usize,
    pub map_rows: usize,
    pub map_cols: usize,
    pub tile_size: (f32, f32),
    pub pathfinding_diagonal: bool,

    // Platformer physics and actors
    pub gravity: f32,
    pub player_walk_speed: f32,
    pub player_jump_speed: f32,
    pub enemy_walk_speed: f32,
    pub enemy_jump_speed: f32,
    pub player_lives: i32,
    pub player_max_health: i32,
    pub player_half_size: (f32, f32),

    // Spatial partition (3D)
    pub partition_size: (f32, f32),
    pub partition_divisions: (usize, usize),
    pub terrain_height: f32,
    pub lod_high_distance: f32,
    pub lod_medium_distance: f32,
    pub projectile_radius: f32,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            map_levels: 2,
            map_rows: 24,
            map_cols: 32,
            tile_size: (25.0, 25.0),
            pathfinding_diagonal: false,
            gravity: -300.0,
            player_walk_speed: 100.0,
            player_jump_speed: 200.0,
            enemy_walk_speed: 50.0,
            enemy_jump_speed: 150.0,
            player_lives: 3,
            player_max_health: 100,
            player_half_size: (12.5, 12.5),
            partition_size: (1000.0, 1000.0),
            partition_divisions: (10, 10),
            terrain_height: 0.0,
            lod_high_distance: 200.0,
            lod_medium_distance: 400.0,
            projectile_radius: 0.5,
        }
    }
}

/// Runtime configuration that can be hot-reloaded. Debug switches only;
/// nothing here changes simulation results except `lod_enabled`, which
/// only affects the detail level copied to objects.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub log_collision_pairs: bool,
    pub log_visibility_summary: bool,
    pub lod_enabled: bool,
}

/// Current values of the hot-reloadable switches.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugSettings {
    pub log_collision_pairs: bool,
    pub log_visibility_summary: bool,
    pub lod_enabled: bool,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self { log_collision_pairs: false, log_visibility_summary: false, lod_enabled: true }
    }
}

impl From<&GameConfig> for DebugSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            log_collision_pairs: config.log_collision_pairs,
            log_visibility_summary: config.log_visibility_summary,
            lod_enabled: config.lod_enabled,
        }
    }
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

/// Startup systems that load `InitialConfig`. Scene setup runs after it.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct ConfigLoadSet;

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
           .init_resource::<DebugSettings>()
           .add_systems(Startup, (load_initial_config, apply_frame_rate, setup_runtime_config).chain().in_set(ConfigLoadSet))
           .add_systems(Update, update_runtime_config);
    }
}

/// Load static initial configuration synchronously at startup.
/// A config inserted before startup wins over the file.
pub fn load_initial_config(mut commands: Commands, existing: Option<Res<InitialConfig>>) {
    if existing.is_some() {
        info!("[CONFIG] Using pre-inserted InitialConfig");
        return;
    }

    match read_initial_config(INITIAL_CONFIG_PATH) {
        Ok(config) => {
            info!("[CONFIG] Loaded initial config from {}", INITIAL_CONFIG_PATH);
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("[CONFIG] {}", e);
            error!("[CONFIG] Using default InitialConfig");
            commands.insert_resource(InitialConfig::default());
        }
    }
}

/// Read and parse an `InitialConfig` RON file.
pub fn read_initial_config(path: &str) -> Result<InitialConfig, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path, e))?;
    ron::from_str::<InitialConfig>(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path, e))
}

fn apply_frame_rate(config: Option<Res<InitialConfig>>, mut fixed_time: ResMut<Time<Fixed>>) {
    // Commands from load_initial_config are applied by the chain
    let rate = config.map(|c| c.frame_rate).unwrap_or(InitialConfig::default().frame_rate);
    if rate > 0.0 {
        fixed_time.set_timestep_hz(rate);
        info!("[CONFIG] Fixed timestep set to {} Hz", rate);
    } else {
        warn!("[CONFIG] Ignoring non-positive frame rate {}", rate);
    }
}

/// Load runtime configuration asynchronously (can be hot-reloaded).
fn setup_runtime_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

/// Copy hot-reloaded switches into `DebugSettings`.
pub fn update_runtime_config(
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut debug: ResMut<DebugSettings>,
    mut events: MessageReader<AssetEvent<GameConfig>>,
) {
    let Some(config_handle) = config_handle else {
        return;
    };
    for event in events.read() {
        if event.is_modified(config_handle.0.id()) || event.is_loaded_with_dependencies(config_handle.0.id()) {
            if let Some(config) = game_configs.get(&config_handle.0) {
                *debug = DebugSettings::from(config);
                let settings: &DebugSettings = &debug;
                info!("[CONFIG] Runtime config loaded/updated: {:?}", settings);
            }
        }
    }
}
