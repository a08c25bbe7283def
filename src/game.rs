use bevy::prelude::*;
use std::path::PathBuf;

pub mod config;
pub mod tile_map;
pub mod pathfinding;
pub mod tile_collision;
pub mod physics2d;
pub mod platformer;
pub mod bounds;
pub mod frustum;
pub mod lod;
pub mod terrain;
pub mod solid_object;
pub mod spatial_partition;
pub mod scene3d;
pub mod profiling;

use config::GameConfigPlugin;
use platformer::Scene2dPlugin;
use scene3d::Scene3dPlugin;

/// Config loading plus both scenes. Needs an `AssetPlugin` for the
/// hot-reloadable runtime config.
pub struct GamePlugin {
    pub level_files: Vec<PathBuf>,
}

impl Default for GamePlugin {
    fn default() -> Self {
        Self {
            level_files: vec![
                PathBuf::from("assets/maps/level_0.csv"),
                PathBuf::from("assets/maps/level_1.csv"),
            ],
        }
    }
}

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            GameConfigPlugin,
            Scene2dPlugin { level_files: self.level_files.clone() },
            Scene3dPlugin,
        ));
    }
}
