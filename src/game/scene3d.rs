use bevy::prelude::*;
use crate::game::config::{ConfigLoadSet, DebugSettings, InitialConfig};
use crate::game::lod::LodThresholds;
use crate::game::profiling::profile;
use crate::game::solid_object::{ObjectId, SolidObject, SolidObjectManager};
use crate::game::spatial_partition::{SpatialPartition, UpdateOptions};
use crate::game::terrain::{FlatTerrain, HeightField, HeightProvider};
use crate::profile_log;

/// Frames the hit flash stays on after the player is hit.
pub const HIT_FLASH_FRAMES: u32 = 10;

// ============================================================================
// Resources
// ============================================================================

/// Camera matrices used for culling. Set by whoever owns the camera.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub view: Mat4,
    pub projection: Mat4,
}

impl CameraView {
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            projection: Mat4::perspective_rh_gl(fov_y_radians, aspect, near, far),
        }
    }

    /// World-space camera position recovered from the view matrix.
    pub fn eye(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 50.0, 100.0), Vec3::ZERO, 60f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0)
    }
}

/// Fixed-step frame counter.
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick(pub u64);

/// Frames left on the player-hit flash.
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitFlash {
    pub frames_left: u32,
}

impl HitFlash {
    pub fn is_active(&self) -> bool {
        self.frames_left > 0
    }
}

/// Counters from the last fixed step.
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartitionStats {
    pub objects_bucketed: usize,
    pub visible_cells: usize,
    pub collision_pairs: usize,
    pub projectiles_spent: u32,
    pub npcs_destroyed: u32,
}

/// Ground under the 3D scene.
#[derive(Resource, Clone, Debug, PartialEq)]
pub enum SceneTerrain {
    Flat(FlatTerrain),
    Field(HeightField),
}

impl HeightProvider for SceneTerrain {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        match self {
            SceneTerrain::Flat(flat) => flat.height_at(x, z),
            SceneTerrain::Field(field) => field.height_at(x, z),
        }
    }
}

/// Half-extent given to projectiles spawned from [`FireProjectile`].
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSettings {
    pub radius: f32,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self { radius: InitialConfig::default().projectile_radius }
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitCause {
    Collision,
    Projectile,
}

/// The player was hit this frame.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHit {
    pub cause: HitCause,
}

/// Request to spawn a projectile at the start of the next movement phase.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq)]
pub struct FireProjectile {
    pub origin: Vec3,
    pub velocity: Vec3,
    pub source: Option<ObjectId>,
}

// ============================================================================
// Plugin
// ============================================================================

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum Scene3dSet {
    Prepare,     // Frame tick, rollback snapshot
    Movement,    // Projectile spawn and advance
    Bucketing,   // Rebuild partition cells
    Visibility,  // Frustum, LOD and per-cell collision
    Projectiles, // Projectile hits
    Cleanup,     // Hit flash, drop dead objects
}

pub struct Scene3dPlugin;

impl Plugin for Scene3dPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SolidObjectManager>();
        app.init_resource::<CameraView>();
        app.init_resource::<FrameTick>();
        app.init_resource::<HitFlash>();
        app.init_resource::<PartitionStats>();
        app.init_resource::<DebugSettings>();
        app.init_resource::<ProjectileSettings>();

        app.add_message::<PlayerHit>();
        app.add_message::<FireProjectile>();

        app.configure_sets(FixedUpdate, (
            Scene3dSet::Prepare,
            Scene3dSet::Movement,
            Scene3dSet::Bucketing,
            Scene3dSet::Visibility,
            Scene3dSet::Projectiles,
            Scene3dSet::Cleanup,
        ).chain());

        app.add_systems(Startup, init_scene3d_from_initial.after(ConfigLoadSet));
        app.add_systems(FixedUpdate, (
            advance_frame.in_set(Scene3dSet::Prepare),
            (spawn_projectiles, move_projectiles).chain().in_set(Scene3dSet::Movement),
            rebuild_partition.in_set(Scene3dSet::Bucketing),
            update_visibility.in_set(Scene3dSet::Visibility),
            check_projectile_hits.in_set(Scene3dSet::Projectiles),
            (apply_hit_flash, cleanup_objects).chain().in_set(Scene3dSet::Cleanup),
        ));
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Build the partition and terrain from `InitialConfig` and rest existing
/// objects on the ground. A terrain inserted before startup is kept.
pub fn init_scene3d_from_initial(
    mut commands: Commands,
    initial_config: Option<Res<InitialConfig>>,
    terrain: Option<Res<SceneTerrain>>,
    mut objects: ResMut<SolidObjectManager>,
) {
    let config = match &initial_config {
        Some(cfg) => cfg.as_ref(),
        None => {
            warn!("[SPATIAL] InitialConfig not found, using defaults");
            &InitialConfig::default()
        }
    };

    let terrain = match terrain {
        Some(terrain) => (*terrain).clone(),
        None => {
            let flat = SceneTerrain::Flat(FlatTerrain(config.terrain_height));
            commands.insert_resource(flat.clone());
            flat
        }
    };

    let (divisions_x, divisions_z) = config.partition_divisions;
    let partition = SpatialPartition::new(
        Vec2::from(config.partition_size),
        divisions_x,
        divisions_z,
        &terrain,
        LodThresholds::new(config.lod_high_distance, config.lod_medium_distance),
    );
    commands.insert_resource(partition);
    commands.insert_resource(ProjectileSettings { radius: config.projectile_radius });

    objects.snap_to_ground(&terrain);
    info!("[SPATIAL] Scene ready with {} objects", objects.len());
}

fn advance_frame(
    mut tick: ResMut<FrameTick>,
    mut flash: ResMut<HitFlash>,
    mut objects: ResMut<SolidObjectManager>,
) {
    tick.0 += 1;
    flash.frames_left = flash.frames_left.saturating_sub(1);
    objects.snapshot_positions();
}

fn spawn_projectiles(
    mut requests: MessageReader<FireProjectile>,
    settings: Res<ProjectileSettings>,
    mut objects: ResMut<SolidObjectManager>,
) {
    for request in requests.read() {
        let id = objects.add(SolidObject::projectile(
            request.origin,
            request.velocity,
            settings.radius,
            request.source,
        ));
        debug!("[OBJECTS] Projectile {} fired from {:?}", id, request.source);
    }
}

fn move_projectiles(time: Res<Time<Fixed>>, mut objects: ResMut<SolidObjectManager>) {
    objects.advance_projectiles(time.timestep().as_secs_f32());
}

#[profile(2)]
pub fn rebuild_partition(
    mut partition: ResMut<SpatialPartition>,
    objects: Res<SolidObjectManager>,
    mut stats: ResMut<PartitionStats>,
    tick: Res<FrameTick>,
) {
    stats.objects_bucketed = partition.reset(&objects);
    profile_log!(tick, "[SPATIAL] Bucketed {} objects", stats.objects_bucketed);
}

#[profile(2)]
pub fn update_visibility(
    mut partition: ResMut<SpatialPartition>,
    mut objects: ResMut<SolidObjectManager>,
    camera: Res<CameraView>,
    debug: Res<DebugSettings>,
    mut stats: ResMut<PartitionStats>,
    mut hits: MessageWriter<PlayerHit>,
    tick: Res<FrameTick>,
) {
    let options = UpdateOptions {
        lod_enabled: debug.lod_enabled,
        log_collision_pairs: debug.log_collision_pairs,
    };
    let report = partition.update(camera.view, camera.projection, camera.eye(), &mut objects, options);

    stats.visible_cells = partition.visible_count();
    stats.collision_pairs = report.pairs.len();
    if report.player_hit {
        hits.write(PlayerHit { cause: HitCause::Collision });
    }

    if debug.log_visibility_summary && tick.0 % 100 == 0 {
        info!(
            "[SPATIAL] Frame {}: {}/{} cells visible, {} pairs",
            tick.0,
            stats.visible_cells,
            partition.num_cells(),
            stats.collision_pairs
        );
    }
}

fn check_projectile_hits(
    mut objects: ResMut<SolidObjectManager>,
    mut stats: ResMut<PartitionStats>,
    mut hits: MessageWriter<PlayerHit>,
) {
    let report = objects.check_projectiles();
    stats.projectiles_spent = report.projectiles_spent;
    stats.npcs_destroyed = report.npcs_destroyed;
    if report.player_hit {
        hits.write(PlayerHit { cause: HitCause::Projectile });
    }
}

fn apply_hit_flash(mut hits: MessageReader<PlayerHit>, mut flash: ResMut<HitFlash>) {
    if hits.read().count() > 0 {
        flash.frames_left = HIT_FLASH_FRAMES;
    }
}

fn cleanup_objects(mut objects: ResMut<SolidObjectManager>) {
    objects.cleanup();
}
