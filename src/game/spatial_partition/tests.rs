use super::*;
use crate::game::physics2d::VerticalStatus;
use crate::game::solid_object::{ObjectKind, SolidObject, SolidObjectManager};
use crate::game::terrain::{FlatTerrain, HeightField};

/// 100x100 partition, 10x10 cells of 10 units, LOD at 20/40.
fn partition() -> SpatialPartition {
    SpatialPartition::new(Vec2::splat(100.0), 10, 10, &FlatTerrain(0.0), LodThresholds::new(20.0, 40.0))
}

struct Camera {
    view: Mat4,
    projection: Mat4,
    eye: Vec3,
}

/// Standing at the origin, looking down -X.
fn side_camera() -> Camera {
    let eye = Vec3::new(0.0, 5.0, 0.0);
    Camera {
        view: Mat4::look_at_rh(eye, Vec3::new(-10.0, 5.0, 0.0), Vec3::Y),
        projection: Mat4::perspective_rh_gl(60f32.to_radians(), 1.0, 0.1, 1000.0),
        eye,
    }
}

/// High above one corner, looking at the whole partition.
fn overview_camera() -> Camera {
    let eye = Vec3::new(0.0, 80.0, 80.0);
    Camera {
        view: Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y),
        projection: Mat4::perspective_rh_gl(60f32.to_radians(), 1.0, 0.1, 1000.0),
        eye,
    }
}

fn run(partition: &mut SpatialPartition, objects: &mut SolidObjectManager, camera: &Camera) -> CellCollisionReport {
    partition.reset(objects);
    partition.update(camera.view, camera.projection, camera.eye, objects, UpdateOptions::default())
}

/// Place an object so that it moved from `from` to `to` this frame.
fn moved(objects: &mut SolidObjectManager, kind: ObjectKind, from: Vec3, to: Vec3) -> ObjectId {
    let mut object = SolidObject::cube(kind, to, 1.0);
    object.previous_position = from;
    objects.add(object)
}

// ============================================================================
// Bucketing
// ============================================================================

#[test]
fn test_cell_index_is_half_open() {
    let p = partition();
    assert_eq!(p.cell_index(Vec3::new(-50.0, 0.0, -50.0)), Some((0, 0)));
    assert_eq!(p.cell_index(Vec3::new(49.99, 7.0, 49.99)), Some((9, 9)));
    assert_eq!(p.cell_index(Vec3::new(-5.0, 0.0, 15.0)), Some((4, 6)));
    assert_eq!(p.cell_index(Vec3::new(50.0, 0.0, 0.0)), None);
    assert_eq!(p.cell_index(Vec3::new(0.0, 0.0, -50.01)), None);
    assert_eq!(p.cell_index(Vec3::new(-50.5, 0.0, 0.0)), None, "no truncation toward zero");
}

#[test]
fn test_straddling_object_is_in_every_touched_cell() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    let edge = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(0.0, 0.0, 5.0), 1.0));
    let corner = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(10.0, 0.0, 10.0), 1.0));
    let inside = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(-25.0, 0.0, -25.0), 1.0));

    p.reset(&objects);

    assert_eq!(p.cells_containing(edge), vec![(4, 5), (5, 5)]);
    assert_eq!(p.cells_containing(corner), vec![(5, 5), (5, 6), (6, 5), (6, 6)]);
    assert_eq!(p.cells_containing(inside), vec![(2, 2)]);
    assert!(p.cell(5, 5).unwrap().contains(edge));
}

#[test]
fn test_out_of_grid_corners_are_skipped() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    let outside = objects.add(SolidObject::cube(ObjectKind::Structure, Vec3::new(70.0, 0.0, 0.0), 1.0));
    let on_edge = objects.add(SolidObject::cube(ObjectKind::Structure, Vec3::new(49.5, 0.0, 0.5), 1.0));

    p.reset(&objects);

    assert!(p.cells_containing(outside).is_empty());
    assert_eq!(p.cells_containing(on_edge), vec![(9, 4), (9, 5)]);
}

#[test]
fn test_reset_keeps_only_active_objects() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    let a = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(-25.0, 0.0, -25.0), 1.0));
    let b = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(25.0, 0.0, 25.0), 1.0));
    let bullet = objects.add(SolidObject::projectile(Vec3::new(5.0, 0.0, 5.0), Vec3::X, 0.1, None));
    assert_eq!(p.reset(&objects), 2, "projectiles are not bucketed");
    assert!(p.cells_containing(bullet).is_empty());

    objects.get_mut(b).unwrap().active = false;
    objects.get_mut(a).unwrap().position = Vec3::new(-35.0, 0.0, -25.0);
    p.reset(&objects);

    assert_eq!(p.cells_containing(a), vec![(1, 2)]);
    assert!(p.cells_containing(b).is_empty());
    let total: usize = (0..10)
        .flat_map(|row| (0..10).map(move |col| (row, col)))
        .map(|(row, col)| p.cell(row, col).unwrap().objects().len())
        .sum();
    assert_eq!(total, 1);
}

#[test]
fn test_cells_follow_terrain() {
    let flat = SpatialPartition::new(Vec2::splat(100.0), 10, 10, &FlatTerrain(2.0), LodThresholds::default());
    let cell = flat.cell(0, 0).unwrap();
    assert_eq!(cell.bottom_left, Vec3::new(-50.0, 2.0, -50.0));
    assert_eq!(cell.top_right, Vec3::new(-40.0, 2.0, -40.0));

    let slope = HeightField::from_fn(Vec2::splat(100.0), 11, 11, |x, _| x * 0.1).unwrap();
    let sloped = SpatialPartition::new(Vec2::splat(100.0), 10, 10, &slope, LodThresholds::default());
    let cell = sloped.cell(9, 0).unwrap();
    assert!((cell.bottom_left.y - 4.0).abs() < 1e-4);
    assert!((cell.top_right.y - 5.0).abs() < 1e-4);
    assert!((cell.bottom_right_height - 5.0).abs() < 1e-4);
    assert!((cell.top_left_height - 4.0).abs() < 1e-4);
}

#[test]
fn test_zero_divisions_become_one() {
    let p = SpatialPartition::new(Vec2::splat(10.0), 0, 0, &FlatTerrain(0.0), LodThresholds::default());
    assert_eq!(p.num_cells(), 1);
    assert_eq!(p.cell_index(Vec3::ZERO), Some((0, 0)));
}

// ============================================================================
// Visibility and LOD
// ============================================================================

#[test]
fn test_cells_behind_camera_are_culled() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    run(&mut p, &mut objects, &side_camera());

    assert!(p.is_cell_visible(0, 5), "straight ahead");
    assert!(p.is_cell_visible(4, 5));
    assert!(!p.is_cell_visible(9, 5), "behind");
    assert!(!p.is_cell_visible(0, 0), "outside the field of view");
    assert_eq!(p.visible_count(), p.visible_cells().len());
}

#[test]
fn test_player_cells_are_forced_visible() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    run(&mut p, &mut objects, &side_camera());
    assert!(!p.is_cell_visible(7, 4));

    // Player standing behind the camera
    let player = objects.add(SolidObject::cube(ObjectKind::Player, Vec3::new(30.0, 0.0, 0.0), 1.0));
    run(&mut p, &mut objects, &side_camera());

    for (row, col) in [(7, 4), (7, 5), (8, 4), (8, 5)] {
        assert!(p.is_cell_visible(row, col), "cell ({}, {})", row, col);
    }
    assert!(objects.get(player).unwrap().visible);
}

#[test]
fn test_lod_follows_distance_from_eye() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    let far = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(-45.0, 0.0, 5.0), 1.0).with_lod());
    let mid = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(-25.0, 0.0, 5.0), 1.0).with_lod());
    let fixed = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(-44.0, 0.0, 8.0), 0.5));
    let hidden = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(45.0, 0.0, 5.0), 1.0).with_lod());

    run(&mut p, &mut objects, &side_camera());

    assert_eq!(p.cell(0, 5).unwrap().detail_level(), DetailLevel::Low);
    assert_eq!(p.cell(2, 5).unwrap().detail_level(), DetailLevel::Medium);
    assert_eq!(p.cell(4, 5).unwrap().detail_level(), DetailLevel::High);

    assert_eq!(objects.get(far).unwrap().detail_level, DetailLevel::Low);
    assert_eq!(objects.get(mid).unwrap().detail_level, DetailLevel::Medium);
    assert_eq!(objects.get(fixed).unwrap().detail_level, DetailLevel::High, "LOD not enabled");
    assert!(objects.get(fixed).unwrap().visible);
    assert!(!objects.get(hidden).unwrap().visible);
}

#[test]
fn test_lod_switch_off_leaves_objects_alone() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    let far = objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(-45.0, 0.0, 5.0), 1.0).with_lod());
    let camera = side_camera();

    p.reset(&objects);
    let options = UpdateOptions { lod_enabled: false, ..default() };
    p.update(camera.view, camera.projection, camera.eye, &mut objects, options);

    assert_eq!(objects.get(far).unwrap().detail_level, DetailLevel::High);
    assert!(objects.get(far).unwrap().visible);
}

// ============================================================================
// Per-cell collision
// ============================================================================

#[test]
fn test_player_bump_rolls_back_both_and_flags_hit() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    let player = moved(&mut objects, ObjectKind::Player, Vec3::new(-28.0, 0.0, 5.0), Vec3::new(-25.0, 0.0, 5.0));
    let npc = moved(&mut objects, ObjectKind::Npc, Vec3::new(-21.0, 0.0, 5.0), Vec3::new(-24.0, 0.0, 5.0));

    let report = run(&mut p, &mut objects, &side_camera());

    assert!(report.player_hit);
    assert_eq!(report.pairs, vec![CollisionPair { mover: player, other: npc, response: PairResponse::PlayerBump }]);
    assert_eq!(objects.get(player).unwrap().position, Vec3::new(-28.0, 0.0, 5.0));
    assert_eq!(objects.get(npc).unwrap().position, Vec3::new(-21.0, 0.0, 5.0));
}

#[test]
fn test_creature_bump_does_not_flag_hit() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    let npc = moved(&mut objects, ObjectKind::Npc, Vec3::new(-28.0, 0.0, 5.0), Vec3::new(-25.0, 0.0, 5.0));
    let other = moved(&mut objects, ObjectKind::Other, Vec3::new(-21.0, 0.0, 5.0), Vec3::new(-24.0, 0.0, 5.0));

    let report = run(&mut p, &mut objects, &side_camera());

    assert!(!report.player_hit);
    assert_eq!(report.pairs[0].response, PairResponse::CreatureBump);
    assert_eq!(objects.get(npc).unwrap().position.x, -28.0);
    assert_eq!(objects.get(other).unwrap().position.x, -21.0);
}

#[test]
fn test_structure_added_first_still_blocks_mover() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    let wall = objects.add(SolidObject::cube(ObjectKind::Structure, Vec3::new(-25.0, 0.0, 5.0), 1.0));
    let npc = moved(&mut objects, ObjectKind::Npc, Vec3::new(-28.0, 0.0, 5.0), Vec3::new(-26.5, 0.0, 5.0));

    let report = run(&mut p, &mut objects, &side_camera());

    assert_eq!(report.pairs, vec![CollisionPair { mover: npc, other: wall, response: PairResponse::StructureBlock }]);
    assert_eq!(objects.get(npc).unwrap().position.x, -28.0);
    assert_eq!(objects.get(wall).unwrap().position.x, -25.0);
}

#[test]
fn test_player_landing_on_structure_stops_fall() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    let player = moved(&mut objects, ObjectKind::Player, Vec3::new(-25.0, 3.0, 5.0), Vec3::new(-25.0, 1.5, 5.0));
    objects.get_mut(player).unwrap().vertical_status = VerticalStatus::Fall;
    objects.add(SolidObject::cube(ObjectKind::Structure, Vec3::new(-25.0, 0.0, 5.0), 1.0));

    let report = run(&mut p, &mut objects, &side_camera());

    assert!(report.player_hit);
    let player = objects.get(player).unwrap();
    assert_eq!(player.vertical_status, VerticalStatus::Idle);
    assert_eq!(player.position.y, 3.0);
}

#[test]
fn test_structures_and_separated_objects_are_ignored() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    objects.add(SolidObject::cube(ObjectKind::Structure, Vec3::new(-25.0, 0.0, 5.0), 1.0));
    objects.add(SolidObject::cube(ObjectKind::Structure, Vec3::new(-24.0, 0.0, 5.0), 1.0));
    objects.add(SolidObject::cube(ObjectKind::Npc, Vec3::new(-25.0, 5.0, 5.0), 1.0));

    let report = run(&mut p, &mut objects, &side_camera());
    assert!(report.pairs.is_empty());
}

#[test]
fn test_pair_is_resolved_once_across_shared_cells() {
    let mut p = partition();
    let mut objects = SolidObjectManager::new();
    // Both straddle rows 4 and 5
    moved(&mut objects, ObjectKind::Npc, Vec3::new(-2.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 5.0));
    moved(&mut objects, ObjectKind::Npc, Vec3::new(2.0, 0.0, 5.0), Vec3::new(0.5, 0.0, 5.0));

    let report = run(&mut p, &mut objects, &overview_camera());

    assert!(p.is_cell_visible(4, 5) && p.is_cell_visible(5, 5));
    assert_eq!(report.pairs.len(), 1);
}

#[test]
fn test_pair_policy_table() {
    use ObjectKind::*;
    assert_eq!(collision::pair_response(Player, Npc), Some((PairResponse::PlayerBump, false)));
    assert_eq!(collision::pair_response(Other, Player), Some((PairResponse::PlayerBump, true)));
    assert_eq!(collision::pair_response(Npc, Other), Some((PairResponse::CreatureBump, false)));
    assert_eq!(collision::pair_response(Structure, Player), Some((PairResponse::StructureBlock, true)));
    assert_eq!(collision::pair_response(Structure, Structure), None);
    assert_eq!(collision::pair_response(Player, Projectile), None);
}

#[test]
fn test_update_is_deterministic() {
    let mut objects = SolidObjectManager::new();
    let mut rng = fastrand::Rng::with_seed(7);
    for i in 0..60 {
        let kind = match i % 4 {
            0 => ObjectKind::Npc,
            1 => ObjectKind::Other,
            2 => ObjectKind::Structure,
            _ => ObjectKind::Npc,
        };
        let to = Vec3::new(rng.f32() * 90.0 - 45.0, 0.0, rng.f32() * 90.0 - 45.0);
        let from = to + Vec3::new(rng.f32() - 0.5, 0.0, rng.f32() - 0.5) * 4.0;
        moved(&mut objects, kind, from, to);
    }
    moved(&mut objects, ObjectKind::Player, Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));

    let mut p1 = partition();
    let mut p2 = partition();
    let mut o1 = SolidObjectManager::new();
    let mut o2 = SolidObjectManager::new();
    for (_, object) in objects.iter() {
        o1.add(object.clone());
        o2.add(object.clone());
    }

    let camera = overview_camera();
    let r1 = run(&mut p1, &mut o1, &camera);
    let r2 = run(&mut p2, &mut o2, &camera);

    assert_eq!(p1.visible_cells(), p2.visible_cells());
    assert_eq!(r1, r2);
    let positions = |o: &SolidObjectManager| o.iter().map(|(_, x)| x.position).collect::<Vec<_>>();
    assert_eq!(positions(&o1), positions(&o2));
}
