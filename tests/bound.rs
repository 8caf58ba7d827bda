mod common;

use splat_state::{Aabb, BoundKind, Error, PointState, SplatEvents, glam::*};

use crate::common::{RecordingUpload, point_cloud, set_flag};

#[test]
fn test_aabb_from_points_should_enclose_points() {
    let aabb = Aabb::from_points([vec3(1.0, -2.0, 3.0), vec3(-1.0, 4.0, 5.0)]);

    assert_eq!(aabb.min(), vec3(-1.0, -2.0, 3.0));
    assert_eq!(aabb.max(), vec3(1.0, 4.0, 5.0));
    assert!(!aabb.is_degenerate());
}

#[test]
fn test_aabb_from_points_when_empty_should_be_degenerate() {
    let aabb = Aabb::from_points(std::iter::empty());

    assert_eq!(aabb, Aabb::EMPTY);
    assert!(aabb.is_degenerate());
}

#[test]
fn test_aabb_transformed_should_enclose_rotated_box() {
    let aabb = Aabb::from_min_max(vec3(-1.0, -2.0, -3.0), vec3(1.0, 2.0, 3.0));
    let transform = Mat4::from_translation(vec3(10.0, 0.0, 0.0))
        * Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);

    let transformed = aabb.transformed(&transform);

    assert!(transformed.center.abs_diff_eq(vec3(10.0, 0.0, 0.0), 1e-5));
    assert!(transformed.half_extent.abs_diff_eq(vec3(2.0, 1.0, 3.0), 1e-5));
}

#[test]
fn test_local_bound_should_only_include_live_points() {
    let mut cloud = point_cloud(5);
    let mut upload = RecordingUpload::default();
    set_flag(&mut cloud, &[0, 4], PointState::DELETED);
    cloud.commit_state(PointState::DELETED, &mut upload);

    let bound = cloud.local_bound();

    assert_eq!(bound.min(), vec3(1.0, -3.0, 7.0));
    assert_eq!(bound.max(), vec3(3.0, 1.0, 9.0));
}

#[test]
fn test_local_bound_when_read_twice_should_not_recompute() {
    let mut cloud = point_cloud(8);

    let first = cloud.local_bound();
    let second = cloud.local_bound();

    assert_eq!(first, second);
    assert_eq!(cloud.bound_recompute_count(BoundKind::Local), 1);
    assert!(!cloud.is_bound_dirty(BoundKind::Local));
}

#[test]
fn test_selection_bound_should_exclude_locked_points() {
    let mut cloud = point_cloud(5);
    let mut upload = RecordingUpload::default();
    set_flag(&mut cloud, &[1, 3], PointState::SELECTED);
    set_flag(&mut cloud, &[3], PointState::LOCKED);
    cloud.commit_state(PointState::SELECTED | PointState::LOCKED, &mut upload);

    let bound = cloud.selection_bound();

    assert_eq!(bound.center, vec3(1.0, -3.0, 9.0));
    assert!(bound.is_degenerate());
}

#[test]
fn test_commit_state_should_cascade_dirty_to_all_bounds() {
    let mut cloud = point_cloud(4);
    let mut upload = RecordingUpload::default();
    cloud.selection_bound();
    cloud.world_bound();
    cloud.take_events();

    set_flag(&mut cloud, &[2], PointState::SELECTED);
    cloud.commit_state(PointState::SELECTED, &mut upload);

    assert!(cloud.is_bound_dirty(BoundKind::Selection));
    assert!(cloud.is_bound_dirty(BoundKind::Local));
    assert!(cloud.is_bound_dirty(BoundKind::World));
    assert!(cloud.take_events().contains(SplatEvents::SCENE_BOUND_DIRTY));
}

#[test]
fn test_set_world_transform_should_only_dirty_world_bound() {
    let mut cloud = point_cloud(4);
    cloud.selection_bound();
    cloud.world_bound();
    cloud.take_events();

    cloud.set_world_transform(Mat4::from_translation(vec3(0.0, 100.0, 0.0)));

    assert!(!cloud.is_bound_dirty(BoundKind::Selection));
    assert!(!cloud.is_bound_dirty(BoundKind::Local));
    assert!(cloud.is_bound_dirty(BoundKind::World));
    assert_eq!(
        cloud.take_events(),
        SplatEvents::RENDER | SplatEvents::SCENE_BOUND_DIRTY
    );

    let local = cloud.local_bound();
    let world = cloud.world_bound();

    assert_eq!(world.center, local.center + vec3(0.0, 100.0, 0.0));
    assert_eq!(world.half_extent, local.half_extent);
    assert_eq!(cloud.bound_recompute_count(BoundKind::Local), 1);
    assert_eq!(cloud.bound_recompute_count(BoundKind::World), 2);
}

#[test]
fn test_edit_positions_should_recompute_local_bound() {
    let mut cloud = point_cloud(3);
    let before = cloud.local_bound();

    cloud.edit_positions(|positions| positions[0] = vec3(-50.0, 0.0, 0.0));
    let after = cloud.local_bound();

    assert_ne!(before, after);
    assert_eq!(after.min().x, -50.0);
    assert_eq!(cloud.bound_recompute_count(BoundKind::Local), 2);
}

#[test]
fn test_replace_positions_should_recompute_local_bound() {
    let mut cloud = point_cloud(2);
    cloud.local_bound();
    cloud.take_events();

    cloud
        .replace_positions(vec![vec3(-1.0, -2.0, -3.0), vec3(1.0, 2.0, 3.0)])
        .expect("replace positions");

    assert_eq!(
        cloud.take_events(),
        SplatEvents::RENDER | SplatEvents::SCENE_BOUND_DIRTY
    );
    assert_eq!(
        cloud.local_bound(),
        Aabb::from_min_max(vec3(-1.0, -2.0, -3.0), vec3(1.0, 2.0, 3.0))
    );
    assert_eq!(cloud.bound_recompute_count(BoundKind::Local), 2);
}

#[test]
fn test_replace_positions_when_count_mismatched_should_return_error() {
    let mut cloud = point_cloud(3);
    let before = cloud.positions().to_vec();
    cloud.local_bound();

    let result = cloud.replace_positions(vec![Vec3::ZERO; 2]);

    assert!(matches!(
        result,
        Err(Error::PositionCountMismatch {
            expected: 3,
            actual: 2,
        })
    ));
    assert_eq!(cloud.positions(), before.as_slice());
    assert!(!cloud.is_bound_dirty(BoundKind::Local));
}

#[test]
fn test_world_bound_when_all_deleted_should_be_degenerate() {
    let mut cloud = point_cloud(3);
    let mut upload = RecordingUpload::default();
    cloud.set_world_transform(Mat4::from_scale(Vec3::splat(4.0)));
    set_flag(&mut cloud, &[0, 1, 2], PointState::DELETED);
    cloud.commit_state(PointState::DELETED, &mut upload);

    assert!(cloud.local_bound().is_degenerate());
    assert!(cloud.world_bound().is_degenerate());
}
