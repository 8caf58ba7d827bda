use splat_state::{PointCloud, PointState, SplatModel, glam::*};

use super::RecordingSorter;

pub fn position_with_seed(seed: u32) -> Vec3 {
    let base = seed as f32;
    Vec3::new(base, base * 2.0 - 5.0, 10.0 - base)
}

pub fn point_cloud(count: u32) -> PointCloud {
    PointCloud::new((0..count).map(position_with_seed).collect())
}

pub fn model(count: u32) -> SplatModel<RecordingSorter> {
    SplatModel::new(
        point_cloud(count),
        RecordingSorter::default(),
        UVec2::new(1280, 720),
        RecordingSorter::default(),
        UVec2::new(512, 512),
    )
}

pub fn set_flag(cloud: &mut PointCloud, indices: &[usize], flag: PointState) {
    let states = cloud.states_mut();
    for &i in indices {
        states[i].insert(flag);
    }
}

pub fn clear_flag(cloud: &mut PointCloud, indices: &[usize], flag: PointState) {
    let states = cloud.states_mut();
    for &i in indices {
        states[i].remove(flag);
    }
}
