use std::sync::Arc;

use clap::Parser;
use glam::*;

use splat_state::{self as ss, BufferUpload, InstanceKind, MirrorBuffer, PointState};

/// The command line arguments.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "\
    Walk a synthetic point cloud through select, delete and undelete commits.\n\
    \n\
    With --gpu, the state and transform index mirrors are written to wgpu buffers.\
    "
)]
struct Args {
    /// Number of points.
    #[arg(short, long, default_value_t = 10)]
    count: u32,

    /// Mirror to wgpu buffers instead of logging uploads.
    #[arg(long)]
    gpu: bool,
}

/// A sorter that only logs what it is given.
#[derive(Debug)]
struct LogSorter(&'static str);

impl ss::SpatialSorter for LogSorter {
    fn set_compaction_mapping(&mut self, mapping: Option<Arc<[u32]>>) {
        match mapping {
            Some(mapping) => log::info!("{} sorter mapping: {:?}", self.0, mapping),
            None => log::info!("{} sorter mapping: all points", self.0),
        }
    }

    fn set_centers(&mut self, centers: &[Vec3]) {
        log::info!("{} sorter centers: {}", self.0, centers.len());
    }
}

/// An uploader that only logs the upload sizes.
struct LogUpload;

impl BufferUpload for LogUpload {
    fn upload_bytes(&mut self, buffer: MirrorBuffer, bytes: &[u8]) {
        log::debug!("Uploading {} bytes to {buffer:?}", bytes.len());
    }
}

fn report(model: &mut ss::SplatModel<LogSorter>, appearance: &ss::SplatAppearance, step: &str) {
    model.sync_instances(appearance);
    let counts = model.cloud().counts();
    let local = model.cloud_mut().local_bound();
    log::info!(
        "{step}: live {}, deleted {}, locked {}, selected {}, change counter {}, \
        local bound {:?} ± {:?}, events {:?}",
        counts.live,
        counts.deleted,
        counts.locked,
        counts.selected,
        model.cloud().change_counter(),
        local.center,
        local.half_extent,
        model.take_events(),
    );
}

fn run(model: &mut ss::SplatModel<LogSorter>, upload: &mut impl BufferUpload) {
    let appearance = ss::SplatAppearance::default();

    model.cloud_mut().commit_state(PointState::empty(), upload);
    report(model, &appearance, "Loaded");

    let deleted = [2, 5, 7].map(|i: u32| i % model.cloud().point_count().max(1));
    model.select(&deleted, upload);
    model.delete_selected(upload);
    report(model, &appearance, "Deleted");

    model.select(&[3], upload);
    let selection = model.cloud_mut().selection_bound();
    report(model, &appearance, "Selected");
    log::info!("Selection bound {:?}", selection.center);

    model.edit_state(PointState::DELETED, upload, |states| {
        if let Some(state) = states.get_mut(5) {
            state.remove(PointState::DELETED);
        }
    });
    report(model, &appearance, "Undeleted");

    model
        .instance_mut(InstanceKind::Snapshot)
        .set_viewport(UVec2::new(256, 256));
    model.select_all(upload);
    model.delete_selected(upload);
    report(model, &appearance, "Deleted all");
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let positions = (0..args.count)
        .map(|i| {
            let t = i as f32;
            Vec3::new(t.cos() * t, t.sin() * t, t * 0.1)
        })
        .collect();

    let mut model = ss::SplatModel::new(
        ss::PointCloud::new(positions),
        LogSorter("Primary"),
        UVec2::new(1280, 720),
        LogSorter("Snapshot"),
        UVec2::new(512, 512),
    );

    if !args.gpu {
        run(&mut model, &mut LogUpload);
        return;
    }

    let (device, queue) = pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .expect("adapter");

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                ..Default::default()
            })
            .await
            .expect("device")
    });

    let buffers = ss::PointCloudBuffers::new(&device, &queue, model.cloud());
    run(&mut model, &mut buffers.upload(&queue));
    queue.submit([]);

    log::info!(
        "State buffer {} bytes, transform index buffer {} bytes",
        buffers.state_buffer.buffer().size(),
        buffers.transform_index_buffer.buffer().size()
    );
}
