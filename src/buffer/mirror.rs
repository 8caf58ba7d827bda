use crate::{BufferUpload, Error, MirrorBuffer, PointCloud};

/// Create a storage buffer holding `len` bytes, padded to [`wgpu::COPY_BUFFER_ALIGNMENT`].
fn create_mirror_buffer(
    device: &wgpu::Device,
    label: &str,
    len: usize,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (len as wgpu::BufferAddress).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
        usage,
        mapped_at_creation: false,
    })
}

/// Write `bytes` to the start of `buffer`, padding the tail to [`wgpu::COPY_BUFFER_ALIGNMENT`].
///
/// `len` is the logical byte length of the mirror, `bytes` must be exactly that long.
fn write_padded(queue: &wgpu::Queue, buffer: &wgpu::Buffer, len: usize, bytes: &[u8]) {
    if bytes.len() != len {
        log::error!(
            "Mirror size mismatch, buffer has {} bytes, but {} were provided",
            len,
            bytes.len()
        );
        return;
    }

    let aligned = bytes.len() as wgpu::BufferAddress & !(wgpu::COPY_BUFFER_ALIGNMENT - 1);
    let (head, tail) = bytes.split_at(aligned as usize);

    if !head.is_empty() {
        queue.write_buffer(buffer, 0, head);
    }

    if !tail.is_empty() {
        let mut padded = [0u8; wgpu::COPY_BUFFER_ALIGNMENT as usize];
        padded[..tail.len()].copy_from_slice(tail);
        queue.write_buffer(buffer, aligned, &padded);
    }
}

/// Read back the first `len` bytes of `buffer`.
///
/// `buffer` must have been created with [`wgpu::BufferUsages::COPY_SRC`].
async fn download_bytes(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    len: usize,
) -> Result<Vec<u8>, Error> {
    if len == 0 {
        return Ok(Vec::new());
    }

    let download = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Mirror Download Buffer"),
        size: buffer.size(),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Mirror Download Encoder"),
    });
    encoder.copy_buffer_to_buffer(buffer, 0, &download, 0, buffer.size());
    queue.submit(Some(encoder.finish()));

    let (tx, rx) = oneshot::channel();
    let buffer_slice = download.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        if let Err(e) = tx.send(result) {
            log::error!("Error occurred while sending mirror download: {e:?}");
        }
    });
    device.poll(wgpu::PollType::wait_indefinitely())?;
    rx.await??;

    let bytes = buffer_slice.get_mapped_range()[..len].to_vec();
    download.unmap();

    Ok(bytes)
}

/// The point state storage buffer, one byte per point.
#[derive(Debug)]
pub struct PointStateBuffer {
    buffer: wgpu::Buffer,
    point_count: usize,
}

impl PointStateBuffer {
    /// The default usages.
    pub const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits() | wgpu::BufferUsages::COPY_DST.bits(),
    );

    /// Create a new point state buffer.
    pub fn new(device: &wgpu::Device, point_count: u32) -> Self {
        Self::new_with_usage(device, point_count, Self::DEFAULT_USAGES)
    }

    /// Create a new point state buffer with the specified usages.
    pub fn new_with_usage(
        device: &wgpu::Device,
        point_count: u32,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let point_count = point_count as usize;

        Self {
            buffer: create_mirror_buffer(device, "Point State Buffer", point_count, usage),
            point_count,
        }
    }

    /// Update the buffer with the raw state bytes.
    ///
    /// The update is skipped if there is not exactly one byte per point.
    pub fn update(&self, queue: &wgpu::Queue, states: &[u8]) {
        write_padded(queue, &self.buffer, self.point_count, states);
    }

    /// Download the raw state bytes.
    ///
    /// The buffer must have been created with [`wgpu::BufferUsages::COPY_SRC`].
    pub async fn download(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<u8>, Error> {
        download_bytes(device, queue, &self.buffer, self.point_count).await
    }

    /// Get the buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.point_count
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The transform index storage buffer, one `u16` palette slot per point.
#[derive(Debug)]
pub struct TransformIndexBuffer {
    buffer: wgpu::Buffer,
    point_count: usize,
}

impl TransformIndexBuffer {
    /// The default usages.
    pub const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits() | wgpu::BufferUsages::COPY_DST.bits(),
    );

    /// Create a new transform index buffer.
    pub fn new(device: &wgpu::Device, point_count: u32) -> Self {
        Self::new_with_usage(device, point_count, Self::DEFAULT_USAGES)
    }

    /// Create a new transform index buffer with the specified usages.
    pub fn new_with_usage(
        device: &wgpu::Device,
        point_count: u32,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let point_count = point_count as usize;

        Self {
            buffer: create_mirror_buffer(
                device,
                "Transform Index Buffer",
                Self::byte_len(point_count),
                usage,
            ),
            point_count,
        }
    }

    fn byte_len(point_count: usize) -> usize {
        point_count * std::mem::size_of::<u16>()
    }

    /// Update the buffer with the raw transform index bytes.
    ///
    /// The update is skipped if there is not exactly one `u16` per point.
    pub fn update(&self, queue: &wgpu::Queue, transform_indices: &[u8]) {
        write_padded(
            queue,
            &self.buffer,
            Self::byte_len(self.point_count),
            transform_indices,
        );
    }

    /// Download the transform indices.
    ///
    /// The buffer must have been created with [`wgpu::BufferUsages::COPY_SRC`].
    pub async fn download(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<u16>, Error> {
        let bytes = download_bytes(
            device,
            queue,
            &self.buffer,
            Self::byte_len(self.point_count),
        )
        .await?;

        Ok(bytemuck::allocation::pod_collect_to_vec(&bytes))
    }

    /// Get the buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.point_count
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The GPU mirrors of a [`PointCloud`].
#[derive(Debug)]
pub struct PointCloudBuffers {
    pub state_buffer: PointStateBuffer,
    pub transform_index_buffer: TransformIndexBuffer,
}

impl PointCloudBuffers {
    /// Create the mirrors of `cloud`, initialized with its current data.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, cloud: &PointCloud) -> Self {
        Self::new_with_usage(
            device,
            queue,
            cloud,
            PointStateBuffer::DEFAULT_USAGES,
            TransformIndexBuffer::DEFAULT_USAGES,
        )
    }

    /// Create the mirrors of `cloud` with the specified usages, initialized with its current data.
    pub fn new_with_usage(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cloud: &PointCloud,
        state_usage: wgpu::BufferUsages,
        transform_index_usage: wgpu::BufferUsages,
    ) -> Self {
        log::debug!("Creating point state buffer");
        let state_buffer =
            PointStateBuffer::new_with_usage(device, cloud.point_count(), state_usage);

        log::debug!("Creating transform index buffer");
        let transform_index_buffer = TransformIndexBuffer::new_with_usage(
            device,
            cloud.point_count(),
            transform_index_usage,
        );

        let buffers = Self {
            state_buffer,
            transform_index_buffer,
        };

        let mut upload = buffers.upload(queue);
        upload.upload_bytes(MirrorBuffer::State, bytemuck::cast_slice(cloud.states()));
        upload.upload_bytes(
            MirrorBuffer::TransformIndex,
            bytemuck::cast_slice(cloud.transform_indices()),
        );

        buffers
    }

    /// Get the uploader writing to these mirrors through `queue`.
    pub fn upload<'a>(&'a self, queue: &'a wgpu::Queue) -> WgpuUpload<'a> {
        WgpuUpload {
            queue,
            buffers: self,
        }
    }
}

/// A [`BufferUpload`] writing to [`PointCloudBuffers`] through a [`wgpu::Queue`].
#[derive(Debug)]
pub struct WgpuUpload<'a> {
    queue: &'a wgpu::Queue,
    buffers: &'a PointCloudBuffers,
}

impl BufferUpload for WgpuUpload<'_> {
    fn upload_bytes(&mut self, buffer: MirrorBuffer, bytes: &[u8]) {
        match buffer {
            MirrorBuffer::State => self.buffers.state_buffer.update(self.queue, bytes),
            MirrorBuffer::TransformIndex => self
                .buffers
                .transform_index_buffer
                .update(self.queue, bytes),
        }
    }
}
