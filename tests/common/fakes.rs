use std::sync::Arc;

use splat_state::{
    BufferUpload, Error, MirrorBuffer, SpatialSorter, TransformPalette, glam::*,
};

/// A sorter recording what it was given.
#[derive(Debug, Default)]
pub struct RecordingSorter {
    pub mappings: Vec<Option<Arc<[u32]>>>,
    pub centers: Option<Vec<Vec3>>,
}

impl RecordingSorter {
    pub fn last_mapping(&self) -> Option<&Option<Arc<[u32]>>> {
        self.mappings.last()
    }
}

impl SpatialSorter for RecordingSorter {
    fn set_compaction_mapping(&mut self, mapping: Option<Arc<[u32]>>) {
        self.mappings.push(mapping);
    }

    fn set_centers(&mut self, centers: &[Vec3]) {
        self.centers = Some(centers.to_vec());
    }
}

/// An uploader recording every upload.
#[derive(Debug, Default)]
pub struct RecordingUpload {
    pub uploads: Vec<(MirrorBuffer, Vec<u8>)>,
}

impl RecordingUpload {
    pub fn count(&self, buffer: MirrorBuffer) -> usize {
        self.uploads.iter().filter(|(b, _)| *b == buffer).count()
    }

    pub fn last(&self, buffer: MirrorBuffer) -> Option<&[u8]> {
        self.uploads
            .iter()
            .rev()
            .find(|(b, _)| *b == buffer)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

impl BufferUpload for RecordingUpload {
    fn upload_bytes(&mut self, buffer: MirrorBuffer, bytes: &[u8]) {
        self.uploads.push((buffer, bytes.to_vec()));
    }
}

/// A palette with a fixed number of slots.
#[derive(Debug)]
pub struct FakePalette {
    pub slots: Vec<Mat4>,
    pub capacity: usize,
}

impl FakePalette {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Mat4::IDENTITY],
            capacity,
        }
    }
}

impl TransformPalette for FakePalette {
    fn allocate_slot(&mut self) -> Result<u16, Error> {
        if self.slots.len() >= self.capacity {
            return Err(Error::PaletteFull);
        }

        self.slots.push(Mat4::IDENTITY);
        Ok((self.slots.len() - 1) as u16)
    }

    fn set_slot(&mut self, index: u16, pos: Vec3, rot: Quat, scale: Vec3) {
        self.slots[index as usize] = Mat4::from_scale_rotation_translation(scale, rot, pos);
    }
}
