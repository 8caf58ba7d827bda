use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("position count mismatch, expected {expected} but got {actual}")]
    PositionCountMismatch { expected: usize, actual: usize },
    #[error("state count mismatch, expected {expected} but got {actual}")]
    StateCountMismatch { expected: usize, actual: usize },
    #[error("transform index count mismatch, expected {expected} but got {actual}")]
    TransformIndexCountMismatch { expected: usize, actual: usize },
    #[error("center buffer of {len} floats is not a whole number of xyz triples")]
    CenterBufferMisaligned { len: usize },
    #[error("center count mismatch, expected {expected} but got {actual}")]
    CenterCountMismatch { expected: usize, actual: usize },
    #[error("transform palette is full")]
    PaletteFull,
    #[error("{0}")]
    BufferDownloadOneShotReceive(#[from] oneshot::RecvError),
    #[error("{0}")]
    BufferDownloadAsync(#[from] wgpu::BufferAsyncError),
    #[error("{0}")]
    BufferDownloadPoll(#[from] wgpu::PollError),
}
