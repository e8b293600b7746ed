use thiserror::Error;

/// The only error this engine can surface to a host: failure to construct
/// it in the first place. Every other out-of-range input is clamped
/// silently at the point of ingestion.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}
