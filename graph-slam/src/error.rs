use thiserror::Error;

/// Errors surfaced by the mapping core. Nothing is retried internally;
/// a failed operation leaves the graph untouched.
#[derive(Debug, Error)]
pub enum MapError {
    /// The scan cannot be turned into a local occupancy grid.
    #[error("invalid scan: {0}")]
    InvalidScan(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Map generation was requested before any node was inserted.
    #[error("the graph contains no nodes")]
    EmptyGraph,

    /// The fused map would be degenerate or too large to address.
    #[error("map extent error: {0}")]
    MapExtent(String),
}

pub type Result<T> = std::result::Result<T, MapError>;
