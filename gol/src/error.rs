use std::path::PathBuf;

/// Invalid run configuration, reported before any turn runs.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("image width must be positive")]
    ZeroWidth,

    #[error("image height must be positive")]
    ZeroHeight,

    #[error("thread count {threads} must be between 1 and the image height {height}")]
    Threads { threads: usize, height: usize },

    #[error("tick interval must be positive")]
    ZeroTickInterval,

    #[error("initial grid is {actual_width}x{actual_height}, expected {width}x{height}")]
    WorldSize {
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}

/// Failures of the image collaborator.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("failed to decode '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("'{name}' is {actual_width}x{actual_height}, expected {width}x{height}")]
    Dimensions {
        name: String,
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load the initial grid: {0}")]
    Input(#[from] IoError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
