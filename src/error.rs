use thiserror::Error;

use crate::hand::TrackedPoint;

#[derive(Error, Debug)]
pub enum Error {
    /// The detector reported a hand but one of the tracked roles was not in the result set.
    #[error("hand reported without tracked landmark {0:?}")]
    MissingLandmark(TrackedPoint),

    #[error("pointer sink failed: {0}")]
    SinkFailure(String),

    #[error("hand detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("replay record {line}: {source}")]
    Replay {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
