use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("not initialized: run 'votewatch init'")]
    NotInitialized,

    #[error("invalid chamber id '{0}': must be alphanumeric")]
    InvalidChamber(String),

    #[error("invalid resolution id '{0}': must be alphanumeric with underscores or hyphens")]
    InvalidResolutionId(String),

    #[error("invalid vote kind: {0}")]
    InvalidVoteKind(String),

    #[error("no base snapshot on disk for resolution {0}")]
    MissingBaseSnapshot(String),

    #[error("chamber {chamber} is tracking {resolution} but has no {field} recorded")]
    IncompleteChamberState {
        chamber: String,
        resolution: String,
        field: &'static str,
    },

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("malformed live snapshot: {0}")]
    MalformedSnapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::DeError),
}

pub type Result<T> = std::result::Result<T, VoteError>;

impl VoteError {
    /// Errors that need an operator to repair on-disk state before a retry can succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            VoteError::MissingBaseSnapshot(_)
                | VoteError::IncompleteChamberState { .. }
                | VoteError::InvalidResolutionId(_)
        )
    }
}
