use thiserror::Error;

/// Everything a ledger operation can refuse or fail with
///
/// None of these are fatal: every variant leaves the persisted ledger exactly
/// as it was before the call.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Empty, non-numeric or out-of-range user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A journey is already active")]
    JourneyAlreadyActive,

    #[error("No journey is active")]
    NoActiveJourney,

    #[error("The odometer cannot be changed while a journey is active")]
    OdometerLocked,

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for refused transitions (as opposed to bad input or I/O failures)
    pub fn is_illegal_transition(&self) -> bool {
        matches!(
            self,
            Self::JourneyAlreadyActive | Self::NoActiveJourney | Self::OdometerLocked
        )
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
