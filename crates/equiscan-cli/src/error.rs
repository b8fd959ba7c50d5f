use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] equiscan_core::ValidationError),

    #[error(transparent)]
    Screening(#[from] equiscan_core::ScreeningError),

    #[error("scan did not finish within {timeout_secs}s")]
    ScanTimeout { timeout_secs: u64 },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Screening(_) => 3,
            Self::Serialization(_) => 4,
            Self::ScanTimeout { .. } | Self::Io(_) => 10,
        }
    }
}
