use pagewatch_core_types::SessionId;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and the CLI's exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    InvalidConfig,

    // Document source
    /// The source was closed from the outside (benign stop)
    SourceClosed,
    /// The source could not be reached or answered with an error status
    SourceUnavailable,
    /// Any other source failure
    SourceFault,

    // Session control
    AlreadyRunning,

    // Integration/IO
    Io,
    Serialization,
    /// A change report could not be rendered
    Render,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::SourceClosed => "ERR_SOURCE_CLOSED",
            ExErrorKind::SourceUnavailable => "ERR_SOURCE_UNAVAILABLE",
            ExErrorKind::SourceFault => "ERR_SOURCE_FAULT",
            ExErrorKind::AlreadyRunning => "ERR_ALREADY_RUNNING",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Render => "ERR_RENDER",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and optional
/// context (operation, session, target, path) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    session_id: Option<SessionId>,
    target: Option<String>,
    path: Option<PathBuf>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            session_id: None,
            target: None,
            path: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add session context
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Add the tracked document identifier
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the session context, if any
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Get the tracked document identifier, if any
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Get the filesystem path context, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(target) = &self.target {
            write!(f, " (target: {})", target)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(session_id) = &self.session_id {
            write!(f, " (session: {})", session_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for pagewatch operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageWatchError {
    /// A tracking session is already active on this tracker
    #[error("A tracking session is already running for {target}")]
    AlreadyRunning { target: String },

    /// Configuration failed to load or validate
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The tracking worker panicked before reporting an outcome
    #[error("Tracking worker panicked: {message}")]
    WorkerPanicked { message: String },
}

impl From<PageWatchError> for ExError {
    fn from(err: PageWatchError) -> Self {
        match err {
            PageWatchError::AlreadyRunning { target } => ExError::new(ExErrorKind::AlreadyRunning)
                .with_op("tracker_start")
                .with_target(target)
                .with_message("A tracking session is already running"),

            PageWatchError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            PageWatchError::WorkerPanicked { message } => ExError::new(ExErrorKind::Internal)
                .with_op("track_session")
                .with_message(format!("Tracking worker panicked: {message}")),
        }
    }
}

/// Conversion from tera::Error to ExError
impl From<tera::Error> for ExError {
    fn from(err: tera::Error) -> Self {
        // tera nests the useful detail in the source chain.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(&format!(": {cause}"));
            source = cause.source();
        }
        ExError::new(ExErrorKind::Render)
            .with_op("render_change_report")
            .with_message(message)
    }
}

/// Conversion from config::ConfigError to ExError
impl From<config::ConfigError> for ExError {
    fn from(err: config::ConfigError) -> Self {
        ExError::new(ExErrorKind::InvalidConfig)
            .with_op("load_config")
            .with_message(err.to_string())
    }
}
