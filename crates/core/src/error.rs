use thiserror::Error;

/// What a remote collaborator (embedding model, generation model, vector
/// store) can raise. Gateways decide retry vs. surface by matching on the
/// variant, never by inspecting message strings.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Invalid credential. Never retried.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network blip, rate limit, timeout, 5xx. Retryable.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Index/namespace/resource missing. Never retried.
    #[error("not found: {0}")]
    NotFound(String),
}

impl BackendError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Classify an HTTP error status into the backend taxonomy.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth(format!("{status}: {body}")),
            404 => Self::NotFound(format!("{status}: {body}")),
            _ => Self::Transient(format!("{status}: {body}")),
        }
    }
}

// Connection failures, timeouts, and body decode errors all share the same
// retry treatment.
impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transient(err.to_string())
    }
}

/// Errors surfaced to callers of the pipeline. A failed request is a value,
/// never a crashed process.
#[derive(Debug, Error)]
pub enum RagError {
    /// Caller mistake (empty query, unreadable document). Never retried.
    #[error("invalid input: {0}")]
    Input(String),

    /// Invalid or incomplete configuration, caught before any backend call.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid credential for a backend component.
    #[error("authentication failed for {component}: {message}")]
    Auth {
        component: &'static str,
        message: String,
    },

    /// A backend stayed down through the whole retry budget.
    #[error("{component} unavailable after {attempts} attempt(s): {message}")]
    Degraded {
        component: &'static str,
        attempts: u32,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),
}

impl RagError {
    /// Promote a backend error that survived the retry budget into the
    /// caller-facing taxonomy.
    pub fn from_backend(component: &'static str, attempts: u32, err: BackendError) -> Self {
        match err {
            BackendError::Auth(message) => Self::Auth { component, message },
            BackendError::NotFound(message) => Self::NotFound(message),
            BackendError::Transient(message) => Self::Degraded {
                component,
                attempts,
                message,
            },
        }
    }
}
