use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or option key that caused the error (e.g., "voice_profiles.Morning.speed")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected range, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "tts", "voices", "options_flow")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the integration.
///
/// Variants fall in two tiers: configuration errors (bad credentials, missing or
/// invalid fields, profile bookkeeping) and runtime errors (network, remote
/// rejection, timeout). Every error is scoped to the request that raised it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Voice profile '{name}' already exists")]
    ProfileExists { name: String },

    #[error("Voice profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Network error: {message}{}", format_context(.context))]
    Network {
        message: String,
        context: ErrorContext,
    },

    #[error("Remote error: HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Timed out after {secs}s: {operation}")]
    Timeout { operation: String, secs: u64 },

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn network_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Network {
            message: msg.into(),
            context,
        }
    }

    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
            message: msg.into(),
            context,
        }
    }

    /// Map a non-success HTTP status from the remote API onto the taxonomy.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            401 | 403 => Error::Authentication { message },
            400 | 422 => Error::validation_with_context(
                message,
                ErrorContext::new()
                    .with_source("remote")
                    .with_details(format!("HTTP {}", status)),
            ),
            _ => Error::Remote { status, message },
        }
    }

    /// True for errors reported synchronously during setup or profile editing.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration { .. }
                | Error::Authentication { .. }
                | Error::ProfileExists { .. }
                | Error::ProfileNotFound { .. }
        )
    }

    /// Short machine-readable key, used as the form error in the config flow.
    pub fn reason(&self) -> &'static str {
        match self {
            Error::Configuration { .. } => "configuration",
            Error::Validation { .. } => "invalid_input",
            Error::ProfileExists { .. } => "profile_exists",
            Error::ProfileNotFound { .. } => "profile_not_found",
            Error::Authentication { .. } => "invalid_api_key",
            Error::Network { .. } => "cannot_connect",
            Error::Remote { .. } => "remote_error",
            Error::Timeout { .. } => "timeout",
            Error::Runtime { .. } => "runtime",
            Error::Io(_) => "io",
            Error::Serialization(_) | Error::Yaml(_) => "serialization",
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. }
            | Error::Network { context, .. }
            | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            Error::from_status(401, "bad key"),
            Error::Authentication { .. }
        ));
        assert!(matches!(
            Error::from_status(422, "bad body"),
            Error::Validation { .. }
        ));
        assert!(matches!(
            Error::from_status(503, "down"),
            Error::Remote { status: 503, .. }
        ));
    }

    #[test]
    fn test_tiers() {
        assert!(Error::configuration("missing api key").is_configuration());
        assert!(Error::from_status(401, "").is_configuration());
        assert!(!Error::from_status(500, "").is_configuration());
        assert!(!Error::Timeout {
            operation: "tts".into(),
            secs: 30
        }
        .is_configuration());
    }

    #[test]
    fn test_context_display() {
        let err = Error::validation_with_context(
            "speed out of range",
            ErrorContext::new()
                .with_field_path("speed")
                .with_details("expected 0.25..=4.0"),
        );
        let text = err.to_string();
        assert!(text.contains("field: speed"));
        assert!(text.contains("expected 0.25..=4.0"));
    }
}
