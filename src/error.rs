use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,

    #[error("access denied")]
    Forbidden,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection-level failures, including response bodies that fail to
    /// decode; `reqwest` folds both into one error type.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Returns whether this error ends the current session (forced logout).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }

    /// HTTP status behind this error, when one exists.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::Unauthorized => Some(401),
            AppError::Forbidden => Some(403),
            AppError::NotFound(_) => Some(404),
            AppError::Api { status, .. } => Some(*status),
            AppError::Transport(e) => e.status().map(|s| s.as_u16()),
            AppError::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_map_into_the_taxonomy() {
        let e = AppError::from(config::ConfigError::Message("hub url missing".into()));
        assert!(matches!(e, AppError::Config(_)));
        assert_eq!(e.status_code(), None);
        assert!(!e.is_auth_failure());
    }

    #[test]
    fn test_only_unauthorized_ends_the_session() {
        assert!(AppError::Unauthorized.is_auth_failure());
        assert!(!AppError::Forbidden.is_auth_failure());
        assert!(!AppError::NotFound("club 9".into()).is_auth_failure());
    }
}
