/// Failure of a backend call.
///
/// Transport and decode failures degrade a widget to its last-known state,
/// `Unauthorized` clears the session, and `Rejected` carries a business-rule
/// notice meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error calling {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Session expired, please login again")]
    Unauthorized,

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Backend returned {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("{0}")]
    NotAuthenticated(String),
}

impl ApiError {
    pub fn transport(endpoint: &str, reason: impl ToString) -> Self {
        ApiError::Transport {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(endpoint: &str, reason: impl ToString) -> Self {
        ApiError::Decode {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Message suitable for a toast. Rejections keep their specific text,
    /// everything else collapses to a generic notice.
    pub fn user_notice(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::NotAuthenticated(message) => message.clone(),
            ApiError::Unauthorized => self.to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}
