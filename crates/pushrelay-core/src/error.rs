//! Tagged delivery errors.
//!
//! The delivery backend's raw failures are translated into one of these
//! variants at the client boundary, so everything above it (classifier,
//! handler, tests) switches on a tag instead of probing a third-party
//! error type.

/// A failed delivery attempt, tagged by failure kind.
///
/// Each variant carries the backend HTTP status when one was received
/// (`None` for transport-level failures) and the raw error text for
/// logging and response bodies.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeliveryError {
    /// The target registration token is no longer valid.
    #[error("unregistered token: {message}")]
    Unregistered {
        /// Backend HTTP status, if a response was received.
        status: Option<u16>,
        /// Raw error text.
        message: String,
    },
    /// The backend is transiently unavailable or over quota.
    #[error("backend unavailable: {message}")]
    Unavailable {
        /// Backend HTTP status, if a response was received.
        status: Option<u16>,
        /// Raw error text.
        message: String,
    },
    /// The backend reported an internal fault.
    #[error("backend internal error: {message}")]
    Internal {
        /// Backend HTTP status, if a response was received.
        status: Option<u16>,
        /// Raw error text.
        message: String,
    },
    /// The backend rejected the request as malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Backend HTTP status, if a response was received.
        status: Option<u16>,
        /// Raw error text.
        message: String,
    },
    /// Anything else: unrecognized error codes, unparsable error
    /// bodies, transport failures.
    #[error("delivery failed: {message}")]
    Other {
        /// Backend HTTP status, if a response was received.
        status: Option<u16>,
        /// Raw error text.
        message: String,
    },
}

impl DeliveryError {
    /// The backend HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unregistered { status, .. }
            | Self::Unavailable { status, .. }
            | Self::Internal { status, .. }
            | Self::InvalidArgument { status, .. }
            | Self::Other { status, .. } => *status,
        }
    }

    /// The raw error text carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Unregistered { message, .. }
            | Self::Unavailable { message, .. }
            | Self::Internal { message, .. }
            | Self::InvalidArgument { message, .. }
            | Self::Other { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accessor_covers_all_variants() {
        let errs = [
            DeliveryError::Unregistered {
                status: Some(404),
                message: "gone".into(),
            },
            DeliveryError::Unavailable {
                status: Some(503),
                message: "busy".into(),
            },
            DeliveryError::Internal {
                status: Some(500),
                message: "boom".into(),
            },
            DeliveryError::InvalidArgument {
                status: Some(400),
                message: "bad".into(),
            },
            DeliveryError::Other {
                status: None,
                message: "connection reset".into(),
            },
        ];
        let statuses: Vec<Option<u16>> = errs.iter().map(DeliveryError::status).collect();
        assert_eq!(
            statuses,
            vec![Some(404), Some(503), Some(500), Some(400), None]
        );
    }

    #[test]
    fn display_includes_raw_text() {
        let err = DeliveryError::Unregistered {
            status: Some(404),
            message: "requested entity was not found".into(),
        };
        assert!(err.to_string().contains("requested entity was not found"));
    }
}
