//! Error types for the moduleflow framework
//!
//! Two families live here:
//! - `Exception`: the taxonomy of failures reported through the error-report
//!   update. These travel inside actions and reach the error listener.
//! - `FrameworkError`: failures of the framework plumbing itself (registration,
//!   serialization, configuration). These are returned to the caller and are
//!   never converted into error actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ----------------------------------------------------------------------------
// Exception Taxonomy
// ----------------------------------------------------------------------------

/// Failure reported through the `@@framework/error` update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Exception {
    /// Non-2xx response carrying a structured body
    #[error("{message}")]
    #[serde(rename_all = "camelCase")]
    Api {
        message: String,
        status_code: u16,
        request_url: String,
        response_data: Value,
        error_id: Option<String>,
        error_code: Option<String>,
    },

    /// Network unreachable or gateway failure
    #[error("{message}")]
    #[serde(rename_all = "camelCase")]
    NetworkConnection { message: String, request_url: String },

    /// Anything else raised by a handler, wrapped with its original payload
    #[error("{message}")]
    #[serde(rename_all = "camelCase")]
    Runtime { message: String, error_object: Value },

    /// Failure thrown by the rendering host while rendering a component tree
    #[error("{message}")]
    #[serde(rename_all = "camelCase")]
    Lifecycle {
        message: String,
        component_stack: String,
    },

    /// Business-rule failure raised explicitly by handler logic
    #[error("{message}")]
    Biz { message: String },
}

impl Exception {
    /// Create an API exception
    pub fn api<M: Into<String>, U: Into<String>>(
        message: M,
        status_code: u16,
        request_url: U,
        response_data: Value,
        error_id: Option<String>,
        error_code: Option<String>,
    ) -> Self {
        Exception::Api {
            message: message.into(),
            status_code,
            request_url: request_url.into(),
            response_data,
            error_id,
            error_code,
        }
    }

    /// Create a network connection exception
    pub fn network<M: Into<String>, U: Into<String>>(message: M, request_url: U) -> Self {
        Exception::NetworkConnection {
            message: message.into(),
            request_url: request_url.into(),
        }
    }

    /// Create a runtime exception carrying the original error payload
    pub fn runtime<M: Into<String>>(message: M, error_object: Value) -> Self {
        Exception::Runtime {
            message: message.into(),
            error_object,
        }
    }

    /// Create a rendering lifecycle exception
    pub fn lifecycle<M: Into<String>, S: Into<String>>(message: M, component_stack: S) -> Self {
        Exception::Lifecycle {
            message: message.into(),
            component_stack: component_stack.into(),
        }
    }

    /// Create a business-rule exception
    pub fn biz<M: Into<String>>(message: M) -> Self {
        Exception::Biz {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Exception::Api { message, .. }
            | Exception::NetworkConnection { message, .. }
            | Exception::Runtime { message, .. }
            | Exception::Lifecycle { message, .. }
            | Exception::Biz { message } => message,
        }
    }

    /// Normalize an arbitrary error into an exception.
    ///
    /// Errors that already are an `Exception` pass through unchanged; anything
    /// else is wrapped into `Exception::Runtime` with its debug rendering kept
    /// as the error object.
    pub fn from_error(error: anyhow::Error) -> Self {
        match error.downcast::<Exception>() {
            Ok(exception) => exception,
            Err(error) => {
                let message = error.to_string();
                let message = if message.is_empty() {
                    "unknown error".to_string()
                } else {
                    message
                };
                Exception::Runtime {
                    message,
                    error_object: serde_json::json!({ "error": format!("{:?}", error) }),
                }
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Framework Errors
// ----------------------------------------------------------------------------

/// Errors raised by the framework plumbing
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid payload for action {action}: {reason}")]
    InvalidPayload { action: String, reason: String },

    #[error("Module [{module}] has no state slice")]
    StateMissing { module: String },

    #[error("Partial state for module [{module}] must be an object")]
    InvalidPartialState { module: String },

    #[error("Unknown action {method} on module [{module}]")]
    UnknownAction { module: String, method: String },

    #[error("Invalid mask pattern {pattern}: {reason}")]
    InvalidMaskPattern { pattern: String, reason: String },

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

impl FrameworkError {
    /// Create a configuration error with a reason
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        FrameworkError::Configuration {
            reason: reason.into(),
        }
    }

    /// Create an invalid payload error for an action
    pub fn invalid_payload<A: Into<String>, R: Into<String>>(action: A, reason: R) -> Self {
        FrameworkError::InvalidPayload {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type FrameworkResult<T> = core::result::Result<T, FrameworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_passes_through_normalization() {
        let original = Exception::biz("quota exceeded");
        let normalized = Exception::from_error(anyhow::Error::new(original.clone()));
        assert_eq!(normalized, original);
    }

    #[test]
    fn test_foreign_error_becomes_runtime_exception() {
        let normalized = Exception::from_error(anyhow::anyhow!("disk on fire"));
        match normalized {
            Exception::Runtime {
                message,
                error_object,
            } => {
                assert_eq!(message, "disk on fire");
                assert!(error_object["error"].as_str().unwrap().contains("disk on fire"));
            }
            other => panic!("unexpected exception: {:?}", other),
        }
    }

    #[test]
    fn test_empty_message_falls_back_to_unknown() {
        let normalized = Exception::from_error(anyhow::anyhow!(""));
        assert_eq!(normalized.message(), "unknown error");
    }

    #[test]
    fn test_exception_serializes_with_kind_tag() {
        let exception = Exception::network("Request failed - /api/user", "/api/user");
        let value = serde_json::to_value(&exception).unwrap();
        assert_eq!(value["kind"], "networkConnection");
        assert_eq!(value["requestUrl"], "/api/user");
    }
}
