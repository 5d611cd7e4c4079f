//! Error types.
//!
//! Two families, matching the two moments things can go wrong:
//!
//! - **Route setup.** [`ResolverError`] and [`Error`] are returned while
//!   operations are being turned into handlers. They are fatal for the route
//!   and are meant to abort startup before any traffic is served.
//! - **Request time.** [`ResponseError`] describes a handler response that
//!   does not match its declared definition. It never escapes a validated
//!   handler; it is converted into a `500` problem response instead.

use thiserror::Error;

/// Failure to map an operation to a handler.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// A controller has no operation with the requested name.
    #[error("Controller {controller_type} has no operation '{operation}'")]
    MethodNotFound {
        controller_type: String,
        operation: String,
    },

    /// The module part of a dotted operation id is unknown to the function
    /// resolver.
    #[error("Cannot resolve operationId \"{operation_id}\"! Import error was \"{source}\"")]
    Import {
        operation_id: String,
        #[source]
        source: LookupError,
    },

    /// The module exists but the name is missing, or the id is malformed.
    #[error("{0}")]
    Lookup(#[source] LookupError),

    /// Several controllers are registered and the operation names none.
    #[error("Could not determine which controller to use")]
    AmbiguousController,

    /// The operation id names a controller that was never registered.
    #[error("no controller registered under '{0}'")]
    ControllerNotFound(String),
}

/// Failure reported by a [`FunctionResolver`](crate::FunctionResolver).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no handlers registered under module '{0}'")]
    ModuleNotFound(String),

    #[error("module '{module}' has no handler '{name}'")]
    NameNotFound { module: String, name: String },

    #[error("invalid operation id '{0}': expected a dotted path")]
    Malformed(String),

    #[error("empty function name")]
    Empty,
}

impl From<LookupError> for ResolverError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}

/// A handler response that does not conform to its response definition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("{message}")]
    NonConformingResponseBody { message: String },

    #[error("{message}")]
    NonConformingResponseHeaders { message: String },
}

impl ResponseError {
    /// Short, client-facing title used for the problem response.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NonConformingResponseBody { .. } => {
                "Response body does not conform to specification"
            }
            Self::NonConformingResponseHeaders { .. } => {
                "Response headers do not conform to specification"
            }
        }
    }

    /// Detail describing the mismatch.
    pub fn message(&self) -> &str {
        match self {
            Self::NonConformingResponseBody { message }
            | Self::NonConformingResponseHeaders { message } => message,
        }
    }
}

/// Route-setup failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// A `$ref` that does not point anywhere in the owning document.
    #[error("cannot resolve reference '{0}'")]
    Reference(String),

    /// A response schema the validator cannot compile.
    #[error("invalid schema for response '{status}': {message}")]
    InvalidSchema { status: String, message: String },

    /// A path the routing table rejects.
    #[error("invalid route `{path}`: {message}")]
    Route { path: String, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_error_embeds_id_and_cause() {
        let err = ResolverError::Import {
            operation_id: "api.pets.search".into(),
            source: LookupError::ModuleNotFound("api.pets".into()),
        };
        assert_eq!(
            err.to_string(),
            "Cannot resolve operationId \"api.pets.search\"! \
             Import error was \"no handlers registered under module 'api.pets'\""
        );
    }

    #[test]
    fn method_not_found_names_controller_and_operation() {
        let err = ResolverError::MethodNotFound {
            controller_type: "GreetingController".into(),
            operation: "delete_greeting".into(),
        };
        assert_eq!(
            err.to_string(),
            "Controller GreetingController has no operation 'delete_greeting'"
        );
    }

    #[test]
    fn response_error_reason_and_message() {
        let err = ResponseError::NonConformingResponseHeaders { message: "missing".into() };
        assert_eq!(err.reason(), "Response headers do not conform to specification");
        assert_eq!(err.message(), "missing");
        assert_eq!(err.to_string(), "missing");
    }

    #[test]
    fn lookup_error_converts_into_resolver_error() {
        let err: ResolverError = LookupError::Empty.into();
        assert!(matches!(err, ResolverError::Lookup(LookupError::Empty)));
    }
}
