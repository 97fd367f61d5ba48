use std::fmt;

/// Errors raised while building routes or generating paths.
///
/// Request-time misses are not errors: a path that matches nothing, or matches
/// only with other verbs, comes back as a [`crate::router::MatchResult`] value.
/// Everything here signals a misconfigured route table or a bad generation call
/// and is expected to fail loudly.
#[derive(Debug)]
pub enum RouterError {
    /// The route template could not be compiled
    PatternCompile {
        /// Template as written at registration
        template: String,
        /// What was wrong with it
        reason: String,
    },
    /// A generation argument was rejected by its capture constraint
    ArgumentConstraint {
        /// Capture name
        name: String,
        /// Offending value
        value: String,
    },
    /// A required capture had no argument during generation
    InsufficientArguments {
        /// Capture name left without a value
        name: String,
    },
    /// More positional arguments were given than the template has captures
    TooManyArguments {
        /// Number of captures in the template
        expected: usize,
        /// Number of positional arguments supplied
        given: usize,
    },
    /// No route is registered under the requested name
    RouteNotFound {
        /// Requested route name
        name: String,
    },
    /// Generating a named route failed; wraps the underlying generation error
    InvalidRouteArguments {
        /// Route name
        name: String,
        /// Debug rendering of the arguments the caller passed
        args: String,
        /// Generation error reported by the path pattern
        source: Box<RouterError>,
    },
    /// The endpoint target cannot be turned into an invocable handler
    NotCallableEndpoint {
        /// Description of the target
        target: String,
    },
    /// An insert was attempted on a dispatch trie that has been frozen
    TrieFrozen {
        /// Prefix the caller tried to insert
        prefix: String,
    },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::PatternCompile { template, reason } => {
                write!(f, "cannot compile route template '{template}': {reason}")
            }
            RouterError::ArgumentConstraint { name, value } => {
                write!(
                    f,
                    "argument '{value}' for capture '{name}' does not satisfy its constraint"
                )
            }
            RouterError::InsufficientArguments { name } => {
                write!(f, "missing argument for capture '{name}'")
            }
            RouterError::TooManyArguments { expected, given } => {
                write!(
                    f,
                    "too many positional arguments: template has {expected} capture(s), got {given}"
                )
            }
            RouterError::RouteNotFound { name } => {
                write!(f, "no route named '{name}'")
            }
            RouterError::InvalidRouteArguments { name, args, source } => {
                write!(f, "invalid arguments {args} for route '{name}': {source}")
            }
            RouterError::NotCallableEndpoint { target } => {
                write!(f, "endpoint target {target} is not callable")
            }
            RouterError::TrieFrozen { prefix } => {
                write!(f, "cannot insert '{prefix}': dispatch trie is frozen")
            }
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::InvalidRouteArguments { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl RouterError {
    pub(crate) fn compile(template: &str, reason: impl Into<String>) -> Self {
        RouterError::PatternCompile {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}
