use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};
use crate::error::RouterError;

/// What a qualified name resolves to.
#[derive(Clone)]
pub enum Target {
    /// Invocable as-is, without construction
    Singleton(Arc<dyn Handler>),
    /// Must be instantiated before it can be invoked
    Constructor(Arc<dyn Fn() -> Arc<dyn Handler> + Send + Sync>),
}

impl Target {
    pub fn singleton<H>(handler: H) -> Self
    where
        H: Handler + 'static,
    {
        Target::Singleton(Arc::new(handler))
    }

    pub fn constructor<F, H>(build: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: Handler + 'static,
    {
        Target::Constructor(Arc::new(move || Arc::new(build()) as Arc<dyn Handler>))
    }

    fn instantiate(&self) -> Arc<dyn Handler> {
        match self {
            Target::Singleton(handler) => Arc::clone(handler),
            Target::Constructor(build) => build(),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Singleton(_) => f.write_str("Singleton(..)"),
            Target::Constructor(_) => f.write_str("Constructor(..)"),
        }
    }
}

/// Symbol table consulted when a route names its endpoint by string.
///
/// Implementations must be safe for concurrent reads: lazy endpoints call
/// `lookup` on every invocation, from whatever thread serves the request.
pub trait NameResolver: Send + Sync {
    fn lookup(&self, qualified_name: &str) -> Option<Target>;
}

/// Declared route target, before resolution.
#[derive(Clone)]
pub enum EndpointSpec {
    /// Already invocable
    Handler(Arc<dyn Handler>),
    /// A type reference: invoked directly or constructed first
    Class(Target),
    /// `"controller#action"` style name, looked up through the resolver
    Name(String),
    /// Something with no invoke contract (plain data, null, ...)
    Unresolvable(String),
}

impl EndpointSpec {
    pub fn handler<H>(handler: H) -> Self
    where
        H: Handler + 'static,
    {
        EndpointSpec::Handler(Arc::new(handler))
    }

    pub fn name(name: &str) -> Self {
        EndpointSpec::Name(name.to_string())
    }

    /// Interpret a `to:` value from a route file.
    ///
    /// Strings are endpoint names; any other YAML value cannot be invoked.
    #[must_use]
    pub fn from_yaml(value: &serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::String(s) => EndpointSpec::Name(s.clone()),
            serde_yaml::Value::Null => EndpointSpec::Unresolvable("null".to_string()),
            other => {
                let rendered = serde_yaml::to_string(other)
                    .map(|s| s.trim_end().to_string())
                    .unwrap_or_else(|_| format!("{other:?}"));
                EndpointSpec::Unresolvable(rendered)
            }
        }
    }
}

impl From<&str> for EndpointSpec {
    fn from(name: &str) -> Self {
        EndpointSpec::name(name)
    }
}

impl fmt::Debug for EndpointSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointSpec::Handler(_) => f.write_str("Handler(..)"),
            EndpointSpec::Class(t) => f.debug_tuple("Class").field(t).finish(),
            EndpointSpec::Name(n) => f.debug_tuple("Name").field(n).finish(),
            EndpointSpec::Unresolvable(v) => f.debug_tuple("Unresolvable").field(v).finish(),
        }
    }
}

/// A resolved route target.
pub enum Endpoint {
    /// Wraps a handler the caller supplied directly
    Direct(Arc<dyn Handler>),
    /// Came from a type reference (or a name that resolved at registration)
    Constructed {
        name: Option<String>,
        handler: Arc<dyn Handler>,
    },
    /// Name that was not defined at registration.
    ///
    /// Holds only the qualified name and the lookup scope. Every invocation
    /// looks the name up again, so a target defined after startup starts
    /// working on the next request, and one removed later starts failing.
    Lazy {
        name: String,
        namespace: String,
        resolver: Arc<dyn NameResolver>,
    },
}

impl Endpoint {
    /// Invoke the endpoint with `req`.
    ///
    /// # Errors
    ///
    /// [`RouterError::NotCallableEndpoint`] when a lazy endpoint's name is still
    /// (or no longer) defined.
    pub fn invoke(&self, req: HandlerRequest) -> Result<HandlerResponse, RouterError> {
        match self {
            Endpoint::Direct(handler) | Endpoint::Constructed { handler, .. } => {
                Ok(handler.invoke(req))
            }
            Endpoint::Lazy { name, resolver, .. } => match resolver.lookup(name) {
                Some(target) => Ok(target.instantiate().invoke(req)),
                None => Err(RouterError::NotCallableEndpoint {
                    target: format!("'{name}' (not defined)"),
                }),
            },
        }
    }

    #[must_use]
    pub fn is_lazy(&self) -> bool {
        matches!(self, Endpoint::Lazy { .. })
    }

    /// Qualified name, for endpoints that were declared by name
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Endpoint::Direct(_) => None,
            Endpoint::Constructed { name, .. } => name.as_deref(),
            Endpoint::Lazy { name, .. } => Some(name),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Direct(_) => f.write_str("Direct(..)"),
            Endpoint::Constructed { name, .. } => {
                f.debug_struct("Constructed").field("name", name).finish()
            }
            Endpoint::Lazy { name, namespace, .. } => f
                .debug_struct("Lazy")
                .field("name", name)
                .field("namespace", namespace)
                .finish(),
        }
    }
}

/// Turns declared targets into [`Endpoint`]s.
///
/// Owns no global state: names go through the injected [`NameResolver`].
#[derive(Clone)]
pub struct EndpointResolver {
    resolver: Arc<dyn NameResolver>,
    separator: String,
}

impl EndpointResolver {
    pub fn new(resolver: Arc<dyn NameResolver>, separator: &str) -> Self {
        Self {
            resolver,
            separator: separator.to_string(),
        }
    }

    /// Resolve `target`, qualifying names with `namespace`.
    ///
    /// Names that are not defined yet produce a lazy endpoint instead of an error.
    ///
    /// # Errors
    ///
    /// [`RouterError::NotCallableEndpoint`] for targets without an invoke
    /// contract, including empty names.
    pub fn resolve(&self, target: EndpointSpec, namespace: &str) -> Result<Endpoint, RouterError> {
        match target {
            EndpointSpec::Handler(handler) => Ok(Endpoint::Direct(handler)),
            EndpointSpec::Class(class) => Ok(Endpoint::Constructed {
                name: None,
                handler: class.instantiate(),
            }),
            EndpointSpec::Name(name) => {
                let qualified = self.qualified_name(&name, namespace)?;
                match self.resolver.lookup(&qualified) {
                    Some(class) => {
                        debug!(target_name = %name, qualified = %qualified, "Endpoint resolved");
                        Ok(Endpoint::Constructed {
                            name: Some(qualified),
                            handler: class.instantiate(),
                        })
                    }
                    None => {
                        info!(
                            target_name = %name,
                            qualified = %qualified,
                            "Endpoint not defined yet - deferring resolution to first call"
                        );
                        Ok(Endpoint::Lazy {
                            name: qualified,
                            namespace: namespace.to_string(),
                            resolver: Arc::clone(&self.resolver),
                        })
                    }
                }
            }
            EndpointSpec::Unresolvable(description) => {
                Err(RouterError::NotCallableEndpoint {
                    target: description,
                })
            }
        }
    }

    /// `admin/books#show` in `Web` becomes `Web::Admin::Books::Show`.
    ///
    /// # Errors
    ///
    /// [`RouterError::NotCallableEndpoint`] when the name or either side of the
    /// separator is empty.
    pub fn qualified_name(&self, name: &str, namespace: &str) -> Result<String, RouterError> {
        let not_callable = || RouterError::NotCallableEndpoint {
            target: format!("'{name}'"),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(not_callable());
        }

        let mut parts: Vec<String> = Vec::with_capacity(3);
        let namespace = namespace.trim_matches(':');
        if !namespace.is_empty() {
            parts.push(namespace.to_string());
        }

        match name.split_once(self.separator.as_str()) {
            Some((controller, action)) => {
                if controller.is_empty() || action.is_empty() {
                    return Err(not_callable());
                }
                parts.push(classify(controller));
                parts.push(classify(action));
            }
            None => parts.push(classify(name)),
        }
        Ok(parts.join("::"))
    }
}

/// `admin/book_reviews` becomes `Admin::BookReviews`
pub(crate) fn classify(name: &str) -> String {
    name.split('/')
        .filter(|s| !s.is_empty())
        .map(camelize)
        .collect::<Vec<_>>()
        .join("::")
}

fn camelize(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for word in part.split(['_', '-']) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
