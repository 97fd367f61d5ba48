use anyhow::{Context, Result};
use http::Method;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::pattern::{Constraint, ConstraintSet};

/// Route declarations read from a YAML file.
///
/// ```yaml
/// namespace: Web
/// routes:
///   - verbs: [GET]
///     path: /books/:id
///     to: books#show
///     as: book
///     constraints: { id: '\d+' }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteFile {
    /// Overrides the router's configured namespace for these routes
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub routes: Vec<RouteDef>,
}

/// One route entry of a [`RouteFile`]
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDef {
    #[serde(default = "default_verbs")]
    pub verbs: Vec<String>,
    pub path: String,
    /// Endpoint name; kept as raw YAML so a non-string target can be reported
    #[serde(default)]
    pub to: serde_yaml::Value,
    #[serde(default, rename = "as")]
    pub name: Option<String>,
    /// Capture name to regex
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,
}

fn default_verbs() -> Vec<String> {
    vec!["GET".to_string()]
}

impl RouteDef {
    /// Declared verbs as [`Method`]s; names are upper-cased first
    pub fn methods(&self) -> Result<Vec<Method>> {
        self.verbs
            .iter()
            .map(|v| {
                Method::from_bytes(v.trim().to_ascii_uppercase().as_bytes())
                    .with_context(|| format!("invalid verb '{v}'"))
            })
            .collect()
    }

    /// Compile the `constraints` map
    pub fn constraint_set(&self) -> Result<ConstraintSet> {
        let mut set = ConstraintSet::new();
        for (name, source) in &self.constraints {
            let constraint = Constraint::pattern(source)
                .with_context(|| format!("invalid constraint for '{name}': {source}"))?;
            set.insert(name, constraint);
        }
        Ok(set)
    }
}

/// Load a route file from disk
pub fn load_routes<P: AsRef<Path>>(path: P) -> Result<RouteFile> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read route file {}", path.display()))?;
    let file = parse_routes(&data)
        .with_context(|| format!("failed to parse route file {}", path.display()))?;
    debug!(path = %path.display(), routes_count = file.routes.len(), "Route file loaded");
    Ok(file)
}

/// Parse route declarations from a YAML string
pub fn parse_routes(yaml: &str) -> Result<RouteFile> {
    serde_yaml::from_str(yaml).context("invalid route file YAML")
}
