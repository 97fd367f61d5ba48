use dashmap::DashMap;
use tracing::{info, warn};

use super::core::{NameResolver, Target};

/// Concurrent name -> target registry.
///
/// The default [`NameResolver`]. Reads never block each other, so request
/// threads can resolve lazy endpoints while application code keeps defining
/// (or removing) targets.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: DashMap<String, Target>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) the target behind `qualified_name`
    pub fn define(&self, qualified_name: &str, target: Target) {
        if self
            .entries
            .insert(qualified_name.to_string(), target)
            .is_some()
        {
            warn!(qualified = %qualified_name, "Replaced existing endpoint target");
        } else {
            info!(
                qualified = %qualified_name,
                total_targets = self.entries.len(),
                "Endpoint target defined"
            );
        }
    }

    /// Remove a target; lazy endpoints naming it fail from the next call on
    pub fn remove(&self, qualified_name: &str) -> bool {
        self.entries.remove(qualified_name).is_some()
    }

    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.entries.contains_key(qualified_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NameResolver for HandlerRegistry {
    fn lookup(&self, qualified_name: &str) -> Option<Target> {
        self.entries.get(qualified_name).map(|e| e.value().clone())
    }
}
