use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Validation rule attached to one capture name.
///
/// `Pattern`, `Exact` and `OneOf` are folded into the compiled matcher, so a
/// path whose capture fails the rule simply does not match. `Predicate` cannot
/// be expressed structurally: the capture matches with its default rule and the
/// predicate runs on the decoded value afterwards. Paths carrying percent
/// escapes are matched with default rules only and every rule then runs on the
/// decoded value, the same form generation checks.
#[derive(Clone)]
pub enum Constraint {
    /// Regular expression the whole value must match
    Pattern {
        /// Unanchored source, embedded into the route matcher
        source: String,
        /// Anchored copy used to validate generation arguments
        anchored: Regex,
    },
    /// Value must equal this string exactly
    Exact(String),
    /// Value must be one of these strings
    OneOf(Vec<String>),
    /// Arbitrary check on the decoded value
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Constraint {
    /// Build a regex constraint. Leading `^` and trailing `$` are dropped so the
    /// expression can sit in the middle of a route matcher.
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        let source = strip_anchors(source);
        let anchored = Regex::new(&format!(r"\A(?:{source})\z"))?;
        Ok(Constraint::Pattern {
            source: source.to_string(),
            anchored,
        })
    }

    /// One or more ASCII digits
    #[must_use]
    pub fn digits() -> Self {
        Constraint::Pattern {
            source: "[0-9]+".to_string(),
            anchored: digits_regex().clone(),
        }
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Constraint::Predicate(Arc::new(f))
    }

    /// Regex fragment to embed in the route matcher, if this rule has one
    pub(crate) fn fragment(&self) -> Option<String> {
        match self {
            Constraint::Pattern { source, .. } => Some(source.clone()),
            Constraint::Exact(value) => Some(regex::escape(value)),
            Constraint::OneOf(values) => Some(
                values
                    .iter()
                    .map(|v| regex::escape(v))
                    .collect::<Vec<_>>()
                    .join("|"),
            ),
            Constraint::Predicate(_) => None,
        }
    }

    /// Does `value` satisfy the rule as a whole?
    #[must_use]
    pub fn check(&self, value: &str) -> bool {
        match self {
            Constraint::Pattern { anchored, .. } => anchored.is_match(value),
            Constraint::Exact(expected) => expected == value,
            Constraint::OneOf(values) => values.iter().any(|v| v == value),
            Constraint::Predicate(f) => f(value),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Pattern { source, .. } => f.debug_tuple("Pattern").field(source).finish(),
            Constraint::Exact(v) => f.debug_tuple("Exact").field(v).finish(),
            Constraint::OneOf(v) => f.debug_tuple("OneOf").field(v).finish(),
            Constraint::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

fn digits_regex() -> &'static Regex {
    static DIGITS: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"\A(?:[0-9]+)\z").expect("static digits regex")
    });
    &DIGITS
}

fn strip_anchors(source: &str) -> &str {
    let source = source
        .strip_prefix(r"\A")
        .or_else(|| source.strip_prefix('^'))
        .unwrap_or(source);
    if let Some(rest) = source.strip_suffix(r"\z") {
        return rest;
    }
    match source.strip_suffix('$') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => source,
    }
}

/// Rule a capture falls back to when the constraint set has no entry for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultRule {
    /// `:name` - one or more non-separator characters, as few as the rest of
    /// the template allows
    Segment,
    /// `:name` inside an optional group, right after a literal `/` - may be empty
    OptionalSegment,
    /// `*name` - anything, separators included, greedy
    Glob,
}

impl DefaultRule {
    pub(crate) fn fragment(self) -> &'static str {
        match self {
            DefaultRule::Segment => "[^/]+?",
            DefaultRule::OptionalSegment => "[^/]*?",
            DefaultRule::Glob => ".*",
        }
    }

    /// Checks a decoded value. A `/` inside a segment value is written as `%2F`.
    pub(crate) fn check(self, value: &str) -> bool {
        match self {
            DefaultRule::Segment => !value.is_empty(),
            DefaultRule::OptionalSegment | DefaultRule::Glob => true,
        }
    }
}

/// Per-capture constraints for one route template.
///
/// ```rust
/// use switchyard::pattern::{Constraint, ConstraintSet};
///
/// let constraints = ConstraintSet::new()
///     .with("id", Constraint::digits())
///     .with("format", Constraint::OneOf(vec!["json".into(), "xml".into()]));
/// assert!(constraints.get("id").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    rules: HashMap<String, Constraint>,
}

impl ConstraintSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rule for `name`
    #[must_use]
    pub fn with(mut self, name: &str, constraint: Constraint) -> Self {
        self.rules.insert(name.to_string(), constraint);
        self
    }

    pub fn insert(&mut self, name: &str, constraint: Constraint) {
        self.rules.insert(name.to_string(), constraint);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.rules.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}
