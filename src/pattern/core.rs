//! Pattern core module - template compilation, matching and generation.
//!
//! Matching sits on the request hot path: fixed templates compare strings,
//! everything else runs an anchored regex built at compile time. Templates
//! with regex-like constraints keep a second, unconstrained regex for paths
//! carrying percent escapes, whose captures are checked after decoding.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use super::constraint::{Constraint, ConstraintSet, DefaultRule};
use crate::error::RouterError;

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` shared with the compiled pattern; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Characters escaped when a glob value is written into a path.
const GLOB_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Named captures additionally escape the separator.
const SEGMENT_ENCODE: &AsciiSet = &GLOB_ENCODE.add(b'/');

/// One parsed piece of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, escapes already resolved
    Literal(String),
    /// `:name`
    Capture(String),
    /// `*name`
    Glob(String),
    /// `( ... )`
    Optional(Vec<Token>),
}

/// Arguments for path generation.
///
/// Both calling conventions are supported: keyed arguments are bound by name
/// and any key no capture consumes becomes part of the query string;
/// positional arguments are assigned to captures in template order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RouteArgs {
    #[default]
    None,
    Keyed(Vec<(String, String)>),
    Positional(Vec<String>),
}

impl RouteArgs {
    /// Keyed arguments, in caller order
    pub fn keyed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        RouteArgs::Keyed(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }

    /// Positional arguments, in template order
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        RouteArgs::Positional(values.into_iter().map(|v| v.to_string()).collect())
    }
}

impl From<&ParamVec> for RouteArgs {
    fn from(params: &ParamVec) -> Self {
        RouteArgs::Keyed(
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
struct CaptureSpec {
    name: Arc<str>,
    rule: DefaultRule,
    constraint: Option<Constraint>,
}

impl CaptureSpec {
    fn accepts(&self, value: &str) -> bool {
        match &self.constraint {
            Some(c) => c.check(value),
            None => self.rule.check(value),
        }
    }

    fn is_glob(&self) -> bool {
        self.rule == DefaultRule::Glob
    }

    fn has_fragment(&self) -> bool {
        self.constraint
            .as_ref()
            .is_some_and(|c| c.fragment().is_some())
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    /// No captures and no optional groups: plain string equality
    Fixed(String),
    Compiled {
        /// Constraint fragments embedded; used for paths without escapes
        constrained: Regex,
        /// Default rules only, present when some capture has a fragment
        structural: Option<Regex>,
    },
}

/// A compiled route template.
///
/// Built once at registration and immutable afterwards; the constraint set is
/// copied in at compile time.
#[derive(Clone)]
pub struct PathPattern {
    template: String,
    tokens: Vec<Token>,
    captures: Vec<CaptureSpec>,
    matcher: Matcher,
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathPattern")
            .field("template", &self.template)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl PathPattern {
    /// Compile `template` with the given per-capture constraints.
    ///
    /// # Errors
    ///
    /// [`RouterError::PatternCompile`] for unbalanced groups, a capture marker
    /// without a valid name, a dangling escape, or a capture name used twice.
    pub fn compile(template: &str, constraints: &ConstraintSet) -> Result<Self, RouterError> {
        let tokens = Parser::new(template).parse()?;

        let mut captures = Vec::new();
        collect_captures(&tokens, constraints, &mut captures, template)?;

        let matcher = if tokens.iter().all(|t| matches!(t, Token::Literal(_))) {
            let fixed: String = tokens
                .iter()
                .filter_map(|t| match t {
                    Token::Literal(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            Matcher::Fixed(fixed)
        } else {
            let constrained = build_regex(&tokens, &captures, true, template)?;
            let structural = if captures.iter().any(CaptureSpec::has_fragment) {
                Some(build_regex(&tokens, &captures, false, template)?)
            } else {
                None
            };
            Matcher::Compiled {
                constrained,
                structural,
            }
        };

        Ok(Self {
            template: template.to_string(),
            tokens,
            captures,
            matcher,
        })
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Capture names in template order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.captures.iter().map(|c| c.name.as_ref())
    }

    /// True when the template has no captures and no optional groups
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self.matcher, Matcher::Fixed(_))
    }

    /// Match a request path (query string excluded) against the whole template.
    ///
    /// Returns the bound captures, percent-decoded, in template order. Captures
    /// in optional groups that did not participate are absent from the result.
    /// Constraints always apply to the decoded value.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<ParamVec> {
        match &self.matcher {
            Matcher::Fixed(fixed) => (fixed == path).then(ParamVec::new),
            Matcher::Compiled {
                constrained,
                structural,
            } => {
                let (regex, recheck_all) = match structural {
                    Some(structural) if path.contains('%') => (structural, true),
                    _ => (constrained, false),
                };
                let caps = regex.captures(path)?;
                let mut params = ParamVec::new();
                for spec in &self.captures {
                    let Some(m) = caps.name(&spec.name) else {
                        continue;
                    };
                    let value = percent_decode_str(m.as_str())
                        .decode_utf8_lossy()
                        .into_owned();
                    let recheck =
                        recheck_all || matches!(spec.constraint, Some(Constraint::Predicate(_)));
                    if recheck && !spec.accepts(&value) {
                        return None;
                    }
                    params.push((Arc::clone(&spec.name), value));
                }
                Some(params)
            }
        }
    }

    /// Build a concrete path from `args`.
    ///
    /// # Errors
    ///
    /// - [`RouterError::InsufficientArguments`] when a required capture has no value
    /// - [`RouterError::TooManyArguments`] when more positional values than captures are given
    /// - [`RouterError::ArgumentConstraint`] when a value fails its capture's rule
    pub fn generate(&self, args: &RouteArgs) -> Result<String, RouterError> {
        match args {
            RouteArgs::None => self.expand_keyed(&[]),
            RouteArgs::Keyed(pairs) => self.expand_keyed(pairs),
            RouteArgs::Positional(values) => {
                if values.len() > self.captures.len() {
                    return Err(RouterError::TooManyArguments {
                        expected: self.captures.len(),
                        given: values.len(),
                    });
                }
                let pairs: Vec<(String, String)> = self
                    .captures
                    .iter()
                    .zip(values)
                    .map(|(spec, v)| (spec.name.to_string(), v.clone()))
                    .collect();
                self.expand_keyed(&pairs)
            }
        }
    }

    fn expand_keyed(&self, pairs: &[(String, String)]) -> Result<String, RouterError> {
        let mut out = String::with_capacity(self.template.len());
        let mut consumed: SmallVec<[&str; MAX_INLINE_PARAMS]> = SmallVec::new();
        self.expand(&self.tokens, pairs, &mut out, &mut consumed)?;

        let mut surplus = pairs
            .iter()
            .filter(|(k, _)| !consumed.contains(&k.as_str()))
            .peekable();
        if surplus.peek().is_some() {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            for (k, v) in surplus {
                query.append_pair(k, v);
            }
            out.push('?');
            out.push_str(&query.finish());
        }
        Ok(out)
    }

    fn expand<'a>(
        &'a self,
        tokens: &'a [Token],
        pairs: &[(String, String)],
        out: &mut String,
        consumed: &mut SmallVec<[&'a str; MAX_INLINE_PARAMS]>,
    ) -> Result<(), RouterError> {
        for token in tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Capture(name) | Token::Glob(name) => {
                    let value = lookup(pairs, name).ok_or_else(|| {
                        RouterError::InsufficientArguments { name: name.clone() }
                    })?;
                    let spec = self.spec(name);
                    if let Some(spec) = spec {
                        if !spec.accepts(value) {
                            return Err(RouterError::ArgumentConstraint {
                                name: name.clone(),
                                value: value.to_string(),
                            });
                        }
                    }
                    let set = match spec {
                        Some(s) if s.is_glob() => GLOB_ENCODE,
                        _ => SEGMENT_ENCODE,
                    };
                    out.extend(utf8_percent_encode(value, set));
                    consumed.push(name.as_str());
                }
                Token::Optional(inner) => {
                    if group_satisfied(inner, pairs) {
                        self.expand(inner, pairs, out, consumed)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn spec(&self, name: &str) -> Option<&CaptureSpec> {
        self.captures.iter().find(|c| c.name.as_ref() == name)
    }
}

fn lookup<'p>(pairs: &'p [(String, String)], name: &str) -> Option<&'p str> {
    pairs
        .iter()
        .rfind(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// An optional group is emitted when all of its direct captures have values
/// and it binds at least one capture (directly or through a nested group).
fn group_satisfied(tokens: &[Token], pairs: &[(String, String)]) -> bool {
    let mut binds_any = false;
    for token in tokens {
        match token {
            Token::Capture(name) | Token::Glob(name) => {
                if lookup(pairs, name).is_none() {
                    return false;
                }
                binds_any = true;
            }
            Token::Optional(inner) => {
                binds_any |= group_satisfied(inner, pairs);
            }
            Token::Literal(_) => {}
        }
    }
    binds_any
}

fn collect_captures(
    tokens: &[Token],
    constraints: &ConstraintSet,
    out: &mut Vec<CaptureSpec>,
    template: &str,
) -> Result<(), RouterError> {
    collect_in(tokens, false, constraints, out, template)
}

fn collect_in(
    tokens: &[Token],
    optional: bool,
    constraints: &ConstraintSet,
    out: &mut Vec<CaptureSpec>,
    template: &str,
) -> Result<(), RouterError> {
    let mut after_separator = false;
    for token in tokens {
        match token {
            Token::Literal(text) => {
                after_separator = text.ends_with('/');
                continue;
            }
            Token::Capture(name) | Token::Glob(name) => {
                if out.iter().any(|c| c.name.as_ref() == name) {
                    return Err(RouterError::compile(
                        template,
                        format!("capture '{name}' is used more than once"),
                    ));
                }
                let rule = match token {
                    Token::Glob(_) => DefaultRule::Glob,
                    _ if optional && after_separator => DefaultRule::OptionalSegment,
                    _ => DefaultRule::Segment,
                };
                out.push(CaptureSpec {
                    name: Arc::from(name.as_str()),
                    rule,
                    constraint: constraints.get(name).cloned(),
                });
            }
            Token::Optional(inner) => {
                collect_in(inner, true, constraints, out, template)?;
            }
        }
        after_separator = false;
    }
    Ok(())
}

fn build_regex(
    tokens: &[Token],
    captures: &[CaptureSpec],
    embed_constraints: bool,
    template: &str,
) -> Result<Regex, RouterError> {
    let mut source = String::with_capacity(template.len() * 2);
    source.push_str(r"\A");
    write_regex(tokens, captures, embed_constraints, &mut source);
    source.push_str(r"\z");
    Regex::new(&source).map_err(|e| RouterError::compile(template, format!("invalid matcher: {e}")))
}

fn write_regex(tokens: &[Token], captures: &[CaptureSpec], embed_constraints: bool, out: &mut String) {
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(&regex::escape(text)),
            Token::Capture(name) | Token::Glob(name) => {
                let Some(spec) = captures.iter().find(|c| c.name.as_ref() == name) else {
                    continue;
                };
                let fragment = spec
                    .constraint
                    .as_ref()
                    .filter(|_| embed_constraints)
                    .and_then(Constraint::fragment)
                    .unwrap_or_else(|| spec.rule.fragment().to_string());
                out.push_str("(?P<");
                out.push_str(name);
                out.push_str(">(?:");
                out.push_str(&fragment);
                out.push_str("))");
            }
            Token::Optional(inner) => {
                out.push_str("(?:");
                write_regex(inner, captures, embed_constraints, out);
                out.push_str(")?");
            }
        }
    }
}

/// Recursive-descent parser for the template syntax.
struct Parser<'t> {
    template: &'t str,
    chars: std::iter::Peekable<std::str::Chars<'t>>,
}

impl<'t> Parser<'t> {
    fn new(template: &'t str) -> Self {
        Self {
            template,
            chars: template.chars().peekable(),
        }
    }

    fn parse(mut self) -> Result<Vec<Token>, RouterError> {
        self.sequence(false)
    }

    fn sequence(&mut self, nested: bool) -> Result<Vec<Token>, RouterError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.chars.next() {
            match c {
                '\\' => {
                    let escaped = self
                        .chars
                        .next()
                        .ok_or_else(|| RouterError::compile(self.template, "dangling escape"))?;
                    push_literal(&mut tokens, escaped);
                }
                ':' => tokens.push(Token::Capture(self.name(':')?)),
                '*' => tokens.push(Token::Glob(self.name('*')?)),
                '(' => {
                    let inner = self.sequence(true)?;
                    tokens.push(Token::Optional(inner));
                }
                ')' if nested => return Ok(tokens),
                ')' => return Err(RouterError::compile(self.template, "unbalanced ')'")),
                other => push_literal(&mut tokens, other),
            }
        }
        if nested {
            return Err(RouterError::compile(self.template, "unclosed '('"));
        }
        Ok(tokens)
    }

    fn name(&mut self, marker: char) -> Result<String, RouterError> {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            let valid = c == '_' || c.is_ascii_alphabetic() || (!name.is_empty() && c.is_ascii_digit());
            if !valid {
                break;
            }
            name.push(c);
            self.chars.next();
        }
        if name.is_empty() {
            return Err(RouterError::compile(
                self.template,
                format!("'{marker}' must be followed by a capture name"),
            ));
        }
        Ok(name)
    }
}

fn push_literal(tokens: &mut Vec<Token>, c: char) {
    if let Some(Token::Literal(text)) = tokens.last_mut() {
        text.push(c);
    } else {
        tokens.push(Token::Literal(c.to_string()));
    }
}
