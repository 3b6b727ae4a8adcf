//! Attribute paths: `attr`, `["key"]`, `[2]`, `items[5]`, `foo.bar.baz`
//!
//! Bracket literals are constants (integers or quoted strings). A path is
//! data; it is never evaluated.

use crate::error::{AccessError, EngineError, Result};
use crate::value::{Key, Value};
use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t]+")]
enum PathToken {
    #[regex(r"[\p{XID_Start}_]\p{XID_Continue}*", |lex| lex.slice().to_string())]
    Name(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unescape(lex.slice()))]
    Str(String),

    #[token(".")]
    Dot,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

/// Strip the quotes off a string literal and resolve backslash escapes
fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// A single access step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// `.name` (or a leading bare name)
    Attr(String),
    /// `[literal]`
    Index(Key),
}

impl PathStep {
    fn get(&self, target: &Value) -> std::result::Result<Value, AccessError> {
        match self {
            PathStep::Attr(name) => target.get_attr(name),
            PathStep::Index(key) => target.get_item(key),
        }
    }

    fn set(&self, target: &Value, value: Value) -> std::result::Result<(), AccessError> {
        match self {
            PathStep::Attr(name) => target.set_attr(name, value),
            PathStep::Index(key) => target.set_item(key, value),
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Attr(name) => write!(f, ".{}", name),
            PathStep::Index(key) => write!(f, "[{}]", key),
        }
    }
}

/// Parsed attribute path
///
/// Reads and writes walk the same chain of steps. Only the terminal step of a
/// write has a side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    source: String,
    steps: Vec<PathStep>,
}

impl AttributePath {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |position: usize, message: String| EngineError::InvalidPath {
            path: text.to_string(),
            position,
            message,
        };

        let mut tokens = Vec::new();
        let mut lex = PathToken::lexer(text);
        while let Some(token) = lex.next() {
            match token {
                Ok(token) => tokens.push((token, lex.span().start)),
                Err(_) => {
                    return Err(invalid(
                        lex.span().start,
                        format!("unexpected '{}'", lex.slice()),
                    ))
                }
            }
        }

        let mut steps = Vec::new();
        let mut iter = tokens.into_iter().peekable();
        loop {
            let Some((token, pos)) = iter.next() else {
                break;
            };
            match token {
                PathToken::Name(name) if steps.is_empty() => steps.push(PathStep::Attr(name)),
                PathToken::Dot if !steps.is_empty() => match iter.next() {
                    Some((PathToken::Name(name), _)) => steps.push(PathStep::Attr(name)),
                    Some((_, p)) => return Err(invalid(p, "expected a name after '.'".into())),
                    None => return Err(invalid(text.len(), "path ends with '.'".into())),
                },
                PathToken::LBracket => {
                    let key = match iter.next() {
                        Some((PathToken::Int(i), _)) => Key::Int(i),
                        Some((PathToken::Str(s), _)) => Key::Str(s),
                        Some((_, p)) => {
                            return Err(invalid(p, "expected an integer or string literal".into()))
                        }
                        None => return Err(invalid(text.len(), "unclosed '['".into())),
                    };
                    match iter.next() {
                        Some((PathToken::RBracket, _)) => steps.push(PathStep::Index(key)),
                        Some((_, p)) => return Err(invalid(p, "expected ']'".into())),
                        None => return Err(invalid(text.len(), "unclosed '['".into())),
                    }
                }
                other => {
                    return Err(invalid(pos, format!("unexpected {:?}", other)));
                }
            }
        }

        if steps.is_empty() {
            return Err(invalid(0, "empty path".into()));
        }

        Ok(Self {
            source: text.to_string(),
            steps,
        })
    }

    /// The path as written by the caller
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Walk the path from `root` and return the value it names
    pub fn read(&self, root: &Value) -> Result<Value> {
        let mut current = root.clone();
        for step in &self.steps {
            current = step.get(&current).map_err(|cause| EngineError::AttributeMissing {
                path: self.source.clone(),
                cause,
            })?;
        }
        Ok(current)
    }

    /// Assign `value` at the end of the path
    ///
    /// The parent is resolved first; nothing is mutated unless the terminal
    /// assignment succeeds.
    pub fn write(&self, root: &Value, value: Value) -> Result<()> {
        let failed = |cause| EngineError::AttributeWriteFailed {
            path: self.source.clone(),
            cause,
        };
        let (last, parents) = match self.steps.split_last() {
            Some(split) => split,
            None => return Ok(()),
        };
        let mut parent = root.clone();
        for step in parents {
            parent = step.get(&parent).map_err(failed)?;
        }
        last.set(&parent, value).map_err(failed)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::str::FromStr for AttributePath {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
