//! Path addressing for the content tree.
//!
//! Every editable field on the site is addressed by a path string such as
//! `about.values[2].points[0]`. A path is a dot-separated list of segments,
//! each optionally suffixed with one or more `[n]` index accessors. Parsing
//! rewrites `[n]` to `.n`, drops empty components, and classifies every
//! all-digit component as a list index and everything else as a map key.
//!
//! # Usage
//!
//! ```rust
//! use sitecms::content::{Edit, Value, path::{self, PathBuf}};
//! use std::str::FromStr;
//!
//! let tree = Value::from(serde_json::json!({"contact": {"faq": {"questions": [{"answer": "Old"}]}}}));
//! let path = PathBuf::from_str("contact.faq.questions[0].answer")?;
//!
//! let updated = path::set(&tree, &path, Edit::Set("New".into()))?;
//! assert_eq!(path::get(&updated, &path), Some(&Value::from("New")));
//! // The input tree is untouched
//! assert_eq!(path::get(&tree, &path), Some(&Value::from("Old")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

use super::value::{Edit, Value};

/// Error type for path parsing and write failures.
///
/// Reads never surface these: a malformed or unresolvable path reads as
/// absent. Writes report them so the caller can decide to log and skip.
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path has no segments.
    #[error("Path is empty")]
    Empty,

    /// A `[` without a matching `]`, or a stray `]`.
    #[error("Unbalanced bracket in path '{path}'")]
    UnbalancedBracket { path: String },

    /// The text between brackets is not a non-negative integer.
    #[error("Invalid index '{index}' in path '{path}'")]
    InvalidIndex { path: String, index: String },

    /// The write would have to descend into a value that cannot hold children,
    /// or address a list by key.
    #[error("Cannot write '{path}': segment '{segment}' meets a {found} value")]
    TypeConflict {
        path: String,
        segment: String,
        found: &'static str,
    },

    /// A write addresses a list index too far past its end.
    #[error("Cannot write '{path}': index {index} is out of range for a list of {len}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

impl PathError {
    /// Check if this error comes from parsing rather than from the tree shape
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            PathError::Empty | PathError::UnbalancedBracket { .. } | PathError::InvalidIndex { .. }
        )
    }

    /// Check if this error comes from a shape mismatch in the tree
    pub fn is_type_conflict(&self) -> bool {
        matches!(self, PathError::TypeConflict { .. })
    }

    /// Check if this error comes from a list index beyond the growth limit
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, PathError::IndexOutOfRange { .. })
    }
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Map key
    Key(String),
    /// List position
    Index(usize),
}

impl Segment {
    fn parse(component: &str) -> Self {
        if component.bytes().all(|b| b.is_ascii_digit())
            && let Ok(index) = component.parse::<usize>()
        {
            return Segment::Index(index);
        }
        Segment::Key(component.to_string())
    }

    /// The key used when this segment addresses a map.
    ///
    /// Index segments address maps by their decimal form, so `faq.items[0]`
    /// still resolves when `items` happens to be stored as an object.
    pub fn map_key(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Segment::Key(key) => std::borrow::Cow::Borrowed(key),
            Segment::Index(index) => std::borrow::Cow::Owned(index.to_string()),
        }
    }

    fn empty_container(&self) -> Value {
        match self {
            Segment::Key(_) => Value::map(),
            Segment::Index(_) => Value::list(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{key}"),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Most null slots a single write may pad a list with.
///
/// Writing at `len + MAX_LIST_GAP` is allowed; any index past that is
/// rejected with [`PathError::IndexOutOfRange`].
pub const MAX_LIST_GAP: usize = 1024;

/// An owned, parsed path into the content tree.
///
/// Displays in canonical form (`a.b[2].c`), which is also the form used for
/// the `section` of history entries. Canonical form differs from the text a
/// path was parsed from when that text used dotted indices or stray dots:
/// `about.values.2` and `.about..values[2]` both display as
/// `about.values[2]`, and a leading index displays as `[0].a`. Parsing the
/// canonical form yields the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathBuf {
    segments: Vec<Segment>,
}

impl PathBuf {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a map key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    /// Appends a list index.
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first segment as a map key, used to label history entries by page.
    pub fn top_level(&self) -> Option<std::borrow::Cow<'_, str>> {
        self.segments.first().map(Segment::map_key)
    }
}

impl FromStr for PathBuf {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let rewritten = rewrite_brackets(input)?;
        let segments: Vec<Segment> = rewritten
            .split('.')
            .filter(|component| !component.is_empty())
            .map(Segment::parse)
            .collect();

        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(PathBuf { segments })
    }
}

impl TryFrom<&str> for PathBuf {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for PathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) if i == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

/// Rewrites every `[n]` accessor to `.n`, validating bracket contents.
fn rewrite_brackets(input: &str) -> Result<String, PathError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '[' => {
                let mut index = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    match inner {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '[' => {
                            return Err(PathError::UnbalancedBracket {
                                path: input.to_string(),
                            });
                        }
                        other => index.push(other),
                    }
                }
                if !closed {
                    return Err(PathError::UnbalancedBracket {
                        path: input.to_string(),
                    });
                }
                if index.is_empty()
                    || !index.bytes().all(|b| b.is_ascii_digit())
                    || index.parse::<usize>().is_err()
                {
                    return Err(PathError::InvalidIndex {
                        path: input.to_string(),
                        index,
                    });
                }
                out.push('.');
                out.push_str(&index);
            }
            ']' => {
                return Err(PathError::UnbalancedBracket {
                    path: input.to_string(),
                });
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Reads the value at `path`.
///
/// Returns `None` if any intermediate segment is missing, null, a scalar, or
/// indexes past the end of a list.
pub fn get<'a>(tree: &'a Value, path: &PathBuf) -> Option<&'a Value> {
    let mut current = tree;
    for segment in path.segments() {
        current = match (current, segment) {
            (Value::Map(map), segment) => map.get(segment.map_key().as_ref())?,
            (Value::List(items), Segment::Index(index)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Reads the value at a path string; malformed paths read as absent.
pub fn get_str<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let path = PathBuf::from_str(path).ok()?;
    get(tree, &path)
}

/// Returns a copy of `tree` with `edit` applied at `path`.
///
/// The input is never mutated. Missing or null intermediates are created as
/// `{}` when the next segment is a key and `[]` when it is an index; writing
/// past the end of a list pads the gap with nulls, up to [`MAX_LIST_GAP`]
/// slots. Deleting a leaf that does not exist returns an unchanged copy.
pub fn set(tree: &Value, path: &PathBuf, edit: Edit) -> Result<Value, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    let mut root = tree.clone();
    write(&mut root, path, 0, edit)?;
    Ok(root)
}

/// Parses `path` and applies [`set`].
pub fn set_str(tree: &Value, path: &str, edit: Edit) -> Result<Value, PathError> {
    let path = PathBuf::from_str(path)?;
    set(tree, &path, edit)
}

fn write(node: &mut Value, path: &PathBuf, depth: usize, edit: Edit) -> Result<(), PathError> {
    let segments = path.segments();
    let segment = &segments[depth];

    if depth + 1 == segments.len() {
        return write_leaf(node, path, segment, edit);
    }

    let creating = matches!(edit, Edit::Set(_));
    let next = &segments[depth + 1];
    let child = match node {
        Value::Map(map) => {
            let key = segment.map_key().into_owned();
            if !creating && !map.contains_key(&key) {
                return Ok(());
            }
            let child = map.entry(key).or_insert(Value::Null);
            if child.is_null() {
                if !creating {
                    return Ok(());
                }
                *child = next.empty_container();
            }
            child
        }
        Value::List(items) => {
            let Segment::Index(index) = *segment else {
                return Err(conflict(path, segment, "list"));
            };
            if index >= items.len() {
                if !creating {
                    return Ok(());
                }
                let len = grown_len(path, index, items.len())?;
                items.resize(len, Value::Null);
            }
            let child = &mut items[index];
            if child.is_null() {
                if !creating {
                    return Ok(());
                }
                *child = next.empty_container();
            }
            child
        }
        other => return Err(conflict(path, segment, other.type_name())),
    };

    write(child, path, depth + 1, edit)
}

fn write_leaf(
    node: &mut Value,
    path: &PathBuf,
    segment: &Segment,
    edit: Edit,
) -> Result<(), PathError> {
    match node {
        Value::Map(map) => {
            let key = segment.map_key().into_owned();
            match edit {
                Edit::Set(value) => {
                    map.insert(key, value);
                }
                Edit::Delete => {
                    map.remove(&key);
                }
            }
            Ok(())
        }
        Value::List(items) => {
            let Segment::Index(index) = *segment else {
                return Err(conflict(path, segment, "list"));
            };
            match edit {
                Edit::Set(value) => {
                    if index >= items.len() {
                        let len = grown_len(path, index, items.len())?;
                        items.resize(len - 1, Value::Null);
                        items.push(value);
                    } else {
                        items[index] = value;
                    }
                }
                Edit::Delete => {
                    if index < items.len() {
                        items.remove(index);
                    }
                }
            }
            Ok(())
        }
        other => Err(conflict(path, segment, other.type_name())),
    }
}

/// Length a list must grow to so that `index` exists.
fn grown_len(path: &PathBuf, index: usize, len: usize) -> Result<usize, PathError> {
    let out_of_range = || PathError::IndexOutOfRange {
        path: path.to_string(),
        index,
        len,
    };
    if index > len.saturating_add(MAX_LIST_GAP) {
        return Err(out_of_range());
    }
    index.checked_add(1).ok_or_else(out_of_range)
}

fn conflict(path: &PathBuf, segment: &Segment, found: &'static str) -> PathError {
    PathError::TypeConflict {
        path: path.to_string(),
        segment: segment.to_string(),
        found,
    }
}
