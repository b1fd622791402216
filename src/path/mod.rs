use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between labels in a stored path.
pub const DELIMITER: char = '.';

/// Matches the VARCHAR(100) cap on subdivision names.
pub const MAX_LABEL_LEN: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Path would be empty")]
    Empty,
}

/// Materialized path of a subdivision: the labels of its ancestors and
/// itself, root first, joined with `.` (e.g. `engineering.backend.platform`).
///
/// Labels are restricted to `[A-Za-z0-9_]`, so the delimiter can never occur
/// inside a label and segment boundaries are unambiguous. Stored as plain
/// `TEXT`; lexical order on the string puts ancestors before descendants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct LabelPath(String);

impl LabelPath {
    /// Single-label path for a root subdivision.
    pub fn root(label: &str) -> Result<Self, PathError> {
        validate_label(label)?;
        Ok(Self(label.to_string()))
    }

    /// Path of a child of `self` named `label`.
    pub fn child(&self, label: &str) -> Result<Self, PathError> {
        validate_label(label)?;
        Ok(Self(format!("{}{}{}", self.0, DELIMITER, label)))
    }

    /// `label` alone when `parent` is absent, `parent.label` otherwise.
    pub fn join(parent: Option<&LabelPath>, label: &str) -> Result<Self, PathError> {
        match parent {
            Some(parent) => parent.child(label),
            None => Self::root(label),
        }
    }

    /// Path with the last label removed; `None` if `self` is a root path.
    pub fn parent(&self) -> Option<LabelPath> {
        self.0
            .rsplit_once(DELIMITER)
            .map(|(head, _)| Self(head.to_string()))
    }

    pub fn last_label(&self) -> &str {
        self.0.rsplit(DELIMITER).next().unwrap_or(&self.0)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split(DELIMITER)
    }

    /// Replaces the first occurrence of `old` as a whole segment with `new`.
    ///
    /// Matching is segment-wise: renaming `sales` leaves a sibling label
    /// `salesforce` untouched. Returns the path unchanged when `old` is not
    /// a segment of it.
    pub fn replace_label(&self, old: &str, new: &str) -> Result<LabelPath, PathError> {
        validate_label(new)?;
        let mut replaced = false;
        let labels: Vec<&str> = self
            .labels()
            .map(|label| {
                if !replaced && label == old {
                    replaced = true;
                    new
                } else {
                    label
                }
            })
            .collect();
        Ok(Self(labels.join(".")))
    }

    /// Removes the first occurrence of `label` as a whole segment,
    /// promoting everything below it one level up. Returns the path
    /// unchanged when `label` is not a segment, and `PathError::Empty` when
    /// removal would leave no segments at all.
    pub fn strip_label(&self, label: &str) -> Result<LabelPath, PathError> {
        let mut stripped = false;
        let labels: Vec<&str> = self
            .labels()
            .filter(|candidate| {
                if !stripped && *candidate == label {
                    stripped = true;
                    false
                } else {
                    true
                }
            })
            .collect();
        if labels.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(labels.join(".")))
    }

    /// True iff `self` is `ancestor` itself or lies below it in the tree.
    /// Prefix matching is segment-wise: `ab` is not a descendant of `a`.
    pub fn is_descendant_or_self(&self, ancestor: &LabelPath) -> bool {
        if self.0 == ancestor.0 {
            return true;
        }
        self.0.len() > ancestor.0.len()
            && self.0.starts_with(ancestor.0.as_str())
            && self.0.as_bytes()[ancestor.0.len()] == DELIMITER as u8
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LabelPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        for label in s.split(DELIMITER) {
            validate_label(label)?;
        }
        Ok(Self(s.to_string()))
    }
}

/// Validate a single label. The alphabet mirrors what the backing store can
/// index as a path segment: ASCII alphanumerics and underscore, 1..=100
/// characters. The delimiter is excluded by construction.
pub fn validate_label(label: &str) -> Result<(), PathError> {
    if label.is_empty() {
        return Err(PathError::InvalidLabel("label is empty".to_string()));
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(PathError::InvalidLabel(format!(
            "label exceeds {} characters",
            MAX_LABEL_LEN
        )));
    }
    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(PathError::InvalidLabel(format!(
            "label {:?} contains characters outside [A-Za-z0-9_]",
            label
        )));
    }
    Ok(())
}
