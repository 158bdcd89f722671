//! Deletion policies and visibility modes.
//!
//! Pure declarations: no storage access and no state. Declarations coming from
//! configuration are parsed here so an unknown policy is rejected where it is
//! declared, never at delete time.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What a `delete` call does for a document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPolicy {
    /// `delete` is a no-op.
    NoDelete,
    /// Stamp `deleted` and keep the document.
    SoftDelete,
    /// Soft-delete cascade-linked dependents, then this document.
    SoftDeleteCascade,
    /// Physically remove the document.
    HardDelete,
    /// Hard delete when the type has no cascade rules, soft delete otherwise.
    HardDeleteNoCascade,
}

impl DeletionPolicy {
    /// Stable string id used in declarations and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoDelete => POLICY_NO_DELETE,
            Self::SoftDelete => POLICY_SOFT_DELETE,
            Self::SoftDeleteCascade => POLICY_SOFT_DELETE_CASCADE,
            Self::HardDelete => POLICY_HARD_DELETE,
            Self::HardDeleteNoCascade => POLICY_HARD_DELETE_NOCASCADE,
        }
    }
}

impl Display for DeletionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const POLICY_NO_DELETE: &str = "no_delete";
pub const POLICY_SOFT_DELETE: &str = "soft_delete";
pub const POLICY_SOFT_DELETE_CASCADE: &str = "soft_delete_cascade";
pub const POLICY_HARD_DELETE: &str = "hard_delete";
pub const POLICY_HARD_DELETE_NOCASCADE: &str = "hard_delete_nocascade";

/// Parses one deletion policy from its declaration string.
pub fn parse_deletion_policy(value: &str) -> Result<DeletionPolicy, PolicyParseError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(PolicyParseError::Empty);
    }

    match normalized {
        POLICY_NO_DELETE => Ok(DeletionPolicy::NoDelete),
        POLICY_SOFT_DELETE => Ok(DeletionPolicy::SoftDelete),
        POLICY_SOFT_DELETE_CASCADE => Ok(DeletionPolicy::SoftDeleteCascade),
        POLICY_HARD_DELETE => Ok(DeletionPolicy::HardDelete),
        POLICY_HARD_DELETE_NOCASCADE => Ok(DeletionPolicy::HardDeleteNoCascade),
        other => Err(PolicyParseError::Unsupported(other.to_string())),
    }
}

/// Deletion policy parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyParseError {
    Empty,
    Unsupported(String),
}

impl Display for PolicyParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "deletion policy value must not be empty"),
            Self::Unsupported(value) => write!(f, "deletion policy is unsupported: {value}"),
        }
    }
}

impl Error for PolicyParseError {}

/// How a query treats soft-deleted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Exclude soft-deleted documents.
    Invisible,
    /// Include every document.
    Visible,
    /// Soft-deleted documents only.
    OnlyVisible,
    /// Invisible, unless a filter references the designated visibility field.
    VisibleByField,
}

impl Visibility {
    /// Stable string id used in declarations and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invisible => VISIBILITY_INVISIBLE,
            Self::Visible => VISIBILITY_VISIBLE,
            Self::OnlyVisible => VISIBILITY_ONLY_VISIBLE,
            Self::VisibleByField => VISIBILITY_VISIBLE_BY_FIELD,
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const VISIBILITY_INVISIBLE: &str = "invisible";
pub const VISIBILITY_VISIBLE: &str = "visible";
pub const VISIBILITY_ONLY_VISIBLE: &str = "only_visible";
pub const VISIBILITY_VISIBLE_BY_FIELD: &str = "visible_by_field";

/// Parses one visibility mode from its declaration string.
pub fn parse_visibility(value: &str) -> Result<Visibility, VisibilityParseError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(VisibilityParseError::Empty);
    }

    match normalized {
        VISIBILITY_INVISIBLE => Ok(Visibility::Invisible),
        VISIBILITY_VISIBLE => Ok(Visibility::Visible),
        VISIBILITY_ONLY_VISIBLE => Ok(Visibility::OnlyVisible),
        VISIBILITY_VISIBLE_BY_FIELD => Ok(Visibility::VisibleByField),
        other => Err(VisibilityParseError::Unsupported(other.to_string())),
    }
}

/// Visibility mode parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityParseError {
    Empty,
    Unsupported(String),
}

impl Display for VisibilityParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "visibility value must not be empty"),
            Self::Unsupported(value) => write!(f, "visibility is unsupported: {value}"),
        }
    }
}

impl Error for VisibilityParseError {}
