//! Nested validation results.
//!
//! Request items form a tree (items and item groups); validating them
//! produces a `ValidationResult` tree of the same shape. A result is either
//! a success or an error carrying an `ApplicationError`, and either way it
//! carries the child results it aggregates.
//!
//! Validation outcomes are *data*, not control flow: they are returned to
//! the caller, who is expected to present them to a user or peer. Only a
//! shape mismatch when merging two trees is a hard error, since that
//! indicates a programming defect rather than a business-rule violation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code used when a parent result inherits an error from a child.
pub const INHERITED_FROM_ITEM_CODE: &str = "validation.inherited_from_item";

/// A machine-readable validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationError {
    /// Stable dotted error code, e.g. `"requests.invalid_request_item"`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ApplicationError {
    /// Creates an application error from code and message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The generic error a parent result carries when a child errored.
    #[must_use]
    pub fn inherited_from_item() -> Self {
        Self::new(
            INHERITED_FROM_ITEM_CODE,
            "Some child items have errors; this item inherited its error from them.",
        )
    }
}

impl std::fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Hard failure when merging two validation trees of different shape.
///
/// This is a true error (not a `ValidationResult`): the two trees were
/// produced for the same item tree, so diverging shapes mean a defect in the
/// producing code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation results have mismatching shapes: {left} vs {right} children")]
pub struct MergeError {
    /// Child count on the left tree.
    pub left: usize,
    /// Child count on the right tree.
    pub right: usize,
}

/// A validation outcome mirroring the shape of the validated item tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ValidationResult {
    /// The item (and all children) validated successfully.
    Success {
        /// Child results, in item order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<ValidationResult>,
    },
    /// The item failed validation.
    Error {
        /// The failure.
        error: ApplicationError,
        /// Child results, in item order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<ValidationResult>,
    },
}

impl ValidationResult {
    /// A leaf success.
    #[must_use]
    pub fn success() -> Self {
        Self::Success {
            children: Vec::new(),
        }
    }

    /// A leaf error.
    #[must_use]
    pub fn error(error: ApplicationError) -> Self {
        Self::Error {
            error,
            children: Vec::new(),
        }
    }

    /// Collapses a list of child results into one parent result.
    ///
    /// If any child is an error the parent is an error with the generic
    /// inherited-from-item failure; otherwise the parent is a success. The
    /// children are preserved verbatim either way.
    #[must_use]
    pub fn from_items(children: Vec<ValidationResult>) -> Self {
        if children.iter().any(ValidationResult::is_error) {
            Self::Error {
                error: ApplicationError::inherited_from_item(),
                children,
            }
        } else {
            Self::Success { children }
        }
    }

    /// Recursively merges two results produced for the same item tree.
    ///
    /// An error on either side wins at each node (left error taking
    /// precedence). Children are merged pairwise; a differing child count is
    /// a [`MergeError`].
    pub fn merge(left: ValidationResult, right: ValidationResult) -> Result<Self, MergeError> {
        let (left_children, right_children) = (left.children(), right.children());
        if left_children.len() != right_children.len() {
            return Err(MergeError {
                left: left_children.len(),
                right: right_children.len(),
            });
        }

        let mut merged_children = Vec::with_capacity(left_children.len());
        for (l, r) in left_children.iter().zip(right_children.iter()) {
            merged_children.push(Self::merge(l.clone(), r.clone())?);
        }

        Ok(match (&left, &right) {
            (Self::Error { error, .. }, _) | (_, Self::Error { error, .. }) => Self::Error {
                error: error.clone(),
                children: merged_children,
            },
            _ => Self::Success {
                children: merged_children,
            },
        })
    }

    /// Whether this node is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether this node is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The error at this node, if any.
    #[must_use]
    pub fn application_error(&self) -> Option<&ApplicationError> {
        match self {
            Self::Success { .. } => None,
            Self::Error { error, .. } => Some(error),
        }
    }

    /// The error code at this node, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.application_error().map(|e| e.code.as_str())
    }

    /// Child results, in item order.
    #[must_use]
    pub fn children(&self) -> &[ValidationResult] {
        match self {
            Self::Success { children } | Self::Error { children, .. } => children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_error() -> ApplicationError {
        ApplicationError::new("test.failure", "X")
    }

    #[test]
    fn from_items_with_error_child_inherits() {
        let result = ValidationResult::from_items(vec![
            ValidationResult::success(),
            ValidationResult::error(some_error()),
            ValidationResult::success(),
        ]);

        assert!(result.is_error());
        assert_eq!(result.error_code(), Some(INHERITED_FROM_ITEM_CODE));
        assert_eq!(result.children().len(), 3);
        assert!(result.children()[0].is_success());
        assert!(result.children()[1].is_error());
        assert_eq!(result.children()[1].error_code(), Some("test.failure"));
        assert!(result.children()[2].is_success());
    }

    #[test]
    fn from_items_all_success() {
        let result = ValidationResult::from_items(vec![
            ValidationResult::success(),
            ValidationResult::success(),
        ]);

        assert!(result.is_success());
        assert_eq!(result.children().len(), 2);
    }

    #[test]
    fn from_items_empty_is_success() {
        assert!(ValidationResult::from_items(Vec::new()).is_success());
    }

    #[test]
    fn merge_same_shape_error_wins() {
        let left = ValidationResult::Success {
            children: vec![ValidationResult::success()],
        };
        let right = ValidationResult::Error {
            error: some_error(),
            children: vec![ValidationResult::success()],
        };

        let merged = ValidationResult::merge(left, right).unwrap();
        assert!(merged.is_error());
        assert_eq!(merged.error_code(), Some("test.failure"));
        assert_eq!(merged.children().len(), 1);
    }

    #[test]
    fn merge_recurses_into_children() {
        let left = ValidationResult::Success {
            children: vec![ValidationResult::error(some_error())],
        };
        let right = ValidationResult::Success {
            children: vec![ValidationResult::success()],
        };

        let merged = ValidationResult::merge(left, right).unwrap();
        assert!(merged.is_success());
        assert!(merged.children()[0].is_error());
    }

    #[test]
    fn merge_shape_mismatch_is_hard_error() {
        let left = ValidationResult::Success {
            children: vec![ValidationResult::success()],
        };
        let right = ValidationResult::success();

        let err = ValidationResult::merge(left, right).unwrap_err();
        assert_eq!(err, MergeError { left: 1, right: 0 });
    }

    #[test]
    fn serialization_carries_result_tag() {
        let result = ValidationResult::error(some_error());
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"result\":\"error\""));
        assert!(json.contains("\"code\":\"test.failure\""));

        let parsed: ValidationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, parsed);
    }
}
