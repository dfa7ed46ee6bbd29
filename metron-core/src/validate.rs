// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// An error describing why input was rejected at a collector boundary, such
/// as an empty service namespace at construction or an empty observation
/// batch.
///
/// Validation failures are fatal to the call that raised them: the caller
/// must fix its input, there are no retry semantics. Unlike the happy path,
/// errors are free to allocate.
#[derive(Clone)]
pub struct ValidationError(Vec<String>);

impl ValidationError {
    /// Create a builder that composes multiple validation failures into a
    /// single [`ValidationError`]. If no failures are recorded,
    /// [`ValidationErrorBuilder::build()`] returns [`Ok`].
    pub fn builder() -> ValidationErrorBuilder {
        ValidationErrorBuilder::default()
    }

    /// Record a validation failure with a reason string.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self(vec![reason.into()])
    }

    /// Add the field `name` as context for all failures reported in `self`.
    pub fn for_field(mut self, name: &str) -> Self {
        for err in self.0.iter_mut() {
            *err = format!("for `{name}`: {err}");
        }
        self
    }
}

impl fmt::Debug for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.0).finish()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Builder that records validation failures over time and bundles them into
/// a single [`ValidationError`].
#[derive(Debug, Clone, Default)]
pub struct ValidationErrorBuilder(Vec<String>);

impl ValidationErrorBuilder {
    /// Returns [`Ok`] if no failures were recorded, otherwise an [`Err`]
    /// containing all of them.
    pub fn build(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self.0))
        }
    }

    /// Record a validation failure with a reason string.
    pub fn invalid(mut self, reason: impl Into<String>) -> Self {
        self.invalid_mut(reason);
        self
    }

    /// Record a validation failure with a reason string, but only require
    /// `&mut Self`.
    pub fn invalid_mut(&mut self, reason: impl Into<String>) -> &mut Self {
        self.0.push(reason.into());
        self
    }
}
