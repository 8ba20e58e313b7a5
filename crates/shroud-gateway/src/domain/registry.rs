//! # Shape Registry
//!
//! Per-class shapes and plans, fixed at deployment. Built once from a fully
//! validated manifest; runtime discovery of a new class is rejected, because
//! a new class is a new code path and admitting one at runtime would itself
//! leak.

use crate::domain::entities::{ClassSpec, DeploymentManifest};
use crate::domain::invariants;
use crate::domain::value_objects::ClassId;
use crate::errors::ShapeError;
use std::collections::BTreeMap;

/// Read-only lookup of class specs.
#[derive(Clone, Debug, Default)]
pub struct ShapeRegistry {
    classes: BTreeMap<ClassId, ClassSpec>,
}

impl ShapeRegistry {
    /// Creates an empty registry (deployment-time use only).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a manifest, validating every deployment-time
    /// invariant first.
    ///
    /// # Errors
    ///
    /// `ShapeError::InvalidManifest` when any invariant fails;
    /// `ShapeError::ConflictingShape` cannot occur here because the manifest
    /// map already has unique class ids, but `register` still guards it.
    pub fn from_manifest(manifest: &DeploymentManifest) -> Result<Self, ShapeError> {
        let check = invariants::check_manifest(manifest);
        if let invariants::InvariantCheckResult::Invalid(violations) = check {
            return Err(ShapeError::InvalidManifest {
                violations: violations.iter().map(ToString::to_string).collect(),
            });
        }

        let mut registry = Self::new();
        for (class, spec) in &manifest.classes {
            registry.register(class.clone(), spec.clone())?;
        }
        Ok(registry)
    }

    /// Registers a class spec. Re-registering with an identical canonical
    /// size replaces the spec; a different size is a conflict.
    ///
    /// # Errors
    ///
    /// `ShapeError::ConflictingShape` when the class already has a shape of
    /// different canonical size.
    pub fn register(&mut self, class: ClassId, spec: ClassSpec) -> Result<(), ShapeError> {
        if let Some(existing) = self.classes.get(&class) {
            if existing.message.canonical_size != spec.message.canonical_size {
                return Err(ShapeError::ConflictingShape {
                    class,
                    existing: existing.message.canonical_size,
                    proposed: spec.message.canonical_size,
                });
            }
        }
        self.classes.insert(class, spec);
        Ok(())
    }

    /// Looks up a class spec.
    ///
    /// # Errors
    ///
    /// `ShapeError::UnknownClass` when the class was never registered.
    pub fn lookup(&self, class: &ClassId) -> Result<&ClassSpec, ShapeError> {
        self.classes
            .get(class)
            .ok_or_else(|| ShapeError::UnknownClass(class.clone()))
    }

    /// Iterates all registered classes.
    pub fn classes(&self) -> impl Iterator<Item = (&ClassId, &ClassSpec)> {
        self.classes.iter()
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true when no class is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
