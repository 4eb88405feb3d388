use crate::catalog::{RoleCatalog, RoleKey};
use crate::matching::{find_best_match, resolve_alias};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("classifier backend unavailable: {0}")]
    Unavailable(String),
    #[error("classifier returned a malformed verdict: {0}")]
    Malformed(String),
}

/// Upstream best-effort role classifier. Exactly one attempt per
/// resolution; anything other than a clean, known, non-`Default` verdict
/// falls through to the local fuzzy matcher. Behind a trait so tests can
/// stub it deterministically.
pub trait RoleClassifier: Send + Sync + 'static {
    fn classify(&self, input: &str) -> Result<RoleKey, ClassifyError>;
}

/// Shared handle the analysis systems hand to their worker task.
#[derive(Resource, Clone)]
pub struct ClassifierHandle(pub Arc<dyn RoleClassifier>);

/// Default backend: always non-committal, so resolution runs purely on
/// the local matcher. Swap the handle to plug in a real backend.
pub struct OfflineClassifier;

impl RoleClassifier for OfflineClassifier {
    fn classify(&self, _input: &str) -> Result<RoleKey, ClassifyError> {
        Ok(RoleKey::default_key())
    }
}

/// Outcome of one analysis, cached across the page transition so the
/// result screen doesn't recompute. Invariant: `is_safe` mirrors the
/// catalog's safety flag for `matched_role` (enforced by `new`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub matched_role: RoleKey,
    pub is_safe: bool,
}

impl ResolutionResult {
    pub fn new(catalog: &RoleCatalog, matched_role: RoleKey) -> Self {
        let is_safe = catalog.is_safe(&matched_role);
        ResolutionResult {
            matched_role,
            is_safe,
        }
    }
}

/// Combine the classifier verdict with the local fuzzy fallback.
///
/// The alias stage has already been tried by the caller; this only
/// decides between "trust the upstream verdict" and "match locally".
/// A verdict naming a role the catalog doesn't know is treated the same
/// as a failure — the user always gets a result either way.
pub fn conclude(
    catalog: &RoleCatalog,
    input: &str,
    verdict: Result<RoleKey, ClassifyError>,
) -> RoleKey {
    match verdict {
        Ok(key) if !key.is_default() && catalog.contains(&key) => key,
        Ok(key) if !key.is_default() => {
            warn!("classifier returned unknown role `{key}`, matching locally");
            find_best_match(input, &catalog.candidate_keys())
        }
        Ok(_) => find_best_match(input, &catalog.candidate_keys()),
        Err(err) => {
            warn!("classifier failed ({err}), matching locally");
            find_best_match(input, &catalog.candidate_keys())
        }
    }
}

/// Full local resolution for callers that already have a verdict in hand:
/// alias stage first (unconditional), then classifier override, then
/// fuzzy. Empty input lands on `Default` via the fuzzy stage.
pub fn resolve(
    catalog: &RoleCatalog,
    input: &str,
    verdict: Result<RoleKey, ClassifyError>,
) -> ResolutionResult {
    let matched = match resolve_alias(catalog, input) {
        Some(key) => key,
        None => conclude(catalog, input, verdict),
    };
    ResolutionResult::new(catalog, matched)
}
