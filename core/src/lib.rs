#![deny(missing_docs)]

//! # CelPatch Core
//!
//! Post-processing for generated CRD manifests: injects `x-kubernetes-validations`
//! (CEL rules) into the schema of registered resources by editing the text in place,
//! leaving everything outside the injected block byte-identical.

/// Shared error types.
pub mod error;

/// Rule registry (resource name -> CEL rules).
pub mod registry;

/// Multi-document splitting and reassembly.
pub mod manifest;

/// Registry lookup for a document.
pub mod matcher;

/// Insertion point search.
pub mod locator;

/// Validation block rendering.
pub mod render;

/// Already-patched detection.
pub mod guard;

/// Post-patch YAML verification.
pub mod verify;

/// Orchestration of a whole patch run.
pub mod patcher;

pub use error::{AppError, AppResult};
pub use guard::{is_patched, GuardScope};
pub use locator::{locate, InsertionPoint};
pub use manifest::{Manifest, DOCUMENT_MARKER};
pub use matcher::match_document;
pub use patcher::{
    DocumentReport, DocumentStatus, PatchOptions, PatchOutcome, PatchReport, Patcher,
};
pub use registry::{Registry, TargetPath, ValidationRule, ValidationSpec, ACL_CRD_NAME};
pub use render::{render_validations, VALIDATIONS_HEADER, VALIDATIONS_KEY};
pub use verify::verify_document;
