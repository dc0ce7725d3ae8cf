#![deny(missing_docs)]

//! # Manifest Patching
//!
//! Injects registered CEL rules into a multi-document CRD manifest.
//!
//! 1. **Guard**: skip text that already carries a validations block.
//! 2. **Split**: break the manifest into documents on `---` lines.
//! 3. **Match**: find the registry entry each document declares.
//! 4. **Locate & Render**: insert the rendered block at the located line.
//! 5. **Join**: reassemble the documents byte for byte.
//!
//! Text outside the injected block is never touched, so comments and
//! formatting survive.

use crate::error::AppResult;
use crate::guard::{is_patched, GuardScope};
use crate::locator::{locate, InsertionPoint};
use crate::manifest::{is_blank, Manifest};
use crate::matcher::match_document;
use crate::registry::{Registry, ValidationSpec};
use crate::render::render_validations;
use crate::verify::verify_document;

/// Knobs for a [`Patcher`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Scope of the already-patched check.
    pub guard: GuardScope,
    /// Re-parse every patched document before returning.
    pub verify: bool,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Empty or whitespace only; not inspected.
    Blank,
    /// No registry entry declared.
    Unmatched,
    /// A block was inserted.
    Injected {
        /// Matched resource identifier.
        resource: String,
        /// Where the block went.
        point: InsertionPoint,
    },
    /// Matched, but no insertion point exists; left unchanged.
    NoInsertionPoint {
        /// Matched resource identifier.
        resource: String,
    },
    /// Matched, but already carries a block (document guard only).
    AlreadyPatched {
        /// Matched resource identifier.
        resource: String,
    },
}

/// Per-document entry of a [`PatchReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    /// Position of the document in the manifest, blank ones counted.
    pub index: usize,
    /// Outcome for this document.
    pub status: DocumentStatus,
}

/// Summary of a patch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// One entry per document, in file order.
    pub documents: Vec<DocumentReport>,
}

impl PatchReport {
    /// Number of documents that received a block.
    pub fn injected_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.status, DocumentStatus::Injected { .. }))
            .count()
    }

    /// True if any document changed.
    pub fn is_modified(&self) -> bool {
        self.injected_count() > 0
    }

    fn skipped_by_guard(&self) -> bool {
        self.documents
            .iter()
            .any(|d| matches!(d.status, DocumentStatus::AlreadyPatched { .. }))
    }
}

/// Result of [`Patcher::patch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The guard fired; nothing should be written.
    AlreadyPatched,
    /// The guard passed; `content` is the full manifest to write back.
    Patched {
        /// Reassembled manifest.
        content: String,
        /// Per-document outcomes.
        report: PatchReport,
    },
}

/// Applies a [`Registry`] to manifests.
#[derive(Debug, Clone)]
pub struct Patcher {
    registry: Registry,
    options: PatchOptions,
}

impl Patcher {
    /// Creates a patcher with default options.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            options: PatchOptions::default(),
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: PatchOptions) -> Self {
        self.options = options;
        self
    }

    /// The registry in use.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The options in use.
    pub fn options(&self) -> PatchOptions {
        self.options
    }

    /// Patches a whole manifest.
    ///
    /// # Errors
    ///
    /// Only fails when verification is enabled and a patched document does not check out.
    pub fn patch(&self, content: &str) -> AppResult<PatchOutcome> {
        if self.options.guard == GuardScope::File && is_patched(content) {
            log::debug!("Validations header present, skipping file");
            return Ok(PatchOutcome::AlreadyPatched);
        }

        let mut manifest = Manifest::split(content);
        let mut report = PatchReport::default();

        for index in 0..manifest.len() {
            let Some(document) = manifest.document(index) else {
                continue;
            };
            let (status, patched) = self.patch_document(index, document)?;
            if let Some(text) = patched {
                manifest.replace(index, text);
            }
            report.documents.push(DocumentReport { index, status });
        }

        if self.options.guard == GuardScope::Document
            && !report.is_modified()
            && report.skipped_by_guard()
        {
            return Ok(PatchOutcome::AlreadyPatched);
        }

        Ok(PatchOutcome::Patched {
            content: manifest.to_string(),
            report,
        })
    }

    /// At most one block is inserted per document.
    fn patch_document(
        &self,
        index: usize,
        document: &str,
    ) -> AppResult<(DocumentStatus, Option<String>)> {
        if is_blank(document) {
            log::debug!("Document #{}: blank", index);
            return Ok((DocumentStatus::Blank, None));
        }

        let Some((resource, spec)) = match_document(document, &self.registry) else {
            log::debug!("Document #{}: no registered resource", index);
            return Ok((DocumentStatus::Unmatched, None));
        };
        let resource = resource.to_string();

        if self.options.guard == GuardScope::Document && is_patched(document) {
            log::warn!(
                "Document #{} ({}): validations already present, skipping",
                index,
                resource
            );
            return Ok((DocumentStatus::AlreadyPatched { resource }, None));
        }

        let Some(point) = locate(document, spec.target_path) else {
            log::warn!(
                "Document #{} ({}): no insertion point under '{}', left unchanged",
                index,
                resource,
                spec.target_path
            );
            return Ok((DocumentStatus::NoInsertionPoint { resource }, None));
        };

        log::debug!(
            "Document #{} ({}): inserting {} rule(s) at line {} indent {}",
            index,
            resource,
            spec.rules.len(),
            point.line_index,
            point.indent_width
        );

        let patched = insert_block(document, spec, point);
        if self.options.verify {
            verify_document(&patched, spec.rules.len())?;
        }

        Ok((DocumentStatus::Injected { resource, point }, Some(patched)))
    }
}

fn insert_block(document: &str, spec: &ValidationSpec, point: InsertionPoint) -> String {
    let mut block = render_validations(&spec.rules, point.indent_width);
    if point.line_ending(document) == "\r\n" {
        block = block.replace('\n', "\r\n");
    }

    let offset = point.byte_offset(document);
    let mut patched = String::with_capacity(document.len() + block.len());
    patched.push_str(&document[..offset]);
    patched.push_str(&block);
    patched.push_str(&document[offset..]);
    patched
}
