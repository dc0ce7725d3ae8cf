#![deny(missing_docs)]

//! # Inject Command
//!
//! Patches a CRD manifest in place with the registered CEL validations.
//!
//! 1. **Arguments**: a missing path is a usage error, raised before any file access.
//! 2. **Registry**: the built-in table, or `--registry` / `CELPATCH_REGISTRY`.
//! 3. **Patch**: computed fully in memory by `celpatch_core::Patcher`.
//! 4. **Write**: past the guard the result is always written, atomically.

use crate::error::{CliError, CliResult};
use celpatch_core::{
    DocumentStatus, GuardScope, PatchOptions, PatchOutcome, PatchReport, Patcher, Registry,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Usage line printed when no manifest path is given.
pub const USAGE: &str = "Usage: celpatch <crd-file.yaml>";

/// Idempotency scope as accepted on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuardArg {
    /// Skip the whole file if any validations block exists.
    #[default]
    File,
    /// Skip only documents that already carry a block.
    Document,
}

impl From<GuardArg> for GuardScope {
    fn from(arg: GuardArg) -> Self {
        match arg {
            GuardArg::File => GuardScope::File,
            GuardArg::Document => GuardScope::Document,
        }
    }
}

/// Arguments for the inject command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InjectArgs {
    /// Path to the CRD manifest to patch in place.
    #[clap(value_name = "CRD_FILE")]
    pub file: Option<PathBuf>,

    /// YAML registry of validations to inject, replacing the built-in table.
    #[clap(long, env = "CELPATCH_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Granularity of the already-patched check.
    #[clap(long, value_enum, default_value_t = GuardArg::File)]
    pub guard: GuardArg,

    /// Re-parse patched documents and refuse to write if the block is malformed.
    #[clap(long)]
    pub verify: bool,

    /// Print the patched manifest to stdout instead of writing it.
    #[clap(long)]
    pub dry_run: bool,
}

/// What a successful run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Validations were already present; the file was not touched.
    Skipped,
    /// The manifest was written back.
    Written,
    /// The manifest was printed (`--dry-run`).
    Printed,
}

/// Executes the inject command.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &InjectArgs) -> CliResult<RunStatus> {
    let path = args
        .file
        .as_deref()
        .ok_or_else(|| CliError::Usage(USAGE.to_string()))?;

    if !path.exists() {
        return Err(CliError::NotFound(path.display().to_string()));
    }

    let registry = match &args.registry {
        Some(registry_path) => {
            log::debug!("Loading registry from {:?}", registry_path);
            Registry::from_path(registry_path)?
        }
        None => Registry::builtin(),
    };

    let patcher = Patcher::new(registry).with_options(PatchOptions {
        guard: args.guard.into(),
        verify: args.verify,
    });

    let content = fs::read_to_string(path)?;

    match patcher.patch(&content)? {
        PatchOutcome::AlreadyPatched => {
            println!("CEL validations already present in {}", path.display());
            Ok(RunStatus::Skipped)
        }
        PatchOutcome::Patched { content, report } => {
            log_report(path, &report);
            if args.dry_run {
                print!("{}", content);
                return Ok(RunStatus::Printed);
            }
            write_atomically(path, &content)?;
            println!("Injected CEL validations into {}", path.display());
            Ok(RunStatus::Written)
        }
    }
}

fn log_report(path: &Path, report: &PatchReport) {
    for doc in &report.documents {
        if let DocumentStatus::NoInsertionPoint { resource } = &doc.status {
            log::info!(
                "{}: document #{} declares {} but has no insertion point",
                path.display(),
                doc.index,
                resource
            );
        }
    }
    log::debug!(
        "{}: {} of {} document(s) patched",
        path.display(),
        report.injected_count(),
        report.documents.len()
    );
}

/// Writes `content` to a sibling temp file, then renames it over `path`.
fn write_atomically(path: &Path, content: &str) -> CliResult<()> {
    let target = fs::canonicalize(path)?;
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), fs::metadata(&target)?.permissions())?;
    tmp.persist(&target).map_err(|e| CliError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const ACL_CRD: &str = r#"apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: acls.messaging.example.com
spec:
  group: messaging.example.com
  versions:
  - name: v1
    schema:
      openAPIV3Schema:
        properties:
          spec:
            properties:
              consumerGroupRef:
                type: string
              topicRef:
                type: string
            type: object
          status:
            type: object
        type: object
"#;

    const TOPIC_CRD: &str = r#"apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: topics.messaging.example.com
spec:
  versions:
  - schema:
      openAPIV3Schema:
        properties:
          spec:
            type: object
          status:
            type: object
"#;

    fn args_for(file: &Path) -> InjectArgs {
        InjectArgs {
            file: Some(file.to_path_buf()),
            ..InjectArgs::default()
        }
    }

    #[test]
    fn test_execute_patches_then_skips() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("crds.yaml");
        let original = format!("{}---\n{}", ACL_CRD, TOPIC_CRD);
        fs::write(&file_path, &original).unwrap();

        let status = execute(&args_for(&file_path)).unwrap();
        assert_eq!(status, RunStatus::Written);

        let patched = fs::read_to_string(&file_path).unwrap();
        assert!(patched.contains(
            "            type: object\n            x-kubernetes-validations:\n              - rule: "
        ));
        assert!(patched.ends_with(&format!("---\n{}", TOPIC_CRD)));

        let status = execute(&args_for(&file_path)).unwrap();
        assert_eq!(status, RunStatus::Skipped);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), patched);
    }

    #[test]
    fn test_execute_writes_even_without_match() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("topics.yaml");
        fs::write(&file_path, TOPIC_CRD).unwrap();

        let status = execute(&args_for(&file_path)).unwrap();

        assert_eq!(status, RunStatus::Written);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), TOPIC_CRD);
    }

    #[test]
    fn test_execute_missing_argument() {
        let err = execute(&InjectArgs::default()).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(err.to_string(), USAGE);
    }

    #[test]
    fn test_execute_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.yaml");

        let err = execute(&args_for(&file_path)).unwrap_err();

        assert!(format!("{}", err).contains("File not found"));
        assert!(!file_path.exists());
    }

    #[test]
    fn test_execute_dry_run_leaves_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("acl.yaml");
        fs::write(&file_path, ACL_CRD).unwrap();

        let args = InjectArgs {
            dry_run: true,
            ..args_for(&file_path)
        };
        let status = execute(&args).unwrap();

        assert_eq!(status, RunStatus::Printed);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), ACL_CRD);
    }

    #[test]
    fn test_execute_with_external_registry() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("crds.yaml");
        let registry_path = dir.path().join("registry.yaml");
        fs::write(&file_path, format!("{}---\n{}", ACL_CRD, TOPIC_CRD)).unwrap();
        fs::write(
            &registry_path,
            r#"
topics.messaging.example.com:
  validations:
    - rule: "self.partitions > 0"
      message: "partitions must be positive"
"#,
        )
        .unwrap();

        let args = InjectArgs {
            registry: Some(registry_path),
            verify: true,
            ..args_for(&file_path)
        };
        execute(&args).unwrap();

        let patched = fs::read_to_string(&file_path).unwrap();
        assert!(patched.starts_with(ACL_CRD));
        assert!(patched.contains("message: \"partitions must be positive\""));
    }

    #[test]
    fn test_execute_invalid_registry_does_not_write() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("acl.yaml");
        let registry_path = dir.path().join("registry.yaml");
        fs::write(&file_path, ACL_CRD).unwrap();
        fs::write(&registry_path, "acls.messaging.example.com:\n  validations: []\n").unwrap();

        let args = InjectArgs {
            registry: Some(registry_path),
            ..args_for(&file_path)
        };
        let err = execute(&args).unwrap_err();

        assert!(matches!(err, CliError::Core(_)));
        assert_eq!(fs::read_to_string(&file_path).unwrap(), ACL_CRD);
    }

    #[test]
    fn test_execute_document_guard_patches_new_entries() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("crds.yaml");
        let registry_path = dir.path().join("registry.yaml");
        fs::write(&file_path, format!("{}---\n{}", ACL_CRD, TOPIC_CRD)).unwrap();
        execute(&args_for(&file_path)).unwrap();

        fs::write(
            &registry_path,
            r#"
acls.messaging.example.com:
  validations:
    - rule: "true"
      message: "never injected twice"
topics.messaging.example.com:
  validations:
    - rule: "self.partitions > 0"
      message: "partitions must be positive"
"#,
        )
        .unwrap();

        let file_scope = InjectArgs {
            registry: Some(registry_path.clone()),
            ..args_for(&file_path)
        };
        assert_eq!(execute(&file_scope).unwrap(), RunStatus::Skipped);

        let doc_scope = InjectArgs {
            registry: Some(registry_path),
            guard: GuardArg::Document,
            ..args_for(&file_path)
        };
        assert_eq!(execute(&doc_scope).unwrap(), RunStatus::Written);

        let patched = fs::read_to_string(&file_path).unwrap();
        assert_eq!(patched.matches("x-kubernetes-validations:").count(), 2);
        assert!(!patched.contains("never injected twice"));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("acl.yaml");
        fs::write(&file_path, ACL_CRD).unwrap();
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o644)).unwrap();

        execute(&args_for(&file_path)).unwrap();

        let mode = fs::metadata(&file_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
