//! Template persistence under a time budget

use crate::generation::extraction::{MAIN_MODULE_FILE, looks_like_module};
use crate::generation::{DEBUG_RAW_RESPONSE_FILE, FileMap, OutputService};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Budget for the debug file plus every extracted file
pub const DEFAULT_SAVE_TIMEOUT: Duration = Duration::from_secs(15);

/// A file that could not be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistFailure {
    pub file: String,
    pub message: String,
}

/// What ended up on disk for one template
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersistReport {
    pub directory: PathBuf,
    /// Relative paths present after the verification pass
    pub files: Vec<String>,
    pub timed_out: bool,
    pub errors: Vec<PersistFailure>,
    pub fallback_written: bool,
}

/// Materialises templates as `<root>/<template_id>/...`
///
/// Re-persisting the same id overwrites file by file. Nothing is ever deleted.
pub struct TemplatePersister {
    root: PathBuf,
    save_timeout: Duration,
    output: Arc<dyn OutputService>,
}

impl TemplatePersister {
    pub fn new(root: impl Into<PathBuf>, output: Arc<dyn OutputService>) -> Self {
        Self {
            root: root.into(),
            save_timeout: DEFAULT_SAVE_TIMEOUT,
            output,
        }
    }

    pub fn with_save_timeout(mut self, save_timeout: Duration) -> Self {
        self.save_timeout = save_timeout;
        self
    }

    pub fn template_directory(&self, template_id: &str) -> PathBuf {
        self.root.join(template_id)
    }

    /// Write the raw response and every file; never returns an error
    pub async fn persist(&self, template_id: &str, raw_response: &str, files: &FileMap) -> PersistReport {
        let directory = self.template_directory(template_id);
        let mut report = PersistReport {
            directory: directory.clone(),
            ..Default::default()
        };

        if let Err(e) = self.output.ensure_directory(&directory).await {
            error!(
                template_id = %template_id,
                directory = %directory.display(),
                error = %e,
                "Failed to create template directory"
            );
        }

        let save = self.save_all(&directory, raw_response, files, &mut report.errors);
        if tokio::time::timeout(self.save_timeout, save).await.is_err() {
            warn!(
                template_id = %template_id,
                timeout_secs = self.save_timeout.as_secs_f64(),
                "Template save timed out, keeping partial writes"
            );
            report.timed_out = true;
        }

        report.files = self.present_files(&directory).await;
        let has_source = report.files.iter().any(|f| f != DEBUG_RAW_RESPONSE_FILE);

        if !has_source && !raw_response.is_empty() {
            let path = directory.join(MAIN_MODULE_FILE);
            match self.output.write_file(&path, &fallback_module(raw_response)).await {
                Ok(()) => {
                    warn!(template_id = %template_id, "No source files extracted, wrote fallback module");
                    report.fallback_written = true;
                    report.files = self.present_files(&directory).await;
                }
                Err(e) => {
                    error!(template_id = %template_id, error = %e, "Failed to write fallback module");
                    report.errors.push(PersistFailure {
                        file: MAIN_MODULE_FILE.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            template_id = %template_id,
            files = report.files.len(),
            errors = report.errors.len(),
            timed_out = report.timed_out,
            fallback = report.fallback_written,
            "Template persisted"
        );
        report
    }

    async fn save_all(
        &self,
        directory: &Path,
        raw_response: &str,
        files: &FileMap,
        errors: &mut Vec<PersistFailure>,
    ) {
        self.write_one(directory, Path::new(DEBUG_RAW_RESPONSE_FILE), DEBUG_RAW_RESPONSE_FILE, raw_response, errors)
            .await;

        for (name, content) in files {
            match safe_relative_path(name) {
                Some(relative) => {
                    self.write_one(directory, &relative, name, content, errors).await;
                }
                None => {
                    warn!(file = %name, "Rejected file name outside the template directory");
                    errors.push(PersistFailure {
                        file: name.clone(),
                        message: "file name must be a relative path inside the template".to_string(),
                    });
                }
            }
        }
    }

    async fn write_one(
        &self,
        directory: &Path,
        relative: &Path,
        name: &str,
        content: &str,
        errors: &mut Vec<PersistFailure>,
    ) {
        match self.output.write_file(&directory.join(relative), content).await {
            Ok(()) => debug!(file = %name, bytes = content.len(), "Wrote template file"),
            Err(e) => {
                error!(file = %name, error = %e, "Failed to write template file");
                errors.push(PersistFailure {
                    file: name.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    async fn present_files(&self, directory: &Path) -> Vec<String> {
        match self.output.list_files(directory).await {
            Ok(mut files) => {
                files.sort();
                files
            }
            Err(e) => {
                warn!(directory = %directory.display(), error = %e, "Could not list template directory");
                Vec::new()
            }
        }
    }
}

/// Relative path for a reported file name, or `None` if it would escape the template
/// or clobber the debug copy
pub fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let name = name.trim();
    if name.is_empty() || name == DEBUG_RAW_RESPONSE_FILE {
        return None;
    }

    let path = Path::new(name);
    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (!relative.as_os_str().is_empty()).then_some(relative)
}

/// Contents of the fallback entry point when extraction produced nothing usable
pub fn fallback_module(raw_response: &str) -> String {
    if looks_like_module(raw_response) {
        return raw_response.to_string();
    }

    let mut module = String::from(
        "# Generated server scaffold\n\
         # The model response could not be split into files; it is kept below.\n\
         # TODO: implement the server described in the response.\n\
         #\n",
    );
    for line in raw_response.lines() {
        if line.is_empty() {
            module.push_str("#\n");
        } else {
            module.push_str("# ");
            module.push_str(line);
            module.push('\n');
        }
    }
    module.push_str(
        "\n\ndef main() -> None:\n    raise NotImplementedError(\"server not implemented yet\")\n\n\n\
         if __name__ == \"__main__\":\n    main()\n",
    );
    module
}
