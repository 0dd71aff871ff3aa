// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch orchestrator — verifies every document in a directory that matches a
// glob pattern. A failing document never stops the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};
use urkunde_core::config::MAX_CONCURRENT_DOCUMENTS;
use urkunde_core::error::{Result, UrkundeError};
use urkunde_core::types::AuthenticityCheck;
use urkunde_security::AuditStage;

use crate::pipeline::AuthenticityVerifier;

/// A document the batch could not verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Everything a batch run produced, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub checks: Vec<AuthenticityCheck>,
    pub failures: Vec<BatchFailure>,
}

impl AuthenticityVerifier {
    /// Verify every file in `dir` matching `pattern` (the configured default
    /// when `None`), in sorted path order.
    ///
    /// Only an invalid pattern fails the call. Documents run one at a time
    /// unless `batch.max_concurrent_documents` allows more; results keep file
    /// order either way.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub async fn run_batch(
        &self,
        dir: impl AsRef<Path>,
        pattern: Option<&str>,
    ) -> Result<BatchOutcome> {
        let pattern = pattern.unwrap_or(&self.config().batch.default_pattern);
        let (paths, mut failures) = matching_files(dir.as_ref(), pattern)?;
        info!(documents = paths.len(), pattern, "batch started");

        let results = if self.config().batch.max_concurrent_documents <= 1 {
            self.verify_sequential(paths).await
        } else {
            self.verify_concurrent(paths).await
        };

        let mut checks = Vec::with_capacity(results.len());
        for (path, result) in results {
            match result {
                Ok(check) => checks.push(check),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "document verification failed");
                    let message = err.to_string();
                    self.record(
                        &path.display().to_string(),
                        AuditStage::BatchFailure,
                        None,
                        false,
                        Some(&message),
                    );
                    failures.push(BatchFailure { path, message });
                }
            }
        }

        info!(verified = checks.len(), failed = failures.len(), "batch finished");
        Ok(BatchOutcome { checks, failures })
    }

    async fn verify_sequential(
        &self,
        paths: Vec<PathBuf>,
    ) -> Vec<(PathBuf, Result<AuthenticityCheck>)> {
        let lang = self.config().batch.source_lang.clone();
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = self.verify_document(&path, &lang).await;
            results.push((path, result));
        }
        results
    }

    /// One task per document, at most `max_concurrent_documents` (capped at
    /// [`MAX_CONCURRENT_DOCUMENTS`]) running at once. Handles are awaited in
    /// spawn order to keep file order.
    async fn verify_concurrent(
        &self,
        paths: Vec<PathBuf>,
    ) -> Vec<(PathBuf, Result<AuthenticityCheck>)> {
        let limit = self
            .config()
            .batch
            .max_concurrent_documents
            .min(MAX_CONCURRENT_DOCUMENTS);
        let permits = Arc::new(Semaphore::new(limit));
        let lang = self.config().batch.source_lang.clone();

        let mut handles = Vec::with_capacity(paths.len());
        for path in paths {
            let verifier = self.clone();
            let permits = Arc::clone(&permits);
            let lang = lang.clone();
            let task_path = path.clone();
            let handle = tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|err| UrkundeError::Task(err.to_string()))?;
                verifier.verify_document(&task_path, &lang).await
            });
            handles.push((path, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(UrkundeError::Task(join_err.to_string())),
            };
            results.push((path, result));
        }
        results
    }
}

/// Sorted files in `dir` matching `pattern`, plus entries glob could not read.
fn matching_files(dir: &Path, pattern: &str) -> Result<(Vec<PathBuf>, Vec<BatchFailure>)> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{escaped_dir}/{pattern}");
    let entries =
        glob::glob(&full_pattern).map_err(|err| UrkundeError::Pattern(format!("{full_pattern}: {err}")))?;

    let mut paths = Vec::new();
    let mut failures = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(err) => {
                warn!(path = %err.path().display(), error = %err, "unreadable directory entry");
                failures.push(BatchFailure {
                    path: err.path().to_path_buf(),
                    message: err.to_string(),
                });
            }
        }
    }
    paths.sort();
    Ok((paths, failures))
}
