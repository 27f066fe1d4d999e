//! Runner that orchestrates parsing, evaluation, suppression and fixes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::Config;
use crate::host::{
    apply_edits, extract_facts, parse_file, plan_fix, FileFacts, Framework, HostError,
    ParsedFile, TextEdit, TypeIndex,
};
use crate::rule::{
    filter_suppressed, parse_pragmas, DetectionResult, Diagnostic, FixEngine, MethodDescriptor,
    RuleEvaluator, VerbChoice,
};

/// One file after parsing.
struct Scanned {
    path: PathBuf,
    parsed: ParsedFile,
    facts: FileFacts,
}

/// A fix applied (or, in a dry run, planned) for one diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedFix {
    pub title: String,
    pub diagnostic: Diagnostic,
}

/// Outcome of a fix pass.
#[derive(Debug, Default, Serialize)]
pub struct FixOutcome {
    pub applied: Vec<AppliedFix>,
    /// Diagnostics whose fix could not be planned, with the reason.
    pub failed: Vec<(Diagnostic, String)>,
    pub files_changed: usize,
    pub dry_run: bool,
}

/// Executes the controller verb rule against a set of files.
pub struct Runner {
    base_dir: PathBuf,
    attribute_bases: HashMap<String, String>,
}

impl Runner {
    /// Create a new runner.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            attribute_bases: HashMap::new(),
        }
    }

    /// Take configured attribute bases from `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.attribute_bases = config.attribute_bases.clone();
        self
    }

    /// Resolve `path` against the base directory when it is relative.
    fn locate(&self, path: &Path) -> PathBuf {
        if path.is_relative() && self.base_dir.is_dir() {
            self.base_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Parse files in parallel. Files that cannot be read or parsed are
    /// logged and skipped. A grammar that fails to load is fatal, since
    /// every file would be skipped.
    fn scan(&self, files: &[PathBuf]) -> anyhow::Result<Vec<Scanned>> {
        let results: Vec<_> = files
            .par_iter()
            .map(|file| {
                let path = self.locate(file);
                let result = parse_file(&path).map(|parsed| {
                    let facts = extract_facts(&parsed);
                    tracing::debug!(
                        file = %path.display(),
                        methods = facts.methods.len(),
                        "parsed"
                    );
                    (parsed, facts)
                });
                (path, result)
            })
            .collect();

        let mut scanned = Vec::with_capacity(results.len());
        for (path, result) in results {
            match result {
                Ok((parsed, facts)) => scanned.push(Scanned {
                    path,
                    parsed,
                    facts,
                }),
                Err(e @ HostError::Language(_)) => return Err(e.into()),
                Err(e) => tracing::warn!(file = %path.display(), error = %e, "skipping file"),
            }
        }
        Ok(scanned)
    }

    fn index(&self, scanned: &[Scanned]) -> TypeIndex {
        let mut index = TypeIndex::new().with_configured(&self.attribute_bases);
        for s in scanned {
            index.add_file(&s.facts);
        }
        tracing::debug!(classes = index.len(), "indexed declared types");
        index
    }

    /// Evaluate one file, splitting its diagnostics into active and
    /// suppressed.
    fn evaluate(
        &self,
        index: &TypeIndex,
        scanned: &Scanned,
    ) -> (Vec<MethodDescriptor>, DetectionResult) {
        let methods = index.resolve(&scanned.facts);
        let diagnostics = RuleEvaluator::new().evaluate_all(&methods);

        let regions = parse_pragmas(&scanned.parsed.path, &scanned.parsed.source);
        let (active, suppressed) = filter_suppressed(diagnostics, &regions);

        tracing::debug!(
            file = %scanned.path.display(),
            diagnostics = active.len(),
            suppressed = suppressed.len(),
            "evaluated"
        );

        let result = DetectionResult {
            diagnostics: active,
            suppressed,
            scanned: 1,
        };
        (methods, result)
    }

    /// Run the rule over every file.
    pub fn run(&self, files: &[PathBuf]) -> anyhow::Result<DetectionResult> {
        let scanned = self.scan(files)?;
        let index = self.index(&scanned);

        let mut result = DetectionResult::new();
        for s in &scanned {
            let (_, file_result) = self.evaluate(&index, s);
            result.merge(file_result);
        }
        result.sort();

        Ok(result)
    }

    /// Apply `verb` to every flagged method. Suppressed diagnostics are left
    /// alone. With `dry_run`, nothing is written.
    pub fn fix(
        &self,
        files: &[PathBuf],
        verb: VerbChoice,
        dry_run: bool,
    ) -> anyhow::Result<FixOutcome> {
        let scanned = self.scan(files)?;
        let index = self.index(&scanned);

        let mut outcome = FixOutcome {
            dry_run,
            ..Default::default()
        };

        for s in &scanned {
            let (methods, result) = self.evaluate(&index, s);
            if result.diagnostics.is_empty() {
                continue;
            }

            let engine = engine_for(&s.facts);
            let mut edits: Vec<TextEdit> = Vec::new();
            for diagnostic in result.diagnostics {
                match plan_fix(&s.parsed, &methods, &diagnostic, verb, &engine) {
                    Ok(edit) => {
                        edits.push(edit);
                        outcome.applied.push(AppliedFix {
                            title: verb.fix_title(),
                            diagnostic,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "fix not applied");
                        outcome.failed.push((diagnostic, e.to_string()));
                    }
                }
            }

            if edits.is_empty() {
                continue;
            }
            outcome.files_changed += 1;
            if !dry_run {
                let fixed = apply_edits(&s.parsed.source, &edits);
                std::fs::write(&s.path, fixed)
                    .with_context(|| format!("failed to write {}", s.path.display()))?;
                tracing::info!(file = %s.path.display(), edits = edits.len(), "fixed");
            }
        }

        Ok(outcome)
    }

    /// Fix every flagged method in a single file.
    pub fn fix_file<P: AsRef<Path>>(
        &self,
        path: P,
        verb: VerbChoice,
    ) -> anyhow::Result<FixOutcome> {
        self.fix(&[path.as_ref().to_path_buf()], verb, false)
    }
}

/// Fix engine whose inserted attributes carry the ancestry of the file's
/// primary framework.
fn engine_for(facts: &FileFacts) -> FixEngine {
    match Framework::for_usings(&facts.usings).first() {
        Some(framework) => FixEngine::new().with_verb_base(framework.verb_base()),
        None => FixEngine::new(),
    }
}
