//! Directory-driven program suite
//!
//! `DIR/pass/*.wp` must verify; `DIR/fail/*.wp` must be rejected by some
//! phase (syntax, definite assignment, or verification).

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::common::consts::SOURCE_EXTENSION;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::{check_source, Config};

pub type TestResult = std::result::Result<(), String>;

pub trait TestCase {
    fn name(&self) -> &str;
    fn execute(&self, config: &Config) -> TestResult;
}

fn load(path: &Path) -> std::result::Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

fn render(diagnostics: &Diagnostics) -> String {
    diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("\n")
}

pub struct VerifyPass {
    path: PathBuf,
    name: String,
}

impl VerifyPass {
    pub fn new(path: PathBuf) -> Box<dyn TestCase> {
        let name = path.display().to_string();
        Box::new(VerifyPass { path, name })
    }
}

impl TestCase for VerifyPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, config: &Config) -> TestResult {
        let source = load(&self.path)?;
        let mut diagnostics = Diagnostics::new();
        match check_source(&source, config, &mut diagnostics) {
            Ok((_, verdict)) if verdict.is_verified() => Ok(()),
            Ok(_) => Err(format!("Expected verification to succeed\n{}", render(&diagnostics))),
            Err(err) => Err(format!("{}\n{}", err, render(&diagnostics))),
        }
    }
}

pub struct VerifyFail {
    path: PathBuf,
    name: String,
}

impl VerifyFail {
    pub fn new(path: PathBuf) -> Box<dyn TestCase> {
        let name = path.display().to_string();
        Box::new(VerifyFail { path, name })
    }
}

impl TestCase for VerifyFail {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, config: &Config) -> TestResult {
        let source = load(&self.path)?;
        let mut diagnostics = Diagnostics::new();
        match check_source(&source, config, &mut diagnostics) {
            Ok((_, verdict)) if verdict.is_verified() => Err("Expected verification failure".to_string()),
            Ok(_) | Err(Error::Parse { .. }) | Err(Error::DefiniteAssignment { .. }) | Err(Error::Verification { .. }) => {
                Ok(())
            }
            Err(err) => Err(format!("Rejected for the wrong reason: {}", err)),
        }
    }
}

fn collect_from_subdirectory<F>(root: &Path, subdir: &str, loader: F) -> Result<Vec<Box<dyn TestCase>>>
where
    F: Fn(PathBuf) -> Box<dyn TestCase>,
{
    let dir = root.join(subdir);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(&dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            paths.push(path.to_path_buf());
        }
    }
    Ok(paths.into_iter().map(loader).collect())
}

pub fn collect_test_cases(root: impl AsRef<Path>) -> Result<Vec<Box<dyn TestCase>>> {
    let root = root.as_ref();
    let mut cases = collect_from_subdirectory(root, "pass", VerifyPass::new)?;
    cases.extend(collect_from_subdirectory(root, "fail", VerifyFail::new)?);
    log::debug!("collected {} program(s) under {}", cases.len(), root.display());
    Ok(cases)
}

#[derive(Debug, Default)]
pub struct SuiteReport {
    pub passed: usize,
    /// (case name, reason)
    pub failures: Vec<(String, String)>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.passed + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn run_suite(root: impl AsRef<Path>, config: &Config) -> Result<SuiteReport> {
    let mut report = SuiteReport::default();
    for case in collect_test_cases(root)? {
        match case.execute(config) {
            Ok(()) => {
                log::info!("ok: {}", case.name());
                report.passed += 1;
            }
            Err(reason) => {
                log::warn!("FAILED: {}", case.name());
                report.failures.push((case.name().to_string(), reason));
            }
        }
    }
    Ok(report)
}
