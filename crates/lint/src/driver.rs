//! Runs a check over a directory tree.

use crate::new_listener;
use rayon::prelude::*;
use solcst_config::CheckKind;
use solcst_interface::SourceFile;
use solcst_parse::{Parser, SyntaxError, lex};
use std::{
    io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Deeply nested sources recurse deeply in the parser.
const STACK_SIZE: usize = 8 * 1024 * 1024;

/// An error that stops the driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("failed to read {}: {source}", path.display())]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// The result of checking one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub source: Arc<SourceFile>,
    /// The findings, one per line.
    pub findings: String,
    /// Syntax errors. The findings are still computed from the partial tree.
    pub errors: Vec<SyntaxError>,
}

impl FileReport {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Returns the `.sol` files below `dir`, sorted. Symbolic links are not followed.
pub fn collect_sources(dir: &Path) -> Result<Vec<PathBuf>, DriverError> {
    let mut paths = Vec::new();
    collect_into(dir, &mut paths)?;
    paths.sort();
    Ok(paths)
}

fn collect_into(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), DriverError> {
    let read_dir_err = |source| DriverError::ReadDir { path: dir.to_path_buf(), source };
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let file_type = entry.file_type().map_err(read_dir_err)?;
        let path = entry.path();
        if file_type.is_dir() {
            collect_into(&path, paths)?;
        } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == "sol") {
            trace!(path = %path.display(), "found source");
            paths.push(path);
        }
    }
    Ok(())
}

/// Parses `source` with a fresh listener of the given kind.
pub fn check_source(kind: CheckKind, path: &Path, source: Arc<SourceFile>) -> FileReport {
    let mut listener = new_listener(kind, &path.display().to_string());
    let mut parser = Parser::new(lex(Arc::clone(&source.src)));
    parser.add_parse_listener(&mut *listener);
    let out = parser.parse();
    let findings = listener.take_findings();
    debug!(
        path = %path.display(),
        findings = findings.lines().count(),
        errors = out.errors.len(),
        "checked"
    );
    FileReport { path: path.to_path_buf(), source, findings, errors: out.errors }
}

/// Reads and checks one file.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn check_file(kind: CheckKind, path: &Path) -> Result<FileReport, DriverError> {
    let source = SourceFile::read(path)
        .map_err(|source| DriverError::ReadFile { path: path.to_path_buf(), source })?;
    Ok(check_source(kind, path, Arc::new(source)))
}

/// Checks every `.sol` file below `dir` on `threads` threads. Reports are returned in path
/// order, whatever order the files were checked in.
#[instrument(level = "debug", skip_all, fields(dir = %dir.display(), %kind))]
pub fn check_dir(
    dir: &Path,
    kind: CheckKind,
    threads: NonZeroUsize,
) -> Result<Vec<FileReport>, DriverError> {
    let paths = collect_sources(dir)?;
    debug!(files = paths.len(), "collected sources");
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.get())
        .thread_name(|i| format!("solcst-{i}"))
        .stack_size(STACK_SIZE)
        .build()?;
    pool.install(|| paths.par_iter().map(|path| check_file(kind, path)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collects_sol_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/c")).unwrap();
        fs::write(dir.path().join("b/c/z.sol"), "").unwrap();
        fs::write(dir.path().join("a.sol"), "").unwrap();
        fs::write(dir.path().join("b/readme.md"), "").unwrap();
        fs::write(dir.path().join("b/x.sol.bak"), "").unwrap();

        let paths = collect_sources(dir.path()).unwrap();
        let names: Vec<_> =
            paths.iter().map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf()).collect();
        assert_eq!(names, [PathBuf::from("a.sol"), PathBuf::from("b/c/z.sol")]);
    }

    #[test]
    fn missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_sources(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, DriverError::ReadDir { .. }), "{err:?}");
        assert!(err.to_string().starts_with("failed to read directory"));
    }

    #[test]
    fn check_source_keeps_going_after_errors() {
        let src = "contract A is Service { function f() external { x = ; } function g() public {} }";
        let report = check_source(
            CheckKind::MissingVirtual,
            Path::new("a.sol"),
            Arc::new(SourceFile::new(PathBuf::from("a.sol"), src)),
        );
        assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
        assert_eq!(
            report.findings,
            "Function 'functionf' |external| missing virtual modifier\n\
             Function 'functiong' |public| missing virtual modifier\n"
        );
    }
}
