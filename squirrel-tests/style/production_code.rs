//! Production Code Enforcement
//!
//! Production sources propagate errors instead of panicking and carry no
//! dead code allowances. Everything from the first `#[cfg(test)]` line of a
//! file onwards counts as test code, as do test fixture files.

use std::fs;
use std::path::{Path, PathBuf};

/// Source roots checked, relative to this crate.
const SOURCE_ROOTS: [&str; 2] = ["../squirrel-core/src", "../squirrel-cli/src"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    DeadCodeAllowance,
    Panicking,
}

impl Rule {
    /// Rule broken by `line`, if any.
    fn broken_by(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") {
            return None;
        }
        if trimmed.contains("#[allow(") && trimmed.contains("dead_code") {
            return Some(Rule::DeadCodeAllowance);
        }
        if trimmed.contains(".unwrap()") || trimmed.contains(".expect(") {
            return Some(Rule::Panicking);
        }
        None
    }

    fn advice(self) -> &'static str {
        match self {
            Rule::DeadCodeAllowance => "remove the unused code or use it",
            Rule::Panicking => "propagate the error with `?`",
        }
    }
}

#[derive(Debug)]
struct Violation {
    file_path: PathBuf,
    line_number: usize,
    line: String,
    rule: Rule,
}

#[derive(Default)]
struct ProductionCodeChecker {
    violations: Vec<Violation>,
    files_checked: usize,
}

impl ProductionCodeChecker {
    fn find_rust_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::find_rust_files(&path, files)?;
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
        Ok(())
    }

    fn is_test_file(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy())
            .is_some_and(|name| name.starts_with("test_") || name.ends_with("_tests.rs"))
    }

    fn check_source(&mut self, path: &Path, content: &str) {
        self.files_checked += 1;
        for (index, line) in content.lines().enumerate() {
            if line.trim() == "#[cfg(test)]" {
                break;
            }
            if let Some(rule) = Rule::broken_by(line) {
                self.violations.push(Violation {
                    file_path: path.to_path_buf(),
                    line_number: index + 1,
                    line: line.trim().to_string(),
                    rule,
                });
            }
        }
    }

    fn check_workspace(&mut self) -> std::io::Result<()> {
        let mut files = Vec::new();
        for root in SOURCE_ROOTS {
            Self::find_rust_files(Path::new(root), &mut files)?;
        }

        for file in files {
            if Self::is_test_file(&file) {
                continue;
            }
            let content = fs::read_to_string(&file)?;
            self.check_source(&file, &content);
        }
        Ok(())
    }

    fn report(&self) -> bool {
        if self.violations.is_empty() {
            println!(
                "Production code enforcement: {} files checked, no violations found",
                self.files_checked
            );
            return true;
        }

        for violation in &self.violations {
            println!(
                "{}:{}: {} ({})",
                violation.file_path.display(),
                violation.line_number,
                violation.line,
                violation.rule.advice()
            );
        }
        println!(
            "Found {} violation(s) in {} file(s) checked",
            self.violations.len(),
            self.files_checked
        );
        false
    }
}
