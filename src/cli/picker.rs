//! Interactive CSV picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `localboost analyze` and choose a CSV" UX
//!
//! The picker searches for `*.csv` files under the current working directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt the user to select a CSV file from the current directory tree.
///
/// Behavior:
/// - list discovered `*.csv` files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::Config(
            "No .csv files found. Provide one with `localboost analyze <file.csv>`.".to_string(),
        ));
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    choose_csv(&files, &mut stdin.lock(), &mut stdout)
}

/// Selection loop over an arbitrary input/output pair.
fn choose_csv<R: BufRead, W: Write>(files: &[PathBuf], input: &mut R, out: &mut W) -> Result<PathBuf, AppError> {
    writeln!(out, "Found {} CSV file(s):", files.len())?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(out, "{:>3}) {}", idx + 1, pretty_path(path))?;
    }

    loop {
        write!(out, "Select a file by number (1-{}) or type a path (q to quit): ", files.len())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(AppError::Config(
                "No input received. Provide a CSV path with `localboost analyze <file.csv>`.".to_string(),
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::Config("Canceled.".to_string()));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(out, "Invalid choice: {choice}. Enter a number between 1 and {}.", files.len())?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(out, "{err}")?,
        }
    }
}

/// Whether a file name ends in exactly `.csv` (lowercase).
pub fn has_csv_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "csv")
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::Config(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::Config(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::Config(format!(
            "Expected a .csv file (got: {}).",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under `root` (deterministic order).
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules" | "static")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "Date,Product,Revenue\n").unwrap();
    }

    #[test]
    fn csv_extension_must_be_lowercase() {
        assert!(has_csv_extension(Path::new("sales.csv")));
        assert!(has_csv_extension(Path::new("SALES.csv")));
        assert!(!has_csv_extension(Path::new("SALES.CSV")));
        assert!(!has_csv_extension(Path::new("sales.Csv")));
        assert!(!has_csv_extension(Path::new("sales.csv.txt")));
        assert!(!has_csv_extension(Path::new("sales")));
    }

    #[test]
    fn discovery_is_sorted_and_skips_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.csv"));
        touch(&dir.path().join("a").join("z.csv"));
        touch(&dir.path().join("target").join("ignored.csv"));
        touch(&dir.path().join("notes.txt"));

        let found = discover_csv_files(dir.path());
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec![format!("a{}z.csv", std::path::MAIN_SEPARATOR), "b.csv".to_string()]);
    }

    #[test]
    fn choose_by_number_and_retry_on_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        touch(&a);
        touch(&b);
        let files = vec![a, b.clone()];

        let mut input = io::Cursor::new("7\n2\n");
        let mut out = Vec::new();
        let chosen = choose_csv(&files, &mut input, &mut out).unwrap();
        assert_eq!(chosen, b);
        assert!(String::from_utf8(out).unwrap().contains("Invalid choice: 7"));
    }

    #[test]
    fn quit_and_eof_cancel() {
        let files = vec![PathBuf::from("x.csv")];
        let mut out = Vec::new();
        assert!(choose_csv(&files, &mut io::Cursor::new("q\n"), &mut out).is_err());
        assert!(choose_csv(&files, &mut io::Cursor::new(""), &mut out).is_err());
    }
}
