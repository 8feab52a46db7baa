//! Utilities (source file reading, unicode helpers).

use std::fs;
use std::path::Path;
use anyhow::{bail, Context, Result};

pub mod unicode;

/// Read a source file to analyze.
/// Accepts .py, .pyw, .txt and files without extension.
pub fn read_source(file_path: &Path) -> Result<String> {
    // Check if file exists
    if !file_path.exists() {
        bail!("Source file '{}' does not exist", file_path.display());
    }

    // Check if it's a file (not directory)
    if !file_path.is_file() {
        bail!("'{}' is not a file", file_path.display());
    }

    let extension = file_path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "py" | "pyw" | "txt" | "" => fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file '{}'", file_path.display())),
        _ => {
            bail!("Unsupported file type: .{}\nCurrently supported: .py, .pyw, .txt, and files without extension", extension);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_python_files() {
        let mut file = tempfile::Builder::new().suffix(".py").tempfile().unwrap();
        writeln!(file, "print('hi')").unwrap();
        assert_eq!(read_source(file.path()).unwrap(), "print('hi')\n");
    }

    #[test]
    fn rejects_other_extensions() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let err = read_source(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Unsupported file type: .pdf"));
    }

    #[test]
    fn rejects_missing_and_directories() {
        assert!(read_source(Path::new("/nonexistent/snippet.py")).is_err());
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(dir.path()).unwrap_err();
        assert!(err.to_string().ends_with("is not a file"));
    }
}
