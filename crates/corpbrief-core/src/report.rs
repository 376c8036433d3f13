//! Report file output.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::error::CorpbriefError;

/// Write a finished report under `dir`, creating the directory if needed.
///
/// Files are named `{slug}-{timestamp}.md` so repeated runs for the same
/// company never collide within a second's resolution.
pub fn write_report_file(
    content: &str,
    company_name: &str,
    dir: &Path,
) -> Result<PathBuf, CorpbriefError> {
    fs::create_dir_all(dir).map_err(|err| {
        CorpbriefError::Output(format!(
            "failed to create output directory {}: {err}",
            dir.display()
        ))
    })?;

    let timestamp = Utc::now().format("%Y%m%d-%H%M%S");
    let file_path = dir.join(format!("{}-{timestamp}.md", slugify(company_name)));

    fs::write(&file_path, content).map_err(|err| {
        CorpbriefError::Output(format!("failed to write {}: {err}", file_path.display()))
    })?;

    info!(path = %file_path.display(), "report written");
    Ok(file_path)
}

/// Lowercase alphanumerics, everything else collapsed to `-`.
fn slugify(value: &str) -> String {
    let slug: String = value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Check Point"), "check-point");
        assert_eq!(slugify("Acme"), "acme");
        assert_eq!(slugify("  !!!  "), "report");
    }

    #[test]
    fn writes_report_into_fresh_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("reports");

        let path = write_report_file("# Acme\n\nWidgets.", "Acme Corp", &nested).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("acme-corp-"), "unexpected name: {name}");
        assert!(name.ends_with(".md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Acme\n\nWidgets.");
    }

    #[test]
    fn unwritable_directory_is_an_output_error() {
        let dir = tempdir().unwrap();
        let file_as_dir = dir.path().join("blocked");
        fs::write(&file_as_dir, "occupied").unwrap();

        let err = write_report_file("content", "Acme", &file_as_dir).unwrap_err();
        assert!(matches!(err, CorpbriefError::Output(_)));
    }
}
