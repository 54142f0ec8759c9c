use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::warn;

pub(super) fn discover_pages(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();

    for input in inputs {
        let metadata = fs::metadata(input)
            .with_context(|| format!("input not found: {}", input.display()))?;

        if metadata.is_file() {
            pages.push(input.clone());
            continue;
        }

        let mut found = discover_html_files(input)?;
        found.sort();
        if found.is_empty() {
            warn!(dir = %input.display(), "no HTML pages in directory");
        }
        pages.extend(found);
    }

    if pages.is_empty() {
        bail!("no HTML pages found in the given inputs");
    }

    Ok(pages)
}

fn discover_html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            .unwrap_or(false);

        if is_html {
            files.push(path);
        }
    }

    Ok(files)
}
