use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

pub const PAGE_MARKER_PREFIX: &str = "--- PAGE";

/// Whole-document text from the PDF text layer, pages separated by marker lines.
pub fn read_pdf_text(pdf_path: &Path, layout: bool) -> Result<String> {
    let pages = extract_pages_with_pdftotext(pdf_path, layout)?;
    Ok(join_pages(&pages))
}

pub fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for (index, page) in pages.iter().enumerate() {
        text.push_str(&format!("{PAGE_MARKER_PREFIX} {} ---\n", index + 1));
        text.push_str(page.trim_end());
        text.push('\n');
    }
    text
}

pub fn is_page_marker(line: &str) -> bool {
    line.trim_start().starts_with(PAGE_MARKER_PREFIX)
}

fn extract_pages_with_pdftotext(pdf_path: &Path, layout: bool) -> Result<Vec<String>> {
    let mut command = Command::new("pdftotext");
    command.arg("-enc").arg("UTF-8");
    if layout {
        command.arg("-layout");
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    Ok(pages)
}
