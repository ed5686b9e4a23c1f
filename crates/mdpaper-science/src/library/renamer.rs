use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdpaper_core::notes::{find_doi, line_ending, reconcile_lines, NoteEntry};
use mdpaper_core::paths::{
    ensure_unique_path, is_numbered_variant, pdf_filename_for_title, relative_path, require_dir,
    require_file_path,
};
use mdpaper_core::{CitationLine, LiteratureRecord};
use tracing::{error, info, warn};

use crate::error::{Result, ScienceError};
use crate::pdf::PdfTextExtractor;
use crate::resolver::{ResolveMetadata, SourceHint};

/// A PDF that was identified, with where it lives after renaming.
#[derive(Debug, Clone)]
pub struct RenameEntry {
    pub record: LiteratureRecord,
    pub original: PathBuf,
    pub path: PathBuf,
}

impl RenameEntry {
    pub fn renamed(&self) -> bool {
        self.original != self.path
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameSummary {
    pub renamed: usize,
    pub kept: usize,
    pub replaced: usize,
    pub appended: usize,
}

/// Renames PDFs after the title of the paper they contain and keeps a
/// note listing them in sync, keyed by DOI.
pub struct PdfRenamer {
    resolver: Arc<dyn ResolveMetadata>,
    extractor: Arc<dyn PdfTextExtractor>,
    max_pages: usize,
}

impl PdfRenamer {
    pub fn new(
        resolver: Arc<dyn ResolveMetadata>,
        extractor: Arc<dyn PdfTextExtractor>,
        max_pages: usize,
    ) -> Self {
        Self {
            resolver,
            extractor,
            max_pages,
        }
    }

    pub async fn reconcile(&self, pdf_dir: &Path, note_file: &Path) -> Result<RenameSummary> {
        if let Err(err) = require_dir(pdf_dir).and_then(|()| require_file_path(note_file)) {
            error!("{err}");
            return Err(ScienceError::InvalidPath(err.to_string()));
        }
        if !note_file.exists() {
            if let Some(parent) = note_file.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(note_file, "").await?;
            info!("created note {}", note_file.display());
        }

        let mut summary = RenameSummary::default();
        let mut entries = Vec::new();
        for pdf in list_pdfs(pdf_dir)? {
            let Some(entry) = self.process_pdf(pdf_dir, &pdf).await else {
                continue;
            };
            if entry.renamed() {
                summary.renamed += 1;
            } else {
                summary.kept += 1;
            }
            entries.push(entry);
        }

        if entries.is_empty() {
            info!("no PDFs identified, note unchanged");
            return Ok(summary);
        }

        let (replaced, appended) = self.update_note(note_file, &entries).await?;
        summary.replaced = replaced;
        summary.appended = appended;
        Ok(summary)
    }

    async fn process_pdf(&self, pdf_dir: &Path, pdf: &Path) -> Option<RenameEntry> {
        let text = match self.extract_text(pdf).await {
            Ok(text) => text,
            Err(err) => {
                warn!("failed to read {}: {err}", pdf.display());
                return None;
            }
        };
        let Some(doi) = find_doi(&text) else {
            warn!("no DOI detected in {}", pdf.display());
            return None;
        };

        let mut record = match self.resolver.resolve(&doi, SourceHint::Registry).await {
            Ok(record) => record,
            Err(err) => {
                warn!("no metadata for {doi}: {err}");
                return None;
            }
        };
        record.doi = Some(doi);

        let new_name = pdf_filename_for_title(&record.title);
        let current_name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if is_numbered_variant(&current_name, &new_name) {
            info!("{current_name} already follows the naming convention");
            return Some(RenameEntry {
                record,
                original: pdf.to_path_buf(),
                path: pdf.to_path_buf(),
            });
        }

        let target = ensure_unique_path(&pdf_dir.join(&new_name));
        if let Err(err) = tokio::fs::rename(pdf, &target).await {
            error!("failed to rename {} -> {}: {err}", pdf.display(), target.display());
            return None;
        }
        info!("renamed {} -> {}", pdf.display(), target.display());
        Some(RenameEntry {
            record,
            original: pdf.to_path_buf(),
            path: target,
        })
    }

    async fn extract_text(&self, pdf: &Path) -> Result<String> {
        let extractor = Arc::clone(&self.extractor);
        let path = pdf.to_path_buf();
        let max_pages = self.max_pages;
        tokio::task::spawn_blocking(move || extractor.extract_text(&path, max_pages))
            .await
            .map_err(|err| ScienceError::PdfExtraction(format!("extraction task failed: {err}")))?
    }

    async fn update_note(&self, note_file: &Path, entries: &[RenameEntry]) -> Result<(usize, usize)> {
        let note_dir = match note_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let note_entries = entries
            .iter()
            .map(|entry| {
                let rel = relative_path(&entry.path, note_dir)?;
                let doi = entry
                    .record
                    .doi
                    .clone()
                    .or_else(|| find_doi(&entry.record.url));
                Ok(NoteEntry {
                    doi,
                    line: CitationLine::new(&entry.record).with_pdf(rel).to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let text = tokio::fs::read_to_string(note_file).await?;
        let existing: Vec<String> = text.lines().map(str::to_string).collect();
        let update = reconcile_lines(&existing, &note_entries);

        if update.is_noop() {
            info!("{} already lists every entry", note_file.display());
            return Ok((0, 0));
        }

        tokio::fs::write(note_file, update.to_text_with(line_ending(&text))).await?;
        info!(
            "{} updated: replaced {}, appended {}",
            note_file.display(),
            update.replaced,
            update.appended
        );
        Ok((update.replaced, update.appended))
    }
}

fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(pdfs)
}
