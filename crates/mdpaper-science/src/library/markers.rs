use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdpaper_core::notes::{find_markers, plan, render, MarkerOutcome};
use mdpaper_core::paths::{collect_note_files, pdf_filename_for_title, relative_path};
use mdpaper_core::{CitationLine, Marker, MarkerKind};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pdf::PdfFetcher;
use crate::resolver::{ResolveMetadata, SourceHint};

#[derive(Debug, Clone, Default)]
pub struct NoteReport {
    pub note: PathBuf,
    pub markers: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub written: bool,
}

/// Rewrites literature markers in notes into citation lines, fetching PDFs
/// into a shared directory on the way.
pub struct MarkerPipeline {
    resolver: Arc<dyn ResolveMetadata>,
    fetcher: Arc<dyn PdfFetcher>,
}

impl MarkerPipeline {
    pub fn new(resolver: Arc<dyn ResolveMetadata>, fetcher: Arc<dyn PdfFetcher>) -> Self {
        Self { resolver, fetcher }
    }

    /// Marker text → citation line for every marker that resolved.
    /// Failures are logged and leave the marker out of the map.
    pub async fn build_substitutions(
        &self,
        markers: &[Marker],
        note_path: &Path,
        pdf_dir: &Path,
    ) -> HashMap<String, String> {
        let note_dir = note_dir(note_path);
        let mut substitutions = HashMap::new();

        for marker in markers {
            if substitutions.contains_key(&marker.text) {
                continue;
            }
            match self.resolve_marker(marker, note_dir, pdf_dir).await {
                Ok(line) => {
                    debug!("{} -> {line}", marker.text);
                    substitutions.insert(marker.text.clone(), line);
                }
                Err(err) => warn!("skipping {}: {err}", marker.text),
            }
        }

        substitutions
    }

    async fn resolve_marker(&self, marker: &Marker, note_dir: &Path, pdf_dir: &Path) -> Result<String> {
        let identifier = marker.identifier();
        let record = self.resolver.resolve(identifier, SourceHint::Auto).await?;
        let pdf_path = pdf_dir.join(pdf_filename_for_title(&record.title));

        if marker.kind() == MarkerKind::NeedsPdf && !pdf_path.exists() {
            if let Some(link) = record.pdf_link.as_deref() {
                if let Err(err) = self.fetcher.download(link, &pdf_path).await {
                    warn!("download of {link} failed: {err}");
                }
            }
            if !pdf_path.exists() {
                if let Err(err) = self.fetcher.fetch_by_identifier(identifier, &pdf_path).await {
                    warn!("no PDF for {identifier}: {err}");
                }
            }
        }

        let line = if pdf_path.exists() {
            CitationLine::new(&record).with_pdf(relative_path(&pdf_path, note_dir)?)
        } else {
            CitationLine::new(&record)
        };
        Ok(line.to_string())
    }

    pub async fn update_note(&self, note_path: &Path, pdf_dir: &Path) -> Result<NoteReport> {
        tokio::fs::create_dir_all(pdf_dir).await?;
        let text = tokio::fs::read_to_string(note_path).await?;

        let markers = find_markers(&text);
        info!("{} markers in {}", markers.len(), note_path.display());
        let mut report = NoteReport {
            note: note_path.to_path_buf(),
            markers: markers.len(),
            ..NoteReport::default()
        };
        if markers.is_empty() {
            return Ok(report);
        }

        let substitutions = self.build_substitutions(&markers, note_path, pdf_dir).await;
        if substitutions.is_empty() {
            info!("nothing resolved, {} left as is", note_path.display());
            report.unresolved = markers.len();
            return Ok(report);
        }

        let planned = plan(&text, &substitutions);
        report.resolved = planned
            .iter()
            .filter(|(_, outcome)| matches!(outcome, MarkerOutcome::Resolved(_)))
            .count();
        report.unresolved = planned.len() - report.resolved;

        tokio::fs::write(note_path, render(&text, &planned)).await?;
        report.written = true;
        info!(
            "updated {}: {} resolved, {} flagged",
            note_path.display(),
            report.resolved,
            report.unresolved
        );
        Ok(report)
    }

    /// Run [`Self::update_note`] over every note under `dir`. A note that
    /// fails is logged and skipped.
    pub async fn update_notes_in(
        &self,
        dir: &Path,
        extensions: &[String],
        pdf_dir: &Path,
    ) -> Result<Vec<NoteReport>> {
        let notes = collect_note_files(dir, extensions)?;
        info!("{} notes under {}", notes.len(), dir.display());

        let mut reports = Vec::with_capacity(notes.len());
        for note in notes {
            match self.update_note(&note, pdf_dir).await {
                Ok(report) => reports.push(report),
                Err(err) => warn!("failed to update {}: {err}", note.display()),
            }
        }
        Ok(reports)
    }
}

fn note_dir(note_path: &Path) -> &Path {
    match note_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
