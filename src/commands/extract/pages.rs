use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use tracing::{info, warn};

use purchase_extract::{ExtractionStats, PurchaseExtractor, PurchaseRecord, RawDocument};

use crate::util::sha256_hex;

#[derive(Debug, Clone)]
pub(super) struct PageInput {
    pub page: usize,
    pub path: PathBuf,
    pub markup: String,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub(super) struct PageOutcome {
    pub page: usize,
    pub path: PathBuf,
    pub sha256: String,
    pub records: Vec<PurchaseRecord>,
    pub stats: ExtractionStats,
    pub warning: Option<String>,
}

pub(super) fn load_pages(paths: &[PathBuf]) -> Result<Vec<PageInput>> {
    paths
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let bytes =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            Ok(PageInput {
                page: index + 1,
                path: path.clone(),
                sha256: sha256_hex(&bytes),
                markup: String::from_utf8_lossy(&bytes).into_owned(),
            })
        })
        .collect()
}

pub(super) fn extract_pages(
    extractor: &PurchaseExtractor,
    pages: &[PageInput],
    target_year: i32,
    jobs: usize,
) -> Vec<PageOutcome> {
    let workers = jobs.clamp(1, pages.len().max(1));
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, PageOutcome)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(page) = pages.get(index) else {
                        break;
                    };
                    let _ = tx.send((index, extract_page(extractor, page, target_year)));
                }
            });
        }
    });
    drop(tx);

    let mut outcomes = rx.into_iter().collect::<Vec<(usize, PageOutcome)>>();
    outcomes.sort_by_key(|(index, _)| *index);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

fn extract_page(extractor: &PurchaseExtractor, page: &PageInput, target_year: i32) -> PageOutcome {
    let mut outcome = PageOutcome {
        page: page.page,
        path: page.path.clone(),
        sha256: page.sha256.clone(),
        records: Vec::new(),
        stats: ExtractionStats::default(),
        warning: None,
    };

    match RawDocument::new(&page.markup, target_year) {
        Ok(document) => {
            let report = extractor.extract(&document);
            info!(
                page = page.page,
                path = %page.path.display(),
                anchors = report.stats.anchors_found,
                year_filtered = report.stats.anchors_year_filtered,
                escalated = report.stats.anchors_escalated,
                records = report.stats.records_emitted,
                "extracted page"
            );
            outcome.records = report.records;
            outcome.stats = report.stats;
        }
        Err(err) => {
            warn!(page = page.page, path = %page.path.display(), error = %err, "page skipped");
            outcome.warning = Some(format!("{}: {err}", page.path.display()));
        }
    }

    outcome
}
