use std::sync::OnceLock;

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use crate::model::PurchaseRecord;

mod assemble;
mod document;
mod fields;
mod labels;
mod normalize;
#[cfg(test)]
mod tests;
mod years;

pub use assemble::{Assembly, assemble, merge_pages};
pub use document::{
    BLOCK_SCOPE_LEVELS, ITEM_PATH_MARKER, ItemAnchor, MAX_WIDEN_STEPS, MIN_TITLE_CHARS,
    PurchasePage, TextScope,
};
pub use fields::{PartialRecord, Resolution, extract_fields, resolve_fields};
pub use labels::{Currency, LabelConcept, LabelMatcher, currency_symbol};
pub use normalize::{normalize, normalize_fragments};
pub use years::YearFilter;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid input: document markup is empty")]
    EmptyDocument,

    #[error("invalid input: target year must be positive, got {0}")]
    InvalidYear(i32),

    #[error("failed to build label tables: {0}")]
    Tables(String),
}

#[derive(Debug, Clone, Copy)]
pub struct RawDocument<'a> {
    markup: &'a str,
    target_year: i32,
}

impl<'a> RawDocument<'a> {
    pub fn new(markup: &'a str, target_year: i32) -> Result<Self, ExtractError> {
        if markup.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }
        if target_year <= 0 {
            return Err(ExtractError::InvalidYear(target_year));
        }

        Ok(Self {
            markup,
            target_year,
        })
    }

    pub fn markup(&self) -> &'a str {
        self.markup
    }

    pub fn target_year(&self) -> i32 {
        self.target_year
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub anchors_found: usize,
    pub anchors_year_filtered: usize,
    pub anchors_escalated: usize,
    pub duplicate_titles: usize,
    pub records_emitted: usize,
}

impl ExtractionStats {
    pub fn absorb(&mut self, other: &ExtractionStats) {
        self.anchors_found += other.anchors_found;
        self.anchors_year_filtered += other.anchors_year_filtered;
        self.anchors_escalated += other.anchors_escalated;
        self.duplicate_titles += other.duplicate_titles;
        self.records_emitted += other.records_emitted;
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub records: Vec<PurchaseRecord>,
    pub stats: ExtractionStats,
}

static SHARED_EXTRACTOR: OnceLock<PurchaseExtractor> = OnceLock::new();

#[derive(Debug)]
pub struct PurchaseExtractor {
    labels: LabelMatcher,
    years: YearFilter,
}

impl PurchaseExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            labels: LabelMatcher::new()?,
            years: YearFilter::new()?,
        })
    }

    pub fn shared() -> Result<&'static PurchaseExtractor> {
        if let Some(extractor) = SHARED_EXTRACTOR.get() {
            return Ok(extractor);
        }

        let extractor = Self::new()?;
        Ok(SHARED_EXTRACTOR.get_or_init(|| extractor))
    }

    pub fn extract(&self, document: &RawDocument<'_>) -> ExtractionReport {
        let page = PurchasePage::parse(document.markup());
        let anchors = page.find_anchors();
        let target_year = document.target_year();

        let mut stats = ExtractionStats {
            anchors_found: anchors.len(),
            ..ExtractionStats::default()
        };

        let mut entries = Vec::with_capacity(anchors.len());
        for anchor in &anchors {
            let scope = page.scope_for(anchor);

            if !self.years.is_relevant(scope.text(), target_year) {
                debug!(
                    title = %anchor.title,
                    position = anchor.position,
                    target_year,
                    "anchor skipped: scope names other years only"
                );
                stats.anchors_year_filtered += 1;
                continue;
            }

            let resolution = resolve_fields(&page, &self.labels, &scope);
            if resolution.escalated {
                stats.anchors_escalated += 1;
            }
            trace!(
                title = %anchor.title,
                position = anchor.position,
                scope_tag = scope.tag_name(),
                scope_depth = resolution.depth,
                escalated = resolution.escalated,
                complete = resolution.fields.is_complete(),
                "resolved anchor fields"
            );

            entries.push((anchor.title.clone(), resolution.fields));
        }

        let assembly = assemble(entries);
        stats.duplicate_titles = assembly.duplicate_titles;
        stats.records_emitted = assembly.records.len();

        debug!(
            anchors = stats.anchors_found,
            year_filtered = stats.anchors_year_filtered,
            escalated = stats.anchors_escalated,
            duplicates = stats.duplicate_titles,
            records = stats.records_emitted,
            "page extraction complete"
        );

        ExtractionReport {
            records: assembly.records,
            stats,
        }
    }
}

pub fn extract_records(markup: &str, target_year: i32) -> Result<Vec<PurchaseRecord>, ExtractError> {
    let document = RawDocument::new(markup, target_year)?;
    let extractor =
        PurchaseExtractor::shared().map_err(|err| ExtractError::Tables(format!("{err:#}")))?;
    Ok(extractor.extract(&document).records)
}
