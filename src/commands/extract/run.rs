use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use purchase_extract::model::{
    ExtractCounts, ExtractPaths, ExtractRunManifest, PageEntry, PurchaseRecord,
};
use purchase_extract::{ExtractionStats, PurchaseExtractor, merge_pages};

use crate::cli::ExtractArgs;
use crate::config::{FileConfig, resolve_output_dir, resolve_year};
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

use super::discover::discover_pages;
use super::export::{write_csv, write_html, write_json_stdout};
use super::pages::{PageOutcome, extract_pages, load_pages};

pub fn run(args: ExtractArgs, config: &FileConfig) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let target_year = resolve_year(args.year, config)?;
    let output_dir = resolve_output_dir(args.output_dir.clone(), config);
    let paths = OutputPaths::resolve(&args, &output_dir, target_year);

    info!(run_id = %run_id, target_year, output_dir = %output_dir.display(), "starting extract");

    let page_paths = discover_pages(&args.inputs)?;
    let pages = load_pages(&page_paths)?;
    info!(page_count = pages.len(), jobs = args.jobs, "loaded pages");

    let outcomes = extract_pages(PurchaseExtractor::shared()?, &pages, target_year, args.jobs);
    let processed = take_until_empty(outcomes, args.stop_on_empty_page);

    let mut totals = ExtractionStats::default();
    let mut warnings = Vec::new();
    for outcome in &processed {
        totals.absorb(&outcome.stats);
        warnings.extend(outcome.warning.clone());
    }

    let page_records_total: usize = processed.iter().map(|outcome| outcome.records.len()).sum();
    let merged = merge_pages(processed.iter().map(|outcome| outcome.records.clone()));
    info!(
        pages = processed.len(),
        page_records = page_records_total,
        merged_records = merged.len(),
        "merged page records"
    );

    write_outputs(&paths, &merged, target_year, args.json)?;

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        target_year,
        command: render_extract_command(&args, target_year),
        paths: ExtractPaths {
            output_dir: output_dir.display().to_string(),
            csv_path: paths.csv.as_ref().map(|path| path.display().to_string()),
            html_path: paths.html.as_ref().map(|path| path.display().to_string()),
            manifest_path: paths.manifest.display().to_string(),
        },
        counts: ExtractCounts {
            page_count: pages.len(),
            processed_page_count: processed.len(),
            page_records_total,
            merged_records: merged.len(),
            totals,
        },
        pages: processed.iter().map(page_entry).collect(),
        warnings,
    };

    write_json_pretty(&paths.manifest, &manifest)?;
    info!(path = %paths.manifest.display(), "wrote extract manifest");
    info!(records = merged.len(), "extract completed");

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct OutputPaths {
    pub csv: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub manifest: PathBuf,
}

impl OutputPaths {
    pub(super) fn resolve(args: &ExtractArgs, output_dir: &Path, target_year: i32) -> Self {
        let csv = (!args.no_csv).then(|| {
            args.csv_path
                .clone()
                .unwrap_or_else(|| output_dir.join(format!("purchases_{target_year}.csv")))
        });
        let html = (!args.no_html).then(|| {
            args.html_path
                .clone()
                .unwrap_or_else(|| output_dir.join(format!("purchases_{target_year}.html")))
        });
        let manifest = args.manifest_path.clone().unwrap_or_else(|| {
            output_dir.join(format!("purchases_{target_year}_manifest.json"))
        });

        Self {
            csv,
            html,
            manifest,
        }
    }
}

fn write_outputs(
    paths: &OutputPaths,
    records: &[PurchaseRecord],
    target_year: i32,
    json: bool,
) -> Result<()> {
    if let Some(path) = &paths.csv {
        write_csv(path, records)?;
        info!(path = %path.display(), rows = records.len(), "wrote csv");
    }
    if let Some(path) = &paths.html {
        write_html(path, records, target_year)?;
        info!(path = %path.display(), rows = records.len(), "wrote html");
    }
    if json {
        write_json_stdout(records)?;
    }
    Ok(())
}

pub(super) fn take_until_empty(outcomes: Vec<PageOutcome>, stop_on_empty: bool) -> Vec<PageOutcome> {
    if !stop_on_empty {
        return outcomes;
    }

    let mut kept = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if outcome.records.is_empty() {
            info!(page = outcome.page, path = %outcome.path.display(), "stopping at page without records");
            break;
        }
        kept.push(outcome);
    }
    kept
}

fn page_entry(outcome: &PageOutcome) -> PageEntry {
    PageEntry {
        page: outcome.page,
        filename: outcome.path.display().to_string(),
        sha256: outcome.sha256.clone(),
        record_count: outcome.records.len(),
        stats: outcome.stats,
    }
}

pub(super) fn render_extract_command(args: &ExtractArgs, target_year: i32) -> String {
    let mut command = vec![
        "purchase-extract".to_string(),
        "extract".to_string(),
        "--year".to_string(),
        target_year.to_string(),
    ];

    for input in &args.inputs {
        command.push("--input".to_string());
        command.push(input.display().to_string());
    }
    if let Some(path) = &args.output_dir {
        command.push("--output-dir".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.csv_path {
        command.push("--csv-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.html_path {
        command.push("--html-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if args.no_csv {
        command.push("--no-csv".to_string());
    }
    if args.no_html {
        command.push("--no-html".to_string());
    }
    if args.json {
        command.push("--json".to_string());
    }
    if args.stop_on_empty_page {
        command.push("--stop-on-empty-page".to_string());
    }
    if args.jobs != 1 {
        command.push("--jobs".to_string());
        command.push(args.jobs.to_string());
    }

    command.join(" ")
}
