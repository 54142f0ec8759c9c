use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use purchase_extract::extract::LabelConcept;

use crate::cli::LabelsArgs;

#[derive(Debug, Serialize)]
struct LabelEntry {
    concept: LabelConcept,
    variants: &'static [&'static str],
}

pub fn run(args: LabelsArgs) -> Result<()> {
    let entries = label_entries();
    info!(concepts = entries.len(), "label vocabulary");

    let mut output = BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &entries)
            .context("failed to serialize label json output")?;
        writeln!(output)?;
    } else {
        for entry in &entries {
            writeln!(output, "{}: {}", entry.concept, entry.variants.join(" | "))?;
        }
    }
    output.flush()?;
    Ok(())
}

fn label_entries() -> Vec<LabelEntry> {
    LabelConcept::ALL
        .into_iter()
        .map(|concept| LabelEntry {
            concept,
            variants: concept.variants(),
        })
        .collect()
}
