use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use html_escape::encode_text;

use purchase_extract::PurchaseRecord;
use purchase_extract::model::RECORD_COLUMNS;

use crate::util::ensure_parent_directory;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(super) fn write_csv(path: &Path, records: &[PurchaseRecord]) -> Result<()> {
    ensure_parent_directory(path)?;

    let file =
        File::create(path).with_context(|| format!("failed to create csv file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM)
        .with_context(|| format!("failed to write csv file: {}", path.display()))?;

    write_csv_records(&mut out, records)
        .with_context(|| format!("failed to write csv file: {}", path.display()))?;
    out.flush()
        .with_context(|| format!("failed to finalize csv file: {}", path.display()))?;
    Ok(())
}

fn write_csv_records<W: Write>(out: W, records: &[PurchaseRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(RECORD_COLUMNS)?;
    for record in records {
        writer.write_record(record.columns())?;
    }
    writer.flush()?;
    Ok(())
}

pub(super) fn write_html(path: &Path, records: &[PurchaseRecord], target_year: i32) -> Result<()> {
    ensure_parent_directory(path)?;

    let file = File::create(path)
        .with_context(|| format!("failed to create html file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(render_html(records, target_year).as_bytes())
        .with_context(|| format!("failed to write html file: {}", path.display()))?;
    out.flush()
        .with_context(|| format!("failed to finalize html file: {}", path.display()))?;
    Ok(())
}

pub(super) fn render_html(records: &[PurchaseRecord], target_year: i32) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>Purchases {target_year}</title>\n"));
    html.push_str("<table border=\"1\">\n<thead>\n<tr>");
    for column in RECORD_COLUMNS {
        html.push_str(&format!("<th>{column}</th>"));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for record in records {
        html.push_str("<tr>");
        for value in record.columns() {
            html.push_str(&format!("<td>{}</td>", encode_text(value)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
    html
}

pub(super) fn write_json_stdout(records: &[PurchaseRecord]) -> Result<()> {
    let mut output = BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, records)
        .context("failed to serialize records json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
