use std::collections::HashSet;

use tracing::trace;

use super::fields::PartialRecord;
use super::labels::currency_symbol;
use crate::model::PurchaseRecord;

#[derive(Debug, Default)]
pub struct Assembly {
    pub records: Vec<PurchaseRecord>,
    pub duplicate_titles: usize,
}

pub fn assemble<I>(entries: I) -> Assembly
where
    I: IntoIterator<Item = (String, PartialRecord)>,
{
    let mut assembly = Assembly::default();
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for (title, fields) in entries {
        if !seen_titles.insert(title.clone()) {
            trace!(title = %title, "duplicate title skipped");
            assembly.duplicate_titles += 1;
            continue;
        }
        candidates.push(to_record(title, fields));
    }

    assembly.records = finalize(candidates);
    assembly
}

pub fn merge_pages<I>(pages: I) -> Vec<PurchaseRecord>
where
    I: IntoIterator<Item = Vec<PurchaseRecord>>,
{
    finalize(pages.into_iter().flatten().collect())
}

fn to_record(title: String, fields: PartialRecord) -> PurchaseRecord {
    PurchaseRecord {
        seller: fields.seller.unwrap_or_default(),
        item_title: title,
        order_total: fields.order_total.unwrap_or_default(),
        currency: fields
            .currency
            .map(|currency| currency.to_string())
            .unwrap_or_default(),
        order_number: fields.order_number.unwrap_or_default(),
    }
}

fn finalize(records: Vec<PurchaseRecord>) -> Vec<PurchaseRecord> {
    let mut seen: HashSet<PurchaseRecord> = HashSet::new();
    let mut out = Vec::with_capacity(records.len());

    for mut record in records {
        if record.currency.is_empty() {
            if let Some(currency) = currency_symbol(&record.order_total) {
                record.currency = currency.to_string();
            }
        }

        if record.item_title.is_empty() && record.order_total.is_empty() {
            continue;
        }

        if seen.insert(record.clone()) {
            out.push(record);
        }
    }

    out
}
