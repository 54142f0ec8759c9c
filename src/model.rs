use serde::{Deserialize, Serialize};

use crate::extract::ExtractionStats;

pub const RECORD_COLUMNS: [&str; 5] = [
    "seller",
    "item_title",
    "order_total",
    "currency",
    "order_number",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub seller: String,
    pub item_title: String,
    pub order_total: String,
    pub currency: String,
    pub order_number: String,
}

impl PurchaseRecord {
    pub fn columns(&self) -> [&str; 5] {
        [
            &self.seller,
            &self.item_title,
            &self.order_total,
            &self.currency,
            &self.order_number,
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageEntry {
    pub page: usize,
    pub filename: String,
    pub sha256: String,
    pub record_count: usize,
    pub stats: ExtractionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractPaths {
    pub output_dir: String,
    pub csv_path: Option<String>,
    pub html_path: Option<String>,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractCounts {
    pub page_count: usize,
    pub processed_page_count: usize,
    pub page_records_total: usize,
    pub merged_records: usize,
    pub totals: ExtractionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub target_year: i32,
    pub command: String,
    pub paths: ExtractPaths,
    pub counts: ExtractCounts,
    pub pages: Vec<PageEntry>,
    pub warnings: Vec<String>,
}
