pub mod extract;
pub mod model;

pub use extract::{
    ExtractError, ExtractionReport, ExtractionStats, PurchaseExtractor, RawDocument,
    extract_records, merge_pages,
};
pub use model::PurchaseRecord;
