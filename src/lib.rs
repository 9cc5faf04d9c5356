// Saskatchewan Export Dashboard - Core Library
// Trade report CSV → commodity families → ranked sub-products → chart JSON

pub mod config;
pub mod loader;
pub mod classifier;
pub mod palette;
pub mod ranker;
pub mod exporter;
pub mod pipeline;
pub mod logging;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use loader::{
    RawRecord, CleanRecord, LoadSummary, LoadOutcome, RowRejection, NumberStyle,
    load_records, clean_record, clean_rows,
};
pub use classifier::{
    Family, FamilyRule, FamilyKeywordTable, KeywordClassifier, ClassifiedRecord,
};
pub use palette::{ColorPalette, FamilyPalette, Rgb};
pub use ranker::{Ranker, RankedEntry, Ranking, SeriesPoint, rank_sub_products};
pub use exporter::{
    DashboardDocument, FamilyGroup, SubProductSeries,
    build_document, write_document,
};
pub use pipeline::{Pipeline, PipelineReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
