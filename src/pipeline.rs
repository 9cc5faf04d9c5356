// 🔄 Pipeline - load → classify → rank → export
// Strictly sequential, everything held in memory for one run.

use crate::classifier::{ClassifiedRecord, Family, FamilyKeywordTable, KeywordClassifier};
use crate::config::PipelineConfig;
use crate::exporter::{build_document, write_document, DashboardDocument};
use crate::loader::{load_records, CleanRecord, LoadSummary};
use crate::palette::ColorPalette;
use crate::ranker::{Ranker, Ranking};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// What one run did
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub load: LoadSummary,

    /// Records per family, in priority order, zero counts included.
    /// Families assigned outside the table's order follow it.
    pub family_counts: Vec<(Family, usize)>,
    pub sub_products: usize,
    pub total_value: f64,
    pub output_path: PathBuf,

    /// SHA-256 of the written document
    pub digest: String,
}

impl PipelineReport {
    pub fn summary(&self) -> String {
        format!(
            "{} | {} sub-products, total ${:.0} → {} (sha256 {})",
            self.load.summary(),
            self.sub_products,
            self.total_value,
            self.output_path.display(),
            &self.digest[..self.digest.len().min(12)]
        )
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    classifier: KeywordClassifier,
    palette: ColorPalette,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline {
            config,
            classifier: KeywordClassifier::default(),
            palette: ColorPalette::standard(),
        }
    }

    /// Builder pattern: replace the keyword table
    pub fn with_keyword_table(mut self, table: FamilyKeywordTable) -> Self {
        self.classifier = KeywordClassifier::new(table);
        self
    }

    /// Builder pattern: replace the palette
    pub fn with_palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classify(&self, records: Vec<CleanRecord>) -> Vec<ClassifiedRecord> {
        let classified = self.classifier.classify_all(records);
        for record in &classified {
            debug!(
                line = record.record.line_number,
                family = %record.family,
                sub_product = %record.sub_product,
                "classified"
            );
        }
        classified
    }

    pub fn rank(&self, records: &[ClassifiedRecord]) -> Ranking {
        Ranker::new(&self.palette, self.config.top_n).rank(records)
    }

    pub fn document(&self, ranking: &Ranking) -> DashboardDocument {
        let order = self.classifier.table().family_order();
        build_document(ranking, &order, |family| {
            self.palette.base_color(family).to_hex()
        })
    }

    /// Classify, rank and build the document from already-cleaned records
    pub fn build(&self, records: Vec<CleanRecord>) -> (Vec<(Family, usize)>, Ranking, DashboardDocument) {
        let classified = self.classify(records);
        let family_counts = self.family_counts(&classified);

        for (family, count) in &family_counts {
            info!(family = %family, records = count, "family membership");
        }

        let ranking = self.rank(&classified);
        log_ranking(&ranking);

        let document = self.document(&ranking);
        (family_counts, ranking, document)
    }

    /// Full run: read the configured input, write the configured output
    pub fn run(&self) -> Result<PipelineReport> {
        let outcome = load_records(&self.config)?;
        let (family_counts, ranking, document) = self.build(outcome.records);

        let digest = write_document(&document, &self.config.output_path)?;
        info!(
            path = %self.config.output_path.display(),
            families = document.families.len(),
            sha256 = %digest,
            "chart document written"
        );

        Ok(PipelineReport {
            load: outcome.summary,
            family_counts,
            sub_products: ranking.entries.len(),
            total_value: ranking.total_value(),
            output_path: self.config.output_path.clone(),
            digest,
        })
    }

    fn family_counts(&self, records: &[ClassifiedRecord]) -> Vec<(Family, usize)> {
        let mut order = self.classifier.table().family_order();
        for family in Family::ALL {
            if !order.contains(&family) && records.iter().any(|r| r.family == family) {
                order.push(family);
            }
        }

        order
            .into_iter()
            .map(|family| {
                let count = records.iter().filter(|r| r.family == family).count();
                (family, count)
            })
            .collect()
    }
}

fn log_ranking(ranking: &Ranking) {
    for entry in ranking.top() {
        info!(
            rank = entry.rank,
            family = %entry.family,
            total = entry.total_value,
            "{}",
            entry.sub_product
        );
    }

    let canola: Vec<&str> = ranking
        .family_entries(Family::CanolaComplex)
        .map(|e| e.sub_product.as_str())
        .collect();
    info!(count = canola.len(), products = ?canola, "canola complex products");
}

// ============================================================================
// TESTS
// ============================================================================
