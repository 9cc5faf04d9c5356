// 🏷️ Family Classification - Keywords as Data
// Ordered keyword table: the first family whose keyword occurs in the
// commodity description wins, everything else lands in Others.

use crate::loader::CleanRecord;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// HS heading for rape/colza/mustard oils
const CANOLA_OIL_HEADING: &str = "1514";

// ============================================================================
// FAMILY
// ============================================================================

/// Commodity family. Declaration order is the default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Family {
    #[serde(rename = "Canola Complex")]
    CanolaComplex,
    #[serde(rename = "Wheat Complex")]
    WheatComplex,
    #[serde(rename = "Barley Family")]
    BarleyFamily,
    #[serde(rename = "Pulses Complex")]
    PulsesComplex,
    #[serde(rename = "Potash")]
    Potash,
    #[serde(rename = "Wood Pulp")]
    WoodPulp,
    #[serde(rename = "Soya Beans")]
    SoyaBeans,
    #[serde(rename = "Others")]
    Others,
}

impl Family {
    pub const ALL: [Family; 8] = [
        Family::CanolaComplex,
        Family::WheatComplex,
        Family::BarleyFamily,
        Family::PulsesComplex,
        Family::Potash,
        Family::WoodPulp,
        Family::SoyaBeans,
        Family::Others,
    ];

    /// Display name, also used in the chart document
    pub fn name(&self) -> &'static str {
        match self {
            Family::CanolaComplex => "Canola Complex",
            Family::WheatComplex => "Wheat Complex",
            Family::BarleyFamily => "Barley Family",
            Family::PulsesComplex => "Pulses Complex",
            Family::Potash => "Potash",
            Family::WoodPulp => "Wood Pulp",
            Family::SoyaBeans => "Soya Beans",
            Family::Others => "Others",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// KEYWORD TABLE
// ============================================================================

/// One row of the keyword table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyRule {
    pub family: Family,

    /// Case-insensitive substrings
    pub keywords: Vec<String>,
}

impl FamilyRule {
    pub fn new(family: Family, keywords: &[&str]) -> Self {
        FamilyRule {
            family,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// `text` must already be lowercase
    fn matches_lowercase(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && text.contains(k.as_str()))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matches_lowercase(&text.to_lowercase())
    }
}

/// Ordered family → keywords mapping. Row order is priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyKeywordTable {
    rules: Vec<FamilyRule>,
}

impl FamilyKeywordTable {
    /// Saskatchewan export families, highest priority first
    pub fn standard() -> Self {
        FamilyKeywordTable::from_rules(vec![
            FamilyRule::new(Family::CanolaComplex, &["rape", "colza", "canola"]),
            FamilyRule::new(Family::WheatComplex, &["wheat", "durum"]),
            FamilyRule::new(Family::BarleyFamily, &["barley"]),
            FamilyRule::new(Family::PulsesComplex, &["pea", "lentil", "chickpea"]),
            FamilyRule::new(Family::Potash, &["potassium", "potash"]),
            FamilyRule::new(Family::WoodPulp, &["wood", "pulp"]),
            FamilyRule::new(Family::SoyaBeans, &["soya"]),
        ])
    }

    /// Rows naming the catch-all family are dropped: Others is never matched,
    /// only fallen into.
    pub fn from_rules(rules: Vec<FamilyRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter(|r| r.family != Family::Others)
            .map(|r| FamilyRule {
                family: r.family,
                keywords: r.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        FamilyKeywordTable { rules }
    }

    /// Load a table from a JSON array of `{ "family": ..., "keywords": [...] }`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read keyword table: {:?}", path.as_ref()))?;

        let rules: Vec<FamilyRule> =
            serde_json::from_str(&content).context("Failed to parse keyword table JSON")?;

        Ok(FamilyKeywordTable::from_rules(rules))
    }

    pub fn rules(&self) -> &[FamilyRule] {
        &self.rules
    }

    /// Families in priority order, Others last
    pub fn family_order(&self) -> Vec<Family> {
        let mut order: Vec<Family> = Vec::with_capacity(self.rules.len() + 1);
        for rule in &self.rules {
            if !order.contains(&rule.family) {
                order.push(rule.family);
            }
        }
        order.push(Family::Others);
        order
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn has_family(&self, family: Family) -> bool {
        family == Family::Others || self.rules.iter().any(|r| r.family == family)
    }
}

impl Default for FamilyKeywordTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// CleanRecord plus its family and sub-product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub record: CleanRecord,
    pub family: Family,

    /// Grouping key for ranking: the product name without its HS code
    pub sub_product: String,
}

pub struct KeywordClassifier {
    table: FamilyKeywordTable,
}

impl KeywordClassifier {
    pub fn new(table: FamilyKeywordTable) -> Self {
        KeywordClassifier { table }
    }

    pub fn table(&self) -> &FamilyKeywordTable {
        &self.table
    }

    /// First matching family in table order, or Others. Total and deterministic.
    pub fn classify_text(&self, text: &str) -> Family {
        let lower = text.to_lowercase();
        self.table
            .rules
            .iter()
            .find(|rule| rule.matches_lowercase(&lower))
            .map(|rule| rule.family)
            .unwrap_or(Family::Others)
    }

    /// Classify using description and HS code
    ///
    /// Oils under HS heading 1514 belong to the canola complex even when the
    /// description names neither rape, colza nor canola. The heading is read
    /// from the split HS code, or from the description when the commodity
    /// field was not split. Only applies when the table has a canola rule, so
    /// every family returned is one the table knows.
    pub fn classify(&self, record: &CleanRecord) -> Family {
        let description = record.description.to_lowercase();
        let under_heading = match record.hs_code.as_deref() {
            Some(code) => code.trim().starts_with(CANOLA_OIL_HEADING),
            None => description.contains(CANOLA_OIL_HEADING),
        };

        if under_heading
            && description.contains("oil")
            && self.table.has_family(Family::CanolaComplex)
        {
            return Family::CanolaComplex;
        }

        self.classify_text(&record.description)
    }

    pub fn classify_record(&self, record: CleanRecord) -> ClassifiedRecord {
        let family = self.classify(&record);
        let sub_product = record.description.trim().to_string();
        ClassifiedRecord {
            record,
            family,
            sub_product,
        }
    }

    pub fn classify_all(&self, records: Vec<CleanRecord>) -> Vec<ClassifiedRecord> {
        records
            .into_iter()
            .map(|r| self.classify_record(r))
            .collect()
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(FamilyKeywordTable::standard())
    }
}

// ============================================================================
// TESTS
// ============================================================================
