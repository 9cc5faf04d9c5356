// 📤 Exporter - chart document
// Ranked entries grouped by family, each with a full period series.
//
// Schema consumed by the chart page:
// { periods, total, families: [ { name, color, total,
//     subProducts: [ { name, displayName, color, rank, rankLabel, total,
//                      series: [ { period, value } ] } ] } ] }

use crate::classifier::Family;
use crate::ranker::{Ranking, SeriesPoint};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

// ============================================================================
// DOCUMENT SCHEMA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDocument {
    /// Shared x-axis, ascending `YYYY-MM`
    pub periods: Vec<String>,

    /// All sub-products summed per period (the trend line)
    pub total: Vec<SeriesPoint>,

    pub families: Vec<FamilyGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyGroup {
    pub name: String,

    /// Base hue of the family
    pub color: String,
    pub total: f64,
    pub sub_products: Vec<SubProductSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubProductSeries {
    pub name: String,
    pub display_name: String,
    pub color: String,
    pub rank: usize,

    /// `null` outside the top N
    pub rank_label: Option<String>,
    pub total: f64,
    pub series: Vec<SeriesPoint>,
}

impl DashboardDocument {
    pub fn family(&self, name: &str) -> Option<&FamilyGroup> {
        self.families.iter().find(|f| f.name == name)
    }

    pub fn sub_product_count(&self) -> usize {
        self.families.iter().map(|f| f.sub_products.len()).sum()
    }

    /// Pretty JSON with a trailing newline. Field and element order come from
    /// vectors only, so equal input gives byte-identical output.
    pub fn to_json(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(self).context("Failed to serialize chart document")?;
        json.push('\n');
        Ok(json)
    }
}

// ============================================================================
// BUILD & WRITE
// ============================================================================

/// `family_order` followed by any family the ranking holds that it misses
pub fn complete_family_order(ranking: &Ranking, family_order: &[Family]) -> Vec<Family> {
    let mut order = family_order.to_vec();
    for family in Family::ALL {
        if !order.contains(&family) && ranking.family_entries(family).next().is_some() {
            order.push(family);
        }
    }
    order
}

/// Group a ranking by family in `family_order`; families without
/// sub-products are left out. Families missing from the order are appended,
/// so every ranked entry lands in the document.
pub fn build_document(
    ranking: &Ranking,
    family_order: &[Family],
    base_color: impl Fn(Family) -> String,
) -> DashboardDocument {
    let families = complete_family_order(ranking, family_order)
        .iter()
        .filter_map(|&family| {
            let sub_products: Vec<SubProductSeries> = ranking
                .family_entries(family)
                .map(|entry| SubProductSeries {
                    name: entry.sub_product.clone(),
                    display_name: entry.display_name.clone(),
                    color: entry.color.to_hex(),
                    rank: entry.rank,
                    rank_label: entry.rank_label.clone(),
                    total: entry.total_value,
                    series: entry.series.clone(),
                })
                .collect();

            if sub_products.is_empty() {
                return None;
            }

            Some(FamilyGroup {
                name: family.name().to_string(),
                color: base_color(family),
                total: sub_products.iter().map(|s| s.total).sum(),
                sub_products,
            })
        })
        .collect();

    DashboardDocument {
        periods: ranking.periods.clone(),
        total: ranking.total_series(),
        families,
    }
}

/// SHA-256 of the serialized document, hex encoded
pub fn document_digest(json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Serialize and write; returns the digest of what was written
pub fn write_document(document: &DashboardDocument, path: &Path) -> Result<String> {
    let json = document.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    fs::write(path, &json)
        .with_context(|| format!("Failed to write chart document: {}", path.display()))?;

    Ok(document_digest(&json))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifiedRecord, FamilyKeywordTable};
    use crate::loader::CleanRecord;
    use crate::palette::ColorPalette;
    use crate::ranker::rank_sub_products;

    fn classified(period: &str, family: Family, sub_product: &str, value: f64) -> ClassifiedRecord {
        ClassifiedRecord {
            record: CleanRecord {
                period: period.to_string(),
                province: "Saskatchewan".to_string(),
                commodity: sub_product.to_string(),
                hs_code: None,
                description: sub_product.to_string(),
                value,
                quantity: None,
                unit_price: None,
                line_number: 2,
            },
            family,
            sub_product: sub_product.to_string(),
        }
    }

    fn sample_document() -> DashboardDocument {
        let palette = ColorPalette::standard();
        let records = vec![
            classified("2024-09", Family::WheatComplex, "Durum wheat", 400.0),
            classified("2024-09", Family::CanolaComplex, "Canola seeds", 1000.0),
            classified("2024-10", Family::CanolaComplex, "Canola oil, crude", 300.0),
            classified("2024-10", Family::Others, "Mustard seeds", 20.0),
        ];
        let ranking = rank_sub_products(&records, &palette, 10);
        let order = FamilyKeywordTable::standard().family_order();
        build_document(&ranking, &order, |f| palette.base_color(f).to_hex())
    }

    #[test]
    fn test_families_in_priority_order() {
        let doc = sample_document();
        let names: Vec<&str> = doc.families.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["Canola Complex", "Wheat Complex", "Others"]);
        assert_eq!(doc.sub_product_count(), 4);
    }

    #[test]
    fn test_family_totals_and_series() {
        let doc = sample_document();
        let canola = doc.family("Canola Complex").unwrap();

        assert_eq!(canola.total, 1300.0);
        assert_eq!(canola.color, "#C62828");
        assert_eq!(canola.sub_products[0].name, "Canola seeds");
        assert_eq!(canola.sub_products[0].series.len(), 2);
        assert_eq!(canola.sub_products[0].series[1].value, 0.0);

        assert_eq!(doc.total[0].value, 1400.0);
        assert_eq!(doc.total[1].value, 320.0);
    }

    #[test]
    fn test_json_shape() {
        let doc = sample_document();
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        let sub = &value["families"][0]["subProducts"][0];
        assert_eq!(sub["name"], "Canola seeds");
        assert_eq!(sub["rankLabel"], "(Top 1)");
        assert_eq!(sub["displayName"], "(Top 1) Canola seeds");
        assert_eq!(sub["color"], "#C62828");
        assert_eq!(sub["series"][0]["period"], "2024-09");
        assert_eq!(sub["series"][0]["value"], 1000.0);
        assert!(value["periods"].is_array());
    }

    #[test]
    fn test_unranked_label_is_null() {
        let palette = ColorPalette::standard();
        let records = vec![
            classified("2024-09", Family::Potash, "Potassium chloride", 10.0),
            classified("2024-09", Family::Potash, "Potash, other", 5.0),
        ];
        let ranking = rank_sub_products(&records, &palette, 1);
        let doc = build_document(&ranking, &[Family::Potash], |f| palette.base_color(f).to_hex());

        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert!(value["families"][0]["subProducts"][1]["rankLabel"].is_null());
    }

    #[test]
    fn test_family_missing_from_order_still_exported() {
        let palette = ColorPalette::standard();
        let records = vec![
            classified("2024-09", Family::CanolaComplex, "Organic canola oil, crude", 300.0),
            classified("2024-09", Family::Potash, "Potassium chloride", 700.0),
        ];
        let ranking = rank_sub_products(&records, &palette, 10);
        let doc = build_document(&ranking, &[Family::Potash, Family::Others], |f| {
            palette.base_color(f).to_hex()
        });

        let names: Vec<&str> = doc.families.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Potash", "Canola Complex"]);

        let doc_total: f64 = doc.families.iter().map(|f| f.total).sum();
        assert!((doc_total - ranking.total_value()).abs() < 1e-9);
        assert_eq!(doc.sub_product_count(), ranking.entries.len());
    }

    #[test]
    fn test_byte_identical_output() {
        let first = sample_document().to_json().unwrap();
        let second = sample_document().to_json().unwrap();

        assert_eq!(first, second);
        assert_eq!(document_digest(&first), document_digest(&second));
        assert!(first.ends_with('\n'));
    }

    #[test]
    fn test_write_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("export_data.json");
        let doc = sample_document();

        let digest = write_document(&doc, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert_eq!(digest, document_digest(&written));
        let parsed: DashboardDocument = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_write_failure_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten as a file
        let result = write_document(&sample_document(), dir.path());
        assert!(result.is_err());
    }
}
