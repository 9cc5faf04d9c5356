// 🏆 Ranker - sub-product totals, rank labels, colors
// Groups classified records by sub-product, sorts by total export value and
// hands out rank labels and family shades. Nothing is filtered: the Top-N
// label is decoration only.

use crate::classifier::{ClassifiedRecord, Family};
use crate::palette::{ColorPalette, Rgb};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: String,
    pub value: f64,
}

/// RankedEntry - aggregate for one sub-product
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub sub_product: String,
    pub family: Family,

    /// HS code of the first record seen for this sub-product
    pub hs_code: Option<String>,

    /// Sum over all periods
    pub total_value: f64,
    pub record_count: usize,

    /// 1 = highest total value
    pub rank: usize,

    /// `"(Top K)"` for the top N, otherwise None
    pub rank_label: Option<String>,

    /// Name with the rank label prefixed when present
    pub display_name: String,

    /// 1-based position among sub-products of the same family
    pub family_rank: usize,
    pub color: Rgb,

    /// One point per period on the shared axis; absent periods are 0.0
    pub series: Vec<SeriesPoint>,
}

impl RankedEntry {
    pub fn is_top(&self) -> bool {
        self.rank_label.is_some()
    }
}

/// Ranker output: the shared period axis and every entry in rank order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ranking {
    pub periods: Vec<String>,
    pub entries: Vec<RankedEntry>,
}

impl Ranking {
    pub fn total_value(&self) -> f64 {
        self.entries.iter().map(|e| e.total_value).sum()
    }

    pub fn top(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter().filter(|e| e.is_top())
    }

    /// Entries of one family, best first
    pub fn family_entries(&self, family: Family) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter().filter(move |e| e.family == family)
    }

    /// Sum of all sub-products per period, aligned with `periods`
    pub fn total_series(&self) -> Vec<SeriesPoint> {
        self.periods
            .iter()
            .enumerate()
            .map(|(i, period)| SeriesPoint {
                period: period.clone(),
                value: self.entries.iter().map(|e| e.series[i].value).sum(),
            })
            .collect()
    }
}

pub fn rank_label(rank: usize) -> String {
    format!("(Top {})", rank)
}

// ============================================================================
// RANKING
// ============================================================================

struct Aggregate {
    sub_product: String,
    family: Family,
    hs_code: Option<String>,
    total: f64,
    count: usize,
    by_period: BTreeMap<String, f64>,
}

pub struct Ranker<'a> {
    palette: &'a ColorPalette,
    top_n: usize,
}

impl<'a> Ranker<'a> {
    pub fn new(palette: &'a ColorPalette, top_n: usize) -> Self {
        Ranker { palette, top_n }
    }

    /// Aggregate, sort and label
    ///
    /// Sorting is stable, so sub-products with equal totals keep the order in
    /// which they first appeared in the input.
    pub fn rank(&self, records: &[ClassifiedRecord]) -> Ranking {
        let periods: Vec<String> = records
            .iter()
            .map(|r| r.record.period.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let aggregates = aggregate(records);

        let mut order: Vec<usize> = (0..aggregates.len()).collect();
        order.sort_by(|&a, &b| aggregates[b].total.total_cmp(&aggregates[a].total));

        let mut family_sizes: HashMap<Family, usize> = HashMap::new();
        for agg in &aggregates {
            *family_sizes.entry(agg.family).or_insert(0) += 1;
        }

        let family_shades: HashMap<Family, Vec<Rgb>> = family_sizes
            .iter()
            .map(|(&family, &size)| (family, self.palette.shades_for(family, size)))
            .collect();

        let mut family_seen: HashMap<Family, usize> = HashMap::new();
        let mut entries = Vec::with_capacity(order.len());

        for (position, &idx) in order.iter().enumerate() {
            let agg = &aggregates[idx];
            let rank = position + 1;

            let seen = family_seen.entry(agg.family).or_insert(0);
            let family_index = *seen;
            *seen += 1;

            let color = family_shades
                .get(&agg.family)
                .and_then(|shades| shades.get(family_index))
                .copied()
                .unwrap_or_else(|| self.palette.base_color(agg.family));

            let rank_label = (rank <= self.top_n).then(|| rank_label(rank));
            let display_name = match &rank_label {
                Some(label) => format!("{} {}", label, agg.sub_product),
                None => agg.sub_product.clone(),
            };

            let series = periods
                .iter()
                .map(|p| SeriesPoint {
                    period: p.clone(),
                    value: agg.by_period.get(p).copied().unwrap_or(0.0),
                })
                .collect();

            entries.push(RankedEntry {
                sub_product: agg.sub_product.clone(),
                family: agg.family,
                hs_code: agg.hs_code.clone(),
                total_value: agg.total,
                record_count: agg.count,
                rank,
                rank_label,
                display_name,
                family_rank: family_index + 1,
                color,
                series,
            });
        }

        Ranking { periods, entries }
    }
}

/// Group by sub-product in first-seen order
fn aggregate(records: &[ClassifiedRecord]) -> Vec<Aggregate> {
    let mut aggregates: Vec<Aggregate> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for classified in records {
        let slot = *index.entry(classified.sub_product.as_str()).or_insert_with(|| {
            aggregates.push(Aggregate {
                sub_product: classified.sub_product.clone(),
                family: classified.family,
                hs_code: classified.record.hs_code.clone(),
                total: 0.0,
                count: 0,
                by_period: BTreeMap::new(),
            });
            aggregates.len() - 1
        });

        let agg = &mut aggregates[slot];
        agg.total += classified.record.value;
        agg.count += 1;
        *agg
            .by_period
            .entry(classified.record.period.clone())
            .or_insert(0.0) += classified.record.value;
    }

    aggregates
}

/// Convenience wrapper over `Ranker`
pub fn rank_sub_products(
    records: &[ClassifiedRecord],
    palette: &ColorPalette,
    top_n: usize,
) -> Ranking {
    Ranker::new(palette, top_n).rank(records)
}

// ============================================================================
// TESTS
// ============================================================================
