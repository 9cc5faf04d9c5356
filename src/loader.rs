// 📂 Loader / Cleaner
// Trade report CSV → province-filtered, type-normalized records
//
// The report carries a placeholder line above the real header, may be saved
// with a BOM or in Latin-1, and mixes currency formatting into the value column.

use crate::config::PipelineConfig;
use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Separator between HS code and product name in the commodity column
pub const COMMODITY_DELIMITER: &str = " - ";

/// How far down the file the real header may sit
const HEADER_SEARCH_LINES: usize = 10;

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

// ============================================================================
// CORE TYPES
// ============================================================================

/// RawRecord - one input row exactly as read, before any normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub period: String,
    pub province: String,
    pub commodity: String,
    pub value: String,
    pub quantity: Option<String>,

    /// Line in the original file (1-indexed)
    pub line_number: usize,
}

/// CleanRecord - a row for the target province with numeric value
///
/// Invariants: `value >= 0.0`, `province` equals the configured province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    /// Normalized to `YYYY-MM`
    pub period: String,
    pub province: String,

    /// Commodity column verbatim
    pub commodity: String,

    /// HS code half of a compound commodity field
    pub hs_code: Option<String>,

    /// Product name half of a compound commodity field (or the whole field)
    pub description: String,

    pub value: f64,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub line_number: usize,
}

/// Why a row did not survive cleaning. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    WrongProvince,
    MissingCommodity,
    UnparseableValue,
    NegativeValue,
    UnparseablePeriod,
    Malformed,
}

impl RowRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowRejection::WrongProvince => "wrong_province",
            RowRejection::MissingCommodity => "missing_commodity",
            RowRejection::UnparseableValue => "unparseable_value",
            RowRejection::NegativeValue => "negative_value",
            RowRejection::UnparseablePeriod => "unparseable_period",
            RowRejection::Malformed => "malformed",
        }
    }
}

/// Diagnostic counts for one load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub rows_in: usize,
    pub rows_retained: usize,
    pub wrong_province: usize,
    pub missing_commodity: usize,
    pub unparseable_value: usize,
    pub negative_value: usize,
    pub unparseable_period: usize,
    pub malformed: usize,
}

impl LoadSummary {
    pub fn record(&mut self, rejection: RowRejection) {
        match rejection {
            RowRejection::WrongProvince => self.wrong_province += 1,
            RowRejection::MissingCommodity => self.missing_commodity += 1,
            RowRejection::UnparseableValue => self.unparseable_value += 1,
            RowRejection::NegativeValue => self.negative_value += 1,
            RowRejection::UnparseablePeriod => self.unparseable_period += 1,
            RowRejection::Malformed => self.malformed += 1,
        }
    }

    pub fn dropped(&self) -> usize {
        self.rows_in - self.rows_retained
    }

    /// Rows dropped for bad data, as opposed to belonging to another province
    pub fn invalid(&self) -> usize {
        self.dropped() - self.wrong_province
    }

    pub fn summary(&self) -> String {
        format!(
            "Rows in: {}, retained: {}, other province: {}, invalid: {}",
            self.rows_in,
            self.rows_retained,
            self.wrong_province,
            self.invalid()
        )
    }
}

/// How numbers in the value and quantity columns write their decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberStyle {
    /// `1,234.50`: commas group thousands
    #[default]
    Standard,

    /// `1234,50` or `1.234,50`: the comma is the decimal mark
    DecimalComma,
}

impl NumberStyle {
    /// Semicolon-separated exports come from decimal-comma locales
    pub fn for_delimiter(delimiter: u8) -> Self {
        if delimiter == b';' {
            NumberStyle::DecimalComma
        } else {
            NumberStyle::Standard
        }
    }

    /// Rewrite `text` into `1234.50` form; standard text is returned as is
    fn normalize(&self, text: &str) -> String {
        if *self == NumberStyle::Standard {
            return text.to_string();
        }
        match (text.rfind(','), text.rfind('.')) {
            (Some(comma), Some(dot)) if comma > dot => text.replace('.', "").replace(',', "."),
            (Some(_), None) if text.matches(',').count() == 1 => text.replace(',', "."),
            _ => text.to_string(),
        }
    }
}

/// Raw rows plus the count of lines the CSV reader could not turn into a row
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
    pub malformed: usize,

    /// Decimal convention implied by the delimiter
    pub number_style: NumberStyle,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub records: Vec<CleanRecord>,
    pub summary: LoadSummary,
}

// ============================================================================
// COLUMN RESOLUTION
// ============================================================================

/// Positions of the columns we read, resolved from header names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    period: usize,
    province: usize,
    commodity: usize,
    value: usize,
    quantity: Option<usize>,
}

fn normalize_header(name: &str) -> String {
    name.replace('\u{feff}', "").trim().to_lowercase()
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| aliases.contains(&h.as_str()))
}

fn require_column(headers: &[String], aliases: &[&str]) -> Result<usize> {
    find_column(headers, aliases).ok_or_else(|| {
        anyhow!(
            "Missing required column '{}' (found: {})",
            aliases[0],
            headers.join(", ")
        )
    })
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();

        Ok(ColumnMap {
            period: require_column(&names, &["period", "date", "month"])?,
            province: require_column(&names, &["province", "region"])?,
            commodity: require_column(&names, &["commodity", "commodity description", "product"])?,
            value: require_column(&names, &["value ($)", "value", "export value", "value ($cad)"])?,
            quantity: find_column(&names, &["quantity", "qty"]),
        })
    }

    fn max_required(&self) -> usize {
        self.period
            .max(self.province)
            .max(self.commodity)
            .max(self.value)
    }
}

// ============================================================================
// DECODING & SNIFFING
// ============================================================================

/// UTF-8 (BOM stripped) when valid, otherwise Latin-1
pub fn decode_input(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Index of the header line: first line naming both period and province
pub fn locate_header(text: &str) -> Option<usize> {
    text.lines().take(HEADER_SEARCH_LINES).position(|line| {
        let lower = line.to_lowercase();
        lower.contains("period") && lower.contains("province")
    })
}

/// Most frequent candidate delimiter outside quotes; comma when none appear
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;

    for b in header_line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(i) = DELIMITER_CANDIDATES.iter().position(|&d| d == b) {
            counts[i] += 1;
        }
    }

    // First candidate wins ties, so a bare header falls back to comma
    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }
    DELIMITER_CANDIDATES[best]
}

// ============================================================================
// FIELD PARSING
// ============================================================================

/// Parse a currency amount such as `"$1,234.50"`, `"1 234"` or `"(50)"`
pub fn parse_value(raw: &str) -> std::result::Result<f64, RowRejection> {
    parse_value_in(raw, NumberStyle::Standard)
}

/// `parse_value` for a given decimal convention
pub fn parse_value_in(raw: &str, style: NumberStyle) -> std::result::Result<f64, RowRejection> {
    let mut text = raw.trim().to_string();
    let mut negative = false;

    if text.starts_with('(') && text.ends_with(')') && text.len() > 2 {
        negative = true;
        text = text[1..text.len() - 1].to_string();
    }
    let text = style.normalize(&text);

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '\u{a0}'))
        .collect();

    if cleaned.is_empty() {
        return Err(RowRejection::UnparseableValue);
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| RowRejection::UnparseableValue)?;

    if !value.is_finite() {
        return Err(RowRejection::UnparseableValue);
    }

    let value = if negative { -value } else { value };
    if value < 0.0 {
        return Err(RowRejection::NegativeValue);
    }

    // Normalize -0.0
    Ok(value.abs())
}

/// Optional numeric field; anything unparseable is treated as absent
pub fn parse_quantity(raw: Option<&str>) -> Option<f64> {
    parse_quantity_in(raw, NumberStyle::Standard)
}

pub fn parse_quantity_in(raw: Option<&str>, style: NumberStyle) -> Option<f64> {
    let cleaned: String = style
        .normalize(raw?.trim())
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|q| q.is_finite())
}

/// Normalize a period to `YYYY-MM`
pub fn parse_period(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    const FULL_DATES: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y"];
    for fmt in FULL_DATES {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date.format("%Y-%m").to_string());
        }
    }

    const DATE_TIMES: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in DATE_TIMES {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.format("%Y-%m").to_string());
        }
    }

    // Month-only forms get a synthetic first day
    let month_only = [
        (format!("{}-01", text), "%Y-%m-%d"),
        (format!("{}/01", text), "%Y/%m/%d"),
        (format!("01 {}", text), "%d %B %Y"),
        // Two-digit year first: %Y would read "Sep-24" as year 24
        (format!("01-{}", text), "%d-%B-%y"),
        (format!("01-{}", text), "%d-%B-%Y"),
    ];
    for (candidate, fmt) in month_only.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(candidate, fmt) {
            return Some(date.format("%Y-%m").to_string());
        }
    }

    None
}

/// Split `"1205.10 - Rape/colza seeds"` into HS code and name
pub fn split_commodity(commodity: &str) -> (Option<String>, String) {
    if let Some((code, name)) = commodity.split_once(COMMODITY_DELIMITER) {
        let code = code.trim();
        let name = name.trim();
        if !code.is_empty() && !name.is_empty() {
            return (Some(code.to_string()), name.to_string());
        }
    }
    (None, commodity.trim().to_string())
}

// ============================================================================
// CLEANING
// ============================================================================

/// Clean one row against the target province
pub fn clean_record(raw: &RawRecord, province: &str) -> std::result::Result<CleanRecord, RowRejection> {
    clean_record_with(raw, province, NumberStyle::Standard)
}

/// `clean_record` with the table's decimal convention
pub fn clean_record_with(
    raw: &RawRecord,
    province: &str,
    style: NumberStyle,
) -> std::result::Result<CleanRecord, RowRejection> {
    if raw.province.trim().to_lowercase() != province.trim().to_lowercase() {
        return Err(RowRejection::WrongProvince);
    }

    if raw.commodity.trim().is_empty() {
        return Err(RowRejection::MissingCommodity);
    }

    let value = parse_value_in(&raw.value, style)?;
    let period = parse_period(&raw.period).ok_or(RowRejection::UnparseablePeriod)?;
    let quantity = parse_quantity_in(raw.quantity.as_deref(), style);
    let unit_price = quantity.filter(|&q| q > 0.0).map(|q| value / q);
    let (hs_code, description) = split_commodity(&raw.commodity);

    Ok(CleanRecord {
        period,
        province: province.trim().to_string(),
        commodity: raw.commodity.clone(),
        hs_code,
        description,
        value,
        quantity,
        unit_price,
        line_number: raw.line_number,
    })
}

/// Clean a table, counting every rejection
pub fn clean_rows(table: &RawTable, province: &str) -> (Vec<CleanRecord>, LoadSummary) {
    let mut summary = LoadSummary {
        rows_in: table.records.len() + table.malformed,
        malformed: table.malformed,
        ..LoadSummary::default()
    };

    let mut records = Vec::with_capacity(table.records.len());
    for raw in &table.records {
        match clean_record_with(raw, province, table.number_style) {
            Ok(record) => records.push(record),
            Err(rejection) => {
                debug!(line = raw.line_number, reason = rejection.as_str(), "row dropped");
                summary.record(rejection);
            }
        }
    }

    summary.rows_retained = records.len();
    (records, summary)
}

// ============================================================================
// READING
// ============================================================================

/// Byte offset where the line at `line_index` starts
fn line_offset(text: &str, line_index: usize) -> usize {
    text.split_inclusive('\n').take(line_index).map(str::len).sum()
}

/// Parse decoded report text into raw rows
pub fn read_raw_records(text: &str, delimiter: Option<u8>) -> Result<RawTable> {
    let header_index = locate_header(text).ok_or_else(|| {
        anyhow!(
            "No header line naming Period and Province in the first {} lines",
            HEADER_SEARCH_LINES
        )
    })?;

    // Quoted fields keep their line breaks
    let body = &text[line_offset(text, header_index)..];
    let header_line = body.lines().next().unwrap_or("");
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(header_line));

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut table = RawTable {
        number_style: NumberStyle::for_delimiter(delimiter),
        ..RawTable::default()
    };
    // Reader positions are 1-indexed within the body; the lines skipped above
    // the header shift them into file lines
    let file_line = |line: u64| line as usize + header_index;
    let mut next_line = header_index + 2;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| file_line(p.line())).unwrap_or(next_line);
                debug!(line, error = %e, "unreadable CSV row");
                table.malformed += 1;
                continue;
            }
        };

        let line_number = record.position().map(|p| file_line(p.line())).unwrap_or(next_line);
        next_line = line_number + 1;

        // Trailing blank lines and footnotes
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        if record.len() <= columns.max_required() {
            table.malformed += 1;
            continue;
        }

        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        table.records.push(RawRecord {
            period: field(columns.period),
            province: field(columns.province),
            commodity: field(columns.commodity),
            value: field(columns.value),
            quantity: columns.quantity.and_then(|i| record.get(i)).map(str::to_string),
            line_number,
        });
    }

    Ok(table)
}

/// Load and clean the configured report. Missing or headerless files are fatal.
pub fn load_records(config: &PipelineConfig) -> Result<LoadOutcome> {
    load_from_path(&config.input_path, &config.province, config.delimiter)
}

pub fn load_from_path(path: &Path, province: &str, delimiter: Option<u8>) -> Result<LoadOutcome> {
    info!(path = %path.display(), "loading trade report");

    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let text = decode_input(&bytes);

    let table = read_raw_records(&text, delimiter)
        .with_context(|| format!("Failed to parse trade report: {}", path.display()))?;
    let (records, summary) = clean_rows(&table, province);

    info!(
        rows_in = summary.rows_in,
        rows_retained = summary.rows_retained,
        other_province = summary.wrong_province,
        invalid = summary.invalid(),
        "data loaded"
    );

    Ok(LoadOutcome { records, summary })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn raw(province: &str, commodity: &str, value: &str) -> RawRecord {
        RawRecord {
            period: "2024-09".to_string(),
            province: province.to_string(),
            commodity: commodity.to_string(),
            value: value.to_string(),
            quantity: None,
            line_number: 3,
        }
    }

    const REPORT: &str = "\u{feff}Trade report placeholder\n\
Period,Province,Commodity,Value ($),Quantity\n\
2024-09,Saskatchewan,1205.10 - Canola seeds,\"$1,000\",10\n\
2024-09,Ontario,1001.99 - Red spring wheat,500,5\n\
2024-10,saskatchewan ,1001.99 - Red spring wheat,abc,5\n\
2024-10,Saskatchewan,Lentils,250.5,\n";

    #[test]
    fn test_parse_value_currency_formats() {
        assert_eq!(parse_value("$1,234.50"), Ok(1234.5));
        assert_eq!(parse_value(" 42 "), Ok(42.0));
        assert_eq!(parse_value("0"), Ok(0.0));
        assert_eq!(parse_value("-0"), Ok(0.0));
        assert_eq!(parse_value("1 000"), Ok(1000.0));
    }

    #[test]
    fn test_parse_value_rejections() {
        assert_eq!(parse_value(""), Err(RowRejection::UnparseableValue));
        assert_eq!(parse_value("n/a"), Err(RowRejection::UnparseableValue));
        assert_eq!(parse_value("NaN"), Err(RowRejection::UnparseableValue));
        assert_eq!(parse_value("-5"), Err(RowRejection::NegativeValue));
        assert_eq!(parse_value("(50)"), Err(RowRejection::NegativeValue));
    }

    #[test]
    fn test_parse_period_formats() {
        assert_eq!(parse_period("2024-09"), Some("2024-09".to_string()));
        assert_eq!(parse_period("2024-09-01"), Some("2024-09".to_string()));
        assert_eq!(parse_period("2024/09"), Some("2024-09".to_string()));
        assert_eq!(parse_period("09/15/2024"), Some("2024-09".to_string()));
        assert_eq!(parse_period("September 2024"), Some("2024-09".to_string()));
        assert_eq!(parse_period("Sep 2024"), Some("2024-09".to_string()));
        assert_eq!(parse_period("Sep-24"), Some("2024-09".to_string()));
        assert_eq!(parse_period("2024-09-01 00:00:00"), Some("2024-09".to_string()));
        assert_eq!(parse_period("not a date"), None);
        assert_eq!(parse_period(""), None);
    }

    #[test]
    fn test_split_commodity() {
        let (code, name) = split_commodity("1205.10 - Canola seeds");
        assert_eq!(code, Some("1205.10".to_string()));
        assert_eq!(name, "Canola seeds");

        // Only the first delimiter splits
        let (code, name) = split_commodity("4703 - Wood pulp - bleached");
        assert_eq!(code, Some("4703".to_string()));
        assert_eq!(name, "Wood pulp - bleached");

        let (code, name) = split_commodity("Organic canola oil, crude");
        assert_eq!(code, None);
        assert_eq!(name, "Organic canola oil, crude");
    }

    #[test]
    fn test_clean_record_target_province() {
        let record = clean_record(&raw("Saskatchewan", "Canola seeds", "1000"), "Saskatchewan")
            .unwrap();

        assert_eq!(record.province, "Saskatchewan");
        assert_eq!(record.description, "Canola seeds");
        assert_eq!(record.value, 1000.0);
        assert_eq!(record.period, "2024-09");
    }

    #[test]
    fn test_clean_record_province_case_insensitive() {
        let record = clean_record(&raw("  SASKATCHEWAN ", "Barley", "5"), "Saskatchewan").unwrap();
        assert_eq!(record.province, "Saskatchewan");
    }

    #[test]
    fn test_clean_record_other_province_dropped() {
        let result = clean_record(&raw("Ontario", "Canola seeds", "1000"), "Saskatchewan");
        assert_eq!(result, Err(RowRejection::WrongProvince));
    }

    #[test]
    fn test_unit_price() {
        let mut row = raw("Saskatchewan", "Canola seeds", "1000");
        row.quantity = Some("4".to_string());
        let record = clean_record(&row, "Saskatchewan").unwrap();
        assert_eq!(record.unit_price, Some(250.0));

        row.quantity = Some("0".to_string());
        let record = clean_record(&row, "Saskatchewan").unwrap();
        assert_eq!(record.quantity, Some(0.0));
        assert_eq!(record.unit_price, None);
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("Period,Province,Commodity"), b',');
        assert_eq!(sniff_delimiter("Period;Province;\"Value, $\""), b';');
        assert_eq!(sniff_delimiter("Period\tProvince\tCommodity"), b'\t');
        assert_eq!(sniff_delimiter("Period"), b',');
    }

    #[test]
    fn test_decode_latin1_fallback() {
        let bytes = b"Qu\xe9bec";
        assert_eq!(decode_input(bytes), "Québec");
        assert_eq!(decode_input("\u{feff}abc".as_bytes()), "abc");
    }

    #[test]
    fn test_read_and_clean_report() {
        let table = read_raw_records(&decode_input(REPORT.as_bytes()), None).unwrap();
        assert_eq!(table.records.len(), 4);
        assert_eq!(table.records[0].line_number, 3);

        let (records, summary) = clean_rows(&table, "Saskatchewan");

        assert_eq!(summary.rows_in, 4);
        assert_eq!(summary.rows_retained, 2);
        assert_eq!(summary.wrong_province, 1);
        assert_eq!(summary.unparseable_value, 1);
        assert_eq!(summary.invalid(), 1);

        assert!(records.iter().all(|r| r.province == "Saskatchewan" && r.value >= 0.0));
        assert_eq!(records[0].hs_code, Some("1205.10".to_string()));
        assert_eq!(records[0].value, 1000.0);
        assert_eq!(records[1].description, "Lentils");
        assert_eq!(records[1].quantity, None);
    }

    #[test]
    fn test_short_rows_counted_as_malformed() {
        let text = "Period,Province,Commodity,Value ($)\n2024-09,Saskatchewan\n";
        let table = read_raw_records(text, None).unwrap();

        assert!(table.records.is_empty());
        assert_eq!(table.malformed, 1);

        let (_, summary) = clean_rows(&table, "Saskatchewan");
        assert_eq!(summary.rows_in, 1);
        assert_eq!(summary.malformed, 1);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let text = "Period,Province,Commodity\n2024-09,Saskatchewan,Barley\n";
        let err = read_raw_records(text, None).unwrap_err();
        assert!(err.to_string().contains("value"));
    }

    #[test]
    fn test_semicolon_report() {
        let text = "Period;Province;Commodity;Value ($)\n2024-09;Saskatchewan;Barley, for malting;1,5\n";
        let table = read_raw_records(text, None).unwrap();
        assert_eq!(table.records[0].commodity, "Barley, for malting");
        assert_eq!(table.number_style, NumberStyle::DecimalComma);

        let (records, _) = clean_rows(&table, "Saskatchewan");
        assert_eq!(records[0].value, 1.5);
    }

    #[test]
    fn test_decimal_comma_values() {
        let style = NumberStyle::DecimalComma;
        assert_eq!(parse_value_in("1,5", style), Ok(1.5));
        assert_eq!(parse_value_in("1.234,50", style), Ok(1234.5));
        assert_eq!(parse_value_in("1 234,50", style), Ok(1234.5));
        assert_eq!(parse_value_in("1,234,567", style), Ok(1234567.0));
        assert_eq!(parse_value_in("250.5", style), Ok(250.5));
        assert_eq!(parse_quantity_in(Some("2,5"), style), Some(2.5));

        // Comma-delimited reports keep comma as the thousands separator
        assert_eq!(parse_value("1,500"), Ok(1500.0));
        assert_eq!(NumberStyle::for_delimiter(b','), NumberStyle::Standard);
    }

    #[test]
    fn test_line_numbers_across_quoted_newlines() {
        let text = "Trade report placeholder\n\
Period,Province,Commodity,Value ($)\n\
2024-09,Saskatchewan,\"Canola seeds\nfor crushing\",100\n\
2024-10,Saskatchewan,Barley,50\n";
        let table = read_raw_records(text, None).unwrap();

        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].commodity, "Canola seeds\nfor crushing");
        assert_eq!(table.records[0].line_number, 3);
        assert_eq!(table.records[1].line_number, 5);
    }

    #[test]
    fn test_crlf_report() {
        let text = "Trade report placeholder\r\n\
Period,Province,Commodity,Value ($)\r\n\
2024-09,Saskatchewan,Lentils,100\r\n\
2024-10,Saskatchewan,Barley,50\r\n";
        let table = read_raw_records(text, None).unwrap();

        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].value, "100");
        assert_eq!(table.records[1].line_number, 4);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REPORT.as_bytes()).unwrap();

        let outcome = load_from_path(file.path(), "Saskatchewan", None).unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.summary.rows_retained, 2);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_from_path(&dir.path().join("absent.csv"), "Saskatchewan", None);
        assert!(result.is_err());
    }
}
