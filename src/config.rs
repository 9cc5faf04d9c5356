// ⚙️ Pipeline Configuration
// Where to read, where to write, and which province to keep

use std::env;
use std::path::PathBuf;

/// Environment variable that overrides the input CSV path.
/// It is the only setting read from the environment.
pub const INPUT_PATH_ENV: &str = "SK_EXPORT_INPUT";

pub const DEFAULT_INPUT_PATH: &str = "./SK-CN_2024-2025Oct_Report.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "./export_data.json";
pub const TARGET_PROVINCE: &str = "Saskatchewan";
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Trade report CSV
    pub input_path: PathBuf,

    /// Chart document destination
    pub output_path: PathBuf,

    /// Rows from any other province are dropped (case-insensitive)
    pub province: String,

    /// How many sub-products receive a "(Top K)" label
    pub top_n: usize,

    /// Field delimiter; `None` = sniff from the header line
    pub delimiter: Option<u8>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            province: TARGET_PROVINCE.to_string(),
            top_n: DEFAULT_TOP_N,
            delimiter: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults with the input path override from the environment applied
    pub fn from_env() -> Self {
        Self::default().with_input_override(env::var(INPUT_PATH_ENV).ok())
    }

    /// Apply an input path override; a blank value is ignored
    pub fn with_input_override(mut self, input: Option<String>) -> Self {
        if let Some(path) = input.filter(|p| !p.trim().is_empty()) {
            self.input_path = PathBuf::from(path.trim());
        }
        self
    }

    /// Builder pattern: write the document somewhere else
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Builder pattern: force a delimiter instead of sniffing
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}
