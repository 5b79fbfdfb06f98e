use log::debug;
use roll_audit::AuditRules;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;

use crate::audit::report::AuditResultFile;
use crate::audit::*;

pub const DEFAULT_FIRST_DATA_ROW: usize = 2;
pub const DEFAULT_PREVIEW_COUNT: usize = 10;
pub const DEFAULT_CONTENT_MAX_CHARS: usize = 200;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSettings {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "firstDataRowIndex")]
    _first_data_row_index: Option<JSValue>,
}

impl InputSettings {
    /// The 1-based number of the first data row. The rows above it are headers.
    pub fn first_data_row_index(&self) -> AuditResult<usize> {
        match read_js_int(&self._first_data_row_index, "firstDataRowIndex")? {
            Some(0) => ParsingJsonNumberSnafu {
                field: "firstDataRowIndex",
            }
            .fail(),
            Some(x) => Ok(x),
            None => Ok(DEFAULT_FIRST_DATA_ROW),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSettings {
    #[serde(rename = "junkKeywords")]
    pub junk_keywords: Option<Vec<String>>,
    #[serde(rename = "minIdDigits")]
    pub min_id_digits: Option<JSValue>,
    #[serde(rename = "maxIdDigits")]
    pub max_id_digits: Option<JSValue>,
    #[serde(rename = "shortRowThreshold")]
    pub short_row_threshold: Option<JSValue>,
    #[serde(rename = "minNameLength")]
    pub min_name_length: Option<JSValue>,
    #[serde(rename = "idHeaderKeywords")]
    pub id_header_keywords: Option<Vec<String>>,
}

impl RulesSettings {
    /// The default rules, overridden by the values present in the file.
    pub fn to_rules(&self) -> AuditResult<AuditRules> {
        let defaults = AuditRules::default();
        Ok(AuditRules {
            junk_keywords: self
                .junk_keywords
                .clone()
                .unwrap_or(defaults.junk_keywords),
            min_id_digits: read_js_int(&self.min_id_digits, "minIdDigits")?
                .map_or(defaults.min_id_digits, |x| x as u32),
            max_id_digits: read_js_int(&self.max_id_digits, "maxIdDigits")?
                .map_or(defaults.max_id_digits, |x| x as u32),
            short_row_threshold: read_js_int(&self.short_row_threshold, "shortRowThreshold")?
                .unwrap_or(defaults.short_row_threshold),
            min_name_length: read_js_int(&self.min_name_length, "minNameLength")?
                .unwrap_or(defaults.min_name_length),
            id_header_keywords: self
                .id_header_keywords
                .clone()
                .unwrap_or(defaults.id_header_keywords),
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "previewCount")]
    _preview_count: Option<JSValue>,
    #[serde(rename = "contentMaxChars")]
    _content_max_chars: Option<JSValue>,
}

impl OutputSettings {
    pub fn preview_count(&self) -> AuditResult<usize> {
        Ok(read_js_int(&self._preview_count, "previewCount")?.unwrap_or(DEFAULT_PREVIEW_COUNT))
    }

    pub fn content_max_chars(&self) -> AuditResult<usize> {
        Ok(read_js_int(&self._content_max_chars, "contentMaxChars")?
            .unwrap_or(DEFAULT_CONTENT_MAX_CHARS))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(rename = "inputSettings", default)]
    pub input_settings: InputSettings,
    #[serde(default)]
    pub rules: RulesSettings,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
}

pub fn read_config(path: &str) -> BAuditResult<AuditConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: AuditConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_reference(path: &str) -> BAuditResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Reads a result file written by a previous audit.
pub fn read_result_file(path: &str) -> BAuditResult<AuditResultFile> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let res: AuditResultFile =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(res)
}

/// Reads a non-negative integer given either as a JSON number or as a string.
fn read_js_int(x: &Option<JSValue>, field: &str) -> AuditResult<Option<usize>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| Some(x as usize))
            .context(ParsingJsonNumberSnafu { field }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        _ => ParsingJsonNumberSnafu { field }.fail(),
    }
}
