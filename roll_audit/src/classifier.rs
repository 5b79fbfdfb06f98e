use log::debug;
use regex::Regex;

use crate::config::*;

/// Joins the non-null cells of a row, each trimmed, with single spaces.
pub fn row_line(cells: &[Option<String>]) -> String {
    cells
        .iter()
        .filter_map(|c| c.as_ref().map(|s| s.trim()))
        .collect::<Vec<&str>>()
        .join(" ")
}

/// True when every cell is null or only holds whitespace.
pub fn is_blank_row(cells: &[Option<String>]) -> bool {
    cells
        .iter()
        .all(|c| c.as_ref().map_or(true, |s| s.trim().is_empty()))
}

/// Classifies rows according to a fixed set of rules.
///
/// The checks are applied in order: empty, junk keyword, short row and
/// finally the search for an identity number. The result only depends on the
/// content of the row, so the same classifier can be reused across sheets.
///
/// ```
/// use roll_audit::{AuditRules, RowClassifier, RowOutcome};
/// # use roll_audit::AuditErrors;
///
/// let classifier = RowClassifier::new(&AuditRules::default())?;
/// let res = classifier.classify(&[
///     Some("Nguyen Van A".to_string()),
///     Some("079123456789".to_string()),
///     Some("Ha Noi".to_string()),
/// ]);
/// match res.outcome {
///     RowOutcome::Valid(m) => assert_eq!(m.id, "079123456789"),
///     x => panic!("unexpected outcome {:?}", x),
/// }
/// # Ok::<(), AuditErrors>(())
/// ```
#[derive(Debug, Clone)]
pub struct RowClassifier {
    // Keywords paired with their lower-cased form.
    junk_keywords: Vec<(String, String)>,
    short_row_threshold: usize,
    min_name_length: usize,
    id_search: Regex,
    id_whole: Regex,
}

impl RowClassifier {
    pub fn new(rules: &AuditRules) -> Result<RowClassifier, AuditErrors> {
        let (min, max) = (rules.min_id_digits, rules.max_id_digits);
        if min == 0 || min > max {
            return Err(AuditErrors::InvalidIdDigits { min, max });
        }
        if rules.junk_keywords.iter().any(|kw| kw.trim().is_empty()) {
            return Err(AuditErrors::EmptyJunkKeyword);
        }
        let id_search = Regex::new(&format!(r"\b\d{{{},{}}}\b", min, max))
            .map_err(|e| AuditErrors::InvalidPattern(e.to_string()))?;
        let id_whole = Regex::new(&format!(r"^\d{{{},{}}}$", min, max))
            .map_err(|e| AuditErrors::InvalidPattern(e.to_string()))?;
        Ok(RowClassifier {
            junk_keywords: rules
                .junk_keywords
                .iter()
                .map(|kw| (kw.clone(), kw.to_lowercase()))
                .collect(),
            short_row_threshold: rules.short_row_threshold,
            min_name_length: rules.min_name_length,
            id_search,
            id_whole,
        })
    }

    pub fn classify(&self, cells: &[Option<String>]) -> ClassifiedRow {
        if is_blank_row(cells) {
            return ClassifiedRow {
                line: String::new(),
                outcome: RowOutcome::Empty,
            };
        }
        let line = row_line(cells);
        let outcome = self.classify_line(&line);
        debug!("classify: {:?} -> {:?}", line, outcome);
        ClassifiedRow { line, outcome }
    }

    fn classify_line(&self, line: &str) -> RowOutcome {
        if let Some(keyword) = self.junk_keyword(line) {
            return RowOutcome::Junk {
                keyword: keyword.to_string(),
            };
        }
        if line.trim().chars().count() < self.short_row_threshold {
            return RowOutcome::Short;
        }
        match self.find_identity(line) {
            Some(m) => RowOutcome::Valid(m),
            None => RowOutcome::MissingId,
        }
    }

    /// The first configured keyword contained in the line, ignoring case.
    pub fn junk_keyword(&self, line: &str) -> Option<&str> {
        let lowered = line.to_lowercase();
        self.junk_keywords
            .iter()
            .find(|(_, kw)| lowered.contains(kw.as_str()))
            .map(|(kw, _)| kw.as_str())
    }

    /// The leftmost identity number of the line and the text before it.
    pub fn find_identity(&self, line: &str) -> Option<IdentityMatch> {
        let m = self.id_search.find(line)?;
        let name = line[..m.start()].trim().to_string();
        let missing_name = name.chars().count() < self.min_name_length;
        Some(IdentityMatch {
            id: m.as_str().to_string(),
            name,
            missing_name,
        })
    }

    /// True when the whole (trimmed) text is an identity number.
    pub fn is_identity(&self, text: &str) -> bool {
        self.id_whole.is_match(text.trim())
    }
}
