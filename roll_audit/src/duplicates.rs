use std::collections::HashMap;

/// Tracks on which rows every identity number occurs.
///
/// Identity numbers are compared as strings: `"012345678"` and `"12345678"`
/// are two different numbers. Nothing is ever removed, the first occurrence
/// is simply the one that would be kept by an upload.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DuplicateTracker {
    // Identity numbers in the order they were first seen.
    order: Vec<String>,
    rows: HashMap<String, Vec<usize>>,
}

impl DuplicateTracker {
    pub fn new() -> DuplicateTracker {
        DuplicateTracker::default()
    }

    /// Records an occurrence. Returns true if it is the first one for this number.
    pub fn record(&mut self, id: &str, row: usize) -> bool {
        let id = id.trim();
        match self.rows.get_mut(id) {
            Some(rows) => {
                rows.push(row);
                false
            }
            None => {
                self.order.push(id.to_string());
                self.rows.insert(id.to_string(), vec![row]);
                true
            }
        }
    }

    pub fn occurrences(&self, id: &str) -> &[usize] {
        self.rows
            .get(id.trim())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All the identity numbers, in the order of their first occurrence.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.order
            .iter()
            .map(move |id| (id.as_str(), self.occurrences(id)))
    }

    /// The identity numbers seen more than once, in the order of their first occurrence.
    pub fn duplicates(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.iter().filter(|(_, rows)| rows.len() > 1)
    }

    /// The number of different identity numbers, the duplicated ones included.
    pub fn distinct_count(&self) -> usize {
        self.order.len()
    }

    /// The number of identity numbers seen on exactly one row.
    pub fn single_occurrence_count(&self) -> usize {
        self.rows.values().filter(|rows| rows.len() == 1).count()
    }

    pub fn duplicate_group_count(&self) -> usize {
        self.duplicates().count()
    }

    /// The number of occurrences beyond the first one, over all the numbers.
    pub fn extra_occurrence_count(&self) -> usize {
        self.rows.values().map(|rows| rows.len() - 1).sum()
    }
}
