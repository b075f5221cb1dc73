//! Record table
//!
//! Records live in an arena in creation order and are referenced by a
//! stable `RecordId`, so a recall response can update the presentation
//! record it belongs to at any later point. Presentation records with an
//! item are also indexed by `(trial, item)`.

use crate::types::{Record, Timestamp};
use std::collections::HashMap;

/// Stable handle to a record in a `RecordTable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(usize);

/// All records produced from one session log
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<Record>,
    /// Key: (trial, item), Value: presentation record of that item
    presentations: HashMap<(String, String), RecordId>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record and return its handle
    pub fn insert(&mut self, record: Record) -> RecordId {
        let id = RecordId(self.records.len());

        if record.is_chest() {
            if let Some(item) = &record.item {
                let key = (record.trial.clone(), item.clone());
                if let Some(existing) = self.presentations.get(&key) {
                    // Recalls keep resolving to the first presentation
                    log::warn!(
                        "Item {:?} presented twice in trial {:?} (at {} and {})",
                        item,
                        record.trial,
                        self.records[existing.0].mstime,
                        record.mstime
                    );
                } else {
                    self.presentations.insert(key, id);
                }
            }
        }

        self.records.push(record);
        id
    }

    pub fn get(&self, id: RecordId) -> &Record {
        &self.records[id.0]
    }

    pub fn get_mut(&mut self, id: RecordId) -> &mut Record {
        &mut self.records[id.0]
    }

    /// Find the presentation record of an item within a trial
    pub fn find_presentation(&self, trial: &str, item: &str) -> Option<RecordId> {
        self.presentations
            .get(&(trial.to_string(), item.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Records ordered by timestamp
    ///
    /// The sort is stable: records sharing a timestamp keep creation order.
    pub fn sorted(&self) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self.records.iter().collect();
        rows.sort_by_key(|record| record.mstime);

        let duplicates: Vec<Timestamp> = rows
            .windows(2)
            .filter(|pair| pair[0].mstime == pair[1].mstime)
            .map(|pair| pair[0].mstime)
            .collect();
        if !duplicates.is_empty() {
            log::warn!(
                "{} records share a timestamp with another record (first at {})",
                duplicates.len(),
                duplicates[0]
            );
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordKind;

    fn chest(mstime: Timestamp, trial: &str, item: Option<&str>) -> Record {
        let mut record = Record::new(mstime, RecordKind::Chest, trial, 0);
        record.item = item.map(str::to_string);
        record
    }

    #[test]
    fn test_presentation_index() {
        let mut table = RecordTable::new();
        let gold = table.insert(chest(100, "1", Some("gold")));
        table.insert(chest(200, "1", None));
        let gold_2 = table.insert(chest(300, "2", Some("gold")));

        assert_eq!(table.find_presentation("1", "gold"), Some(gold));
        assert_eq!(table.find_presentation("2", "gold"), Some(gold_2));
        assert_eq!(table.find_presentation("3", "gold"), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_rec_records_are_not_indexed() {
        let mut table = RecordTable::new();
        let mut rec = Record::new(100, RecordKind::Rec, "1", 0);
        rec.item = Some("gold".into());
        table.insert(rec);
        assert_eq!(table.find_presentation("1", "gold"), None);
    }

    #[test]
    fn test_first_presentation_wins() {
        let mut table = RecordTable::new();
        let first = table.insert(chest(100, "1", Some("gold")));
        table.insert(chest(200, "1", Some("gold")));
        assert_eq!(table.find_presentation("1", "gold"), Some(first));
    }

    #[test]
    fn test_sorted_is_stable() {
        let mut table = RecordTable::new();
        table.insert(chest(300, "1", Some("a")));
        table.insert(chest(100, "1", Some("b")));
        table.insert(chest(300, "1", Some("c")));

        let items: Vec<_> = table
            .sorted()
            .iter()
            .map(|r| r.item.clone().unwrap())
            .collect();
        assert_eq!(items, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_mutation_through_handle() {
        let mut table = RecordTable::new();
        let id = table.insert(chest(100, "1", Some("gold")));
        table.get_mut(id).reaction_time = Some(1500);
        assert_eq!(table.get(id).reaction_time, Some(1500));
    }
}
