
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

use crate::model::QuestionRecord;
use crate::normalize::normalize_key;

/// How the surviving records are ordered inside each partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOrder {
    /// First-seen order of each key.
    Encounter,
    /// Ascending normalized key.
    SortedByKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Upgraded,
    Discarded,
    EmptyKey,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub received: usize,
    pub inserted: usize,
    pub upgrades: usize,
    pub duplicates_discarded: usize,
    pub empty_keys_discarded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedCorpus {
    pub identified: Vec<QuestionRecord>,
    pub unidentified: Vec<QuestionRecord>,
}

/// The upgrade rule: only an identified record displaces an unidentified one.
pub fn should_replace(retained_identified: bool, incoming_identified: bool) -> bool {
    incoming_identified && !retained_identified
}

#[derive(Debug)]
struct RetainedEntry {
    record: QuestionRecord,
    identified: bool,
}

/// Ordered key → retained record map fed one record at a time.
#[derive(Debug, Default)]
pub struct DedupIndex {
    entries: IndexMap<String, RetainedEntry>,
    stats: MergeStats,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: QuestionRecord) -> InsertOutcome {
        self.stats.received += 1;

        let key = normalize_key(&record.question_text);
        if key.is_empty() {
            self.stats.empty_keys_discarded += 1;
            return InsertOutcome::EmptyKey;
        }

        let identified = record.has_identified_correct_answer;
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(RetainedEntry { record, identified });
                self.stats.inserted += 1;
                InsertOutcome::Inserted
            }
            Entry::Occupied(mut slot) => {
                if should_replace(slot.get().identified, identified) {
                    // Replacing in place keeps the key's original position.
                    slot.insert(RetainedEntry { record, identified });
                    self.stats.upgrades += 1;
                    InsertOutcome::Upgraded
                } else {
                    self.stats.duplicates_discarded += 1;
                    InsertOutcome::Discarded
                }
            }
        }
    }

    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    pub fn into_partitions(self, order: MergeOrder) -> PartitionedCorpus {
        let mut entries = self.entries;
        if order == MergeOrder::SortedByKey {
            entries.sort_keys();
        }

        let mut corpus = PartitionedCorpus::default();
        for (_, entry) in entries {
            if entry.identified {
                corpus.identified.push(entry.record);
            } else {
                corpus.unidentified.push(entry.record);
            }
        }
        corpus
    }
}

pub fn merge_records<I>(records: I, order: MergeOrder) -> (PartitionedCorpus, MergeStats)
where
    I: IntoIterator<Item = QuestionRecord>,
{
    let mut index = DedupIndex::new();
    for record in records {
        index.insert(record);
    }
    let stats = index.stats();
    (index.into_partitions(order), stats)
}
