//! Per-entry outcomes of a seeding run.
//!
//! The loader logs as it goes; the report keeps the same information in a
//! form callers and tests can inspect.

use std::fmt;

/// Why an entry was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    FileNotFound,
    Unreadable,
    InvalidJson,
    NotArray,
    /// A record did not match the collection's row shape.
    Schema,
    /// Name did not resolve to a collection handle.
    Unresolved,
    /// The store call itself failed.
    Store,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FileNotFound => "file not found",
            Self::Unreadable => "unreadable file",
            Self::InvalidJson => "invalid json",
            Self::NotArray => "not an array",
            Self::Schema => "schema mismatch",
            Self::Unresolved => "unresolved collection",
            Self::Store => "store error",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cleared { rows: u64 },
    Skipped { reason: SkipReason, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Seeded { rows: u64 },
    Skipped { reason: SkipReason, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEntry {
    pub name: String,
    pub outcome: DeleteOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertEntry {
    pub file: String,
    pub outcome: InsertOutcome,
}

/// Outcomes of both phases, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub deletes: Vec<DeleteEntry>,
    pub inserts: Vec<InsertEntry>,
}

impl SeedReport {
    pub(super) fn cleared(&mut self, name: &str, rows: u64) {
        self.deletes.push(DeleteEntry {
            name: name.to_string(),
            outcome: DeleteOutcome::Cleared { rows },
        });
    }

    pub(super) fn delete_skipped(&mut self, name: &str, reason: SkipReason, message: String) {
        self.deletes.push(DeleteEntry {
            name: name.to_string(),
            outcome: DeleteOutcome::Skipped { reason, message },
        });
    }

    pub(super) fn seeded(&mut self, file: &str, rows: u64) {
        self.inserts.push(InsertEntry {
            file: file.to_string(),
            outcome: InsertOutcome::Seeded { rows },
        });
    }

    pub(super) fn insert_skipped(&mut self, file: &str, reason: SkipReason, message: String) {
        self.inserts.push(InsertEntry {
            file: file.to_string(),
            outcome: InsertOutcome::Skipped { reason, message },
        });
    }

    /// Files whose rows were inserted.
    pub fn seeded_files(&self) -> Vec<&str> {
        self.inserts
            .iter()
            .filter(|entry| matches!(entry.outcome, InsertOutcome::Seeded { .. }))
            .map(|entry| entry.file.as_str())
            .collect()
    }

    /// Insert-phase entries skipped for `reason`.
    pub fn skipped_for(&self, reason: SkipReason) -> Vec<&str> {
        self.inserts
            .iter()
            .filter(|entry| {
                matches!(&entry.outcome, InsertOutcome::Skipped { reason: r, .. } if *r == reason)
            })
            .map(|entry| entry.file.as_str())
            .collect()
    }

    pub fn failed_deletes(&self) -> Vec<&str> {
        self.deletes
            .iter()
            .filter(|entry| matches!(entry.outcome, DeleteOutcome::Skipped { .. }))
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// One-line summary for the end of a run.
    pub fn summary(&self) -> String {
        let seeded = self.seeded_files().len();
        let skipped = self.inserts.len() - seeded;
        let rows: u64 = self
            .inserts
            .iter()
            .map(|entry| match entry.outcome {
                InsertOutcome::Seeded { rows } => rows,
                InsertOutcome::Skipped { .. } => 0,
            })
            .sum();
        format!(
            "{seeded} seeded ({rows} rows), {skipped} skipped, {} delete failures",
            self.failed_deletes().len()
        )
    }
}
