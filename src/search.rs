use crate::model::Record;
use crate::results::Index;

/// One search match: the record's identifier and its size.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hit {
    pub identifier: String,
    pub size_bytes: u64,
}

impl From<&Record> for Hit {
    fn from(record: &Record) -> Self {
        Self {
            identifier: record.identifier(),
            size_bytes: record.size_bytes,
        }
    }
}

/// Case-insensitive substring search over record names.
///
/// Borrows a finished [`Index`] and never mutates it, so repeated queries
/// always see the same data.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    index: &'a Index,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self { index }
    }

    /// Every record whose name contains `query`, ignoring case.
    ///
    /// An empty query matches nothing. Hits are sorted by identifier.
    pub fn search(&self, query: &str) -> Vec<Hit> {
        if query.is_empty() {
            return Vec::new();
        }

        let needle = query.to_uppercase();
        let mut hits: Vec<Hit> = self
            .index
            .records()
            .filter(|record| record.name.to_uppercase().contains(&needle))
            .map(Hit::from)
            .collect();

        hits.sort();
        hits
    }
}
