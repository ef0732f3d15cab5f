//! The table store.
//!
//! Tables refer to each other by name only, so the store is the single
//! owner of every table. Tables are held behind `Arc` which makes cloning
//! the store a cheap snapshot: a resolution working from a snapshot never
//! sees a reload that happens while it runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::table::Table;

/// All loaded tables, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TableStore {
    tables: BTreeMap<String, Arc<Table>>,
}

impl TableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, returning the table it replaced if the name was taken.
    pub fn put(&mut self, table: Table) -> Option<Arc<Table>> {
        self.tables.insert(table.name().to_string(), Arc::new(table))
    }

    /// Look up a table by name.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name).map(Arc::as_ref)
    }

    /// Look up a table by name, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<&Table> {
        self.get(name).or_else(|| {
            self.tables
                .values()
                .map(Arc::as_ref)
                .find(|t| t.name().eq_ignore_ascii_case(name))
        })
    }

    /// True if a table with this exact name is loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Every table, sorted by name.
    pub fn all(&self) -> impl Iterator<Item = &Table> {
        self.tables.values().map(Arc::as_ref)
    }

    /// Tables whose group matches `group` (ASCII case-insensitive).
    pub fn in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Table> + 'a {
        self.all()
            .filter(move |t| t.group().is_some_and(|g| g.eq_ignore_ascii_case(group)))
    }

    /// A read-only copy sharing the same tables.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True if no tables are loaded.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<Table> for TableStore {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut store = Self::new();
        for table in iter {
            store.put(table);
        }
        store
    }
}
