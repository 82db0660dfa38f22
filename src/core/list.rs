// thumbview - core/list.rs
//
// In-memory list model: the rows a thumbnail view displays.
//
// Rows are addressed two ways:
//   - by index, which is what the view's visible range talks about and which
//     shifts whenever rows are removed or reordered;
//   - by `RowKey`, which is stable for the life of the row and is what the
//     pipeline carries across threads.
//
// Keys are drawn from a counter that `clear()` does not reset, so a key held
// by an in-flight render can never resolve to a row loaded later.

use crate::core::model::{RowHandle, RowKey, RowModel, Thumbnail};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One entry of the list together with its thumbnail state.
#[derive(Debug)]
pub struct Row {
    key: RowKey,
    path: PathBuf,
    name: String,
    requested: bool,
    thumbnail: Option<Thumbnail>,
}

impl Row {
    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name (the file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once a render has been queued for this row.
    pub fn requested(&self) -> bool {
        self.requested
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }
}

/// Ordered collection of rows with stable keys.
#[derive(Debug, Default)]
pub struct ThumbnailList {
    rows: Vec<Row>,
    positions: HashMap<RowKey, usize>,
    next_key: u64,
}

impl ThumbnailList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from file paths, in the given order.
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut list = Self::new();
        for path in paths {
            list.push(path);
        }
        list
    }

    /// Append a row for `path` and return its key.
    pub fn push(&mut self, path: PathBuf) -> RowKey {
        let key = RowKey(self.next_key);
        self.next_key += 1;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.positions.insert(key, self.rows.len());
        self.rows.push(Row {
            key,
            path,
            name,
            requested: false,
            thumbnail: None,
        });
        key
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Row with `key`, if it still exists.
    pub fn row(&self, key: RowKey) -> Option<&Row> {
        self.positions.get(&key).map(|&idx| &self.rows[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Remove the row with `key`. Later rows shift up by one.
    pub fn remove(&mut self, key: RowKey) -> Option<Row> {
        let idx = self.positions.remove(&key)?;
        let row = self.rows.remove(idx);
        self.reindex_from(idx);
        Some(row)
    }

    /// Remove every row. Keys issued so far are never reused.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.positions.clear();
    }

    /// Reorder rows with `compare`. Keys keep pointing at the same rows.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Row, &Row) -> Ordering,
    {
        self.rows.sort_by(|a, b| compare(a, b));
        self.reindex_from(0);
    }

    /// Number of rows that have a thumbnail.
    pub fn rendered_count(&self) -> usize {
        self.rows.iter().filter(|r| r.thumbnail.is_some()).count()
    }

    /// Number of rows a render was requested for.
    pub fn requested_count(&self) -> usize {
        self.rows.iter().filter(|r| r.requested).count()
    }

    fn reindex_from(&mut self, start: usize) {
        for (idx, row) in self.rows.iter().enumerate().skip(start) {
            self.positions.insert(row.key, idx);
        }
    }
}

impl RowModel for ThumbnailList {
    fn key_at(&self, index: usize) -> Option<RowKey> {
        self.rows.get(index).map(|r| r.key)
    }

    fn resolve(&self, key: RowKey) -> Option<RowHandle> {
        self.positions.get(&key).copied()
    }

    fn file_path(&self, row: RowHandle) -> PathBuf {
        self.rows[row].path.clone()
    }

    fn is_requested(&self, row: RowHandle) -> bool {
        self.rows[row].requested
    }

    fn set_requested(&mut self, row: RowHandle, requested: bool) {
        self.rows[row].requested = requested;
    }

    fn has_bitmap(&self, row: RowHandle) -> bool {
        self.rows[row].thumbnail.is_some()
    }

    fn set_bitmap(&mut self, row: RowHandle, thumbnail: Thumbnail) {
        self.rows[row].thumbnail = Some(thumbnail);
    }
}
