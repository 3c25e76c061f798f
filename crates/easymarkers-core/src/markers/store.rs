//! Ordered marker collection with sidecar persistence
//!
//! Markers are kept in insertion order (not sorted by time) and addressed
//! by [`MarkerId`] handles. Ids are handed out from a monotonic counter and
//! never reused, so an id held across a removal reliably reports
//! `NotFound` instead of silently aliasing a newer marker.
//!
//! Persistence policy: every structural change (add, rename, remove) writes
//! the sidecar. Loading never writes. Without a sidecar path the store is
//! purely in-memory for the session.

use std::fmt;
use std::path::{Path, PathBuf};

use super::sidecar;
use super::storage::{FileStorage, SidecarStorage};
use crate::error::{MarkerError, MarkerResult, ParseError, PersistError};

/// Stable handle to a marker in a [`MarkerStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A user-authored annotation at a time offset
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Offset from the start of the audio in seconds (never negative)
    pub time: f64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
struct Entry {
    id: MarkerId,
    marker: Marker,
}

pub struct MarkerStore {
    entries: Vec<Entry>,
    next_id: u64,
    /// Sidecar for the current resource; `None` disables persistence
    sidecar: Option<PathBuf>,
    storage: Box<dyn SidecarStorage>,
    /// Last write failure, kept until the caller collects it
    persist_warning: Option<PersistError>,
}

impl MarkerStore {
    /// Create an empty store persisting through `storage`
    pub fn new(storage: impl SidecarStorage + 'static) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            sidecar: None,
            storage: Box::new(storage),
            persist_warning: None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Resource binding
    // ═══════════════════════════════════════════════════════════════════════

    /// Bind the store to a new resource's sidecar and load it
    ///
    /// Markers from the previous resource are dropped first, so a resource
    /// without a sidecar (or with an unreadable one) starts empty.
    pub fn attach(&mut self, sidecar: Option<PathBuf>) -> MarkerResult<()> {
        self.entries.clear();
        self.persist_warning = None;
        self.sidecar = sidecar;
        self.load_sidecar()
    }

    pub fn sidecar_path(&self) -> Option<&Path> {
        self.sidecar.as_deref()
    }

    /// Read the bound sidecar and replace the markers with its content
    ///
    /// A missing sidecar is not an error (nothing has been saved yet). Read
    /// and parse failures leave the current markers untouched.
    pub fn load_sidecar(&mut self) -> MarkerResult<()> {
        let Some(path) = self.sidecar.clone() else {
            log::debug!("load_sidecar: No sidecar path, persistence disabled");
            return Ok(());
        };

        let bytes = self
            .storage
            .read(&path)
            .map_err(|source| PersistError::Read {
                path: path.clone(),
                source,
            })?;

        match bytes {
            Some(bytes) => {
                self.load(&bytes)?;
                log::info!(
                    "load_sidecar: Loaded {} markers from {:?}",
                    self.entries.len(),
                    path
                );
            }
            None => log::debug!("load_sidecar: No sidecar at {:?}", path),
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Serialization
    // ═══════════════════════════════════════════════════════════════════════

    /// Replace all markers with those parsed from `source`
    ///
    /// On failure the existing markers are left exactly as they were.
    pub fn load(&mut self, source: &[u8]) -> Result<(), ParseError> {
        let markers = sidecar::decode(source)?;

        let entries: Vec<Entry> = markers
            .into_iter()
            .map(|marker| Entry {
                id: self.allocate_id(),
                marker,
            })
            .collect();
        self.entries = entries;
        Ok(())
    }

    /// Sidecar document for the current markers, in order
    pub fn serialize(&self) -> Vec<u8> {
        sidecar::encode(self.entries.iter().map(|entry| &entry.marker)).into_bytes()
    }

    /// Write the sidecar now
    ///
    /// Does nothing (successfully) when no sidecar path is bound.
    pub fn save(&mut self) -> Result<(), PersistError> {
        let Some(path) = self.sidecar.as_deref() else {
            return Ok(());
        };

        let contents = sidecar::encode(self.entries.iter().map(|entry| &entry.marker));
        self.storage
            .write(path, contents.as_bytes())
            .map_err(|source| PersistError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!("save: Wrote {} markers to {:?}", self.entries.len(), path);
        Ok(())
    }

    /// Take the last sidecar write failure, if any
    pub fn take_persist_warning(&mut self) -> Option<PersistError> {
        self.persist_warning.take()
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            log::warn!("persist: {}", e);
            self.persist_warning = Some(e);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Editing
    // ═══════════════════════════════════════════════════════════════════════

    /// Append a marker and persist
    ///
    /// Negative or non-finite times are clamped to 0.
    pub fn add(
        &mut self,
        time: f64,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> MarkerId {
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        let id = self.allocate_id();
        self.entries.push(Entry {
            id,
            marker: Marker {
                time,
                title: title.into(),
                description: description.into(),
            },
        });
        log::debug!("add: Marker {} at {:.3}s", id, time);

        self.persist();
        id
    }

    /// Replace a marker's title and persist
    pub fn rename(&mut self, id: MarkerId, title: impl Into<String>) -> MarkerResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(MarkerError::NotFound(id))?;
        entry.marker.title = title.into();

        self.persist();
        Ok(())
    }

    /// Delete a marker and persist, returning what was removed
    pub fn remove(&mut self, id: MarkerId) -> MarkerResult<Marker> {
        let index = self
            .position(id)
            .ok_or(MarkerError::NotFound(id))?;
        let entry = self.entries.remove(index);
        log::debug!("remove: Marker {} ({:?})", id, entry.marker.title);

        self.persist();
        Ok(entry.marker)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.marker)
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.position(id).is_some()
    }

    /// Markers with their ids, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, &Marker)> + '_ {
        self.entries.iter().map(|entry| (entry.id, &entry.marker))
    }

    pub fn ids(&self) -> Vec<MarkerId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: MarkerId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn allocate_id(&mut self) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for MarkerStore {
    fn default() -> Self {
        Self::new(FileStorage)
    }
}

impl fmt::Debug for MarkerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerStore")
            .field("markers", &self.entries.len())
            .field("next_id", &self.next_id)
            .field("sidecar", &self.sidecar)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::MemoryStorage;

    const SIDECAR: &str = "/music/take.wav.easymarkers";

    fn attached_store() -> (MarkerStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        let mut store = MarkerStore::new(storage.clone());
        store.attach(Some(PathBuf::from(SIDECAR))).unwrap();
        (store, storage)
    }

    fn titles(store: &MarkerStore) -> Vec<String> {
        store.iter().map(|(_, m)| m.title.clone()).collect()
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut store = MarkerStore::new(MemoryStorage::new());
        store.add(90.0, "B", "");
        store.add(10.0, "A", "");
        store.add(50.0, "C", "");
        assert_eq!(titles(&store), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_add_clamps_negative_time() {
        let mut store = MarkerStore::new(MemoryStorage::new());
        let id = store.add(-3.0, "early", "");
        assert_eq!(store.get(id).unwrap().time, 0.0);
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut store = MarkerStore::new(MemoryStorage::new());
        let a = store.add(5.0, "same", "");
        let b = store.add(5.0, "same", "");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rename_updates_title_only() {
        let mut store = MarkerStore::new(MemoryStorage::new());
        let id = store.add(5.0, "old", "note");
        store.rename(id, "new").unwrap();
        let marker = store.get(id).unwrap();
        assert_eq!(marker.title, "new");
        assert_eq!(marker.description, "note");
        assert_eq!(marker.time, 5.0);
    }

    #[test]
    fn test_stale_id_not_found() {
        let mut store = MarkerStore::new(MemoryStorage::new());
        let id = store.add(5.0, "gone", "");
        store.remove(id).unwrap();

        assert!(matches!(store.rename(id, "x"), Err(MarkerError::NotFound(i)) if i == id));
        assert!(matches!(store.remove(id), Err(MarkerError::NotFound(_))));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut store = MarkerStore::new(MemoryStorage::new());
        let first = store.add(1.0, "a", "");
        store.remove(first).unwrap();
        let second = store.add(1.0, "b", "");
        assert_ne!(first, second);
        assert!(!store.contains(first));
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut store = MarkerStore::new(MemoryStorage::new());
        store.add(1.0, "a", "");
        let b = store.add(2.0, "b", "");
        store.add(3.0, "c", "");
        let removed = store.remove(b).unwrap();
        assert_eq!(removed.title, "b");
        assert_eq!(titles(&store), vec!["a", "c"]);
    }

    #[test]
    fn test_load_malformed_leaves_markers_unchanged() {
        let mut store = MarkerStore::new(MemoryStorage::new());
        store.add(1.0, "a", "x");
        store.add(2.0, "b", "y");
        let before = store.serialize();
        let ids_before = store.ids();

        assert!(store.load(b"<Markers><Marker Title=\"no time\"/></Markers>").is_err());
        assert!(store.load(b"not xml at all <").is_err());
        assert!(store.load(b"<Other/>").is_err());

        assert_eq!(store.serialize(), before);
        assert_eq!(store.ids(), ids_before);
    }

    #[test]
    fn test_serialize_load_round_trip() {
        let mut store = MarkerStore::new(MemoryStorage::new());
        store.add(12.5, "Intro", "*No Comment*");
        store.add(3.0, "Verse & Chorus", "a \"quoted\" <note>");
        store.add(3.0, "Verse & Chorus", "");

        let mut reloaded = MarkerStore::new(MemoryStorage::new());
        reloaded.load(&store.serialize()).unwrap();

        let original: Vec<Marker> = store.iter().map(|(_, m)| m.clone()).collect();
        let restored: Vec<Marker> = reloaded.iter().map(|(_, m)| m.clone()).collect();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_mutations_persist() {
        let (mut store, storage) = attached_store();
        let path = Path::new(SIDECAR);
        assert!(storage.get(path).is_none());

        let id = store.add(12.5, "Intro", "*No Comment*");
        let written = String::from_utf8(storage.get(path).unwrap()).unwrap();
        assert!(written.contains("Title=\"Intro\""));

        store.rename(id, "Opening").unwrap();
        let written = String::from_utf8(storage.get(path).unwrap()).unwrap();
        assert!(written.contains("Title=\"Opening\""));

        store.remove(id).unwrap();
        let written = String::from_utf8(storage.get(path).unwrap()).unwrap();
        assert!(written.ends_with("<Markers/>\n"));
    }

    #[test]
    fn test_no_sidecar_skips_persistence() {
        let storage = MemoryStorage::new();
        let mut store = MarkerStore::new(storage.clone());
        store.attach(None).unwrap();

        let id = store.add(1.0, "a", "");
        store.rename(id, "b").unwrap();
        store.remove(id).unwrap();

        assert!(storage.is_empty());
        assert!(store.take_persist_warning().is_none());
    }

    #[test]
    fn test_attach_loads_existing_sidecar() {
        let storage = MemoryStorage::new();
        storage.insert(
            SIDECAR,
            r#"<Markers><Marker Time="4" Title="Hook" Desc="big"/></Markers>"#,
        );
        let mut store = MarkerStore::new(storage);

        store.attach(Some(PathBuf::from(SIDECAR))).unwrap();

        assert_eq!(titles(&store), vec!["Hook"]);
    }

    #[test]
    fn test_attach_clears_previous_resource() {
        let (mut store, _storage) = attached_store();
        store.add(1.0, "old resource", "");

        store.attach(Some(PathBuf::from("/music/other.wav.easymarkers"))).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn test_attach_corrupt_sidecar_reports_parse_error() {
        let storage = MemoryStorage::new();
        storage.insert(SIDECAR, "<Markers><Marker");
        let mut store = MarkerStore::new(storage.clone());

        let result = store.attach(Some(PathBuf::from(SIDECAR)));

        assert!(matches!(result, Err(MarkerError::Parse(_))));
        assert!(store.is_empty());
        // Corrupt file is left alone until the next edit
        assert_eq!(storage.get(Path::new(SIDECAR)).unwrap(), b"<Markers><Marker".to_vec());
    }

    #[test]
    fn test_write_failure_latches_warning_and_keeps_state() {
        let mut store = MarkerStore::new(MemoryStorage::failing());
        store.attach(Some(PathBuf::from(SIDECAR))).unwrap();

        let id = store.add(2.0, "kept", "");

        assert_eq!(store.get(id).unwrap().title, "kept");
        assert!(matches!(
            store.take_persist_warning(),
            Some(PersistError::Write { .. })
        ));
        assert!(store.take_persist_warning().is_none());
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = dir.path().join("take.wav.easymarkers");

        let mut store = MarkerStore::default();
        store.attach(Some(sidecar.clone())).unwrap();
        store.add(10.0, "A", "");
        store.add(90.0, "B", "");

        let mut reopened = MarkerStore::default();
        reopened.attach(Some(sidecar)).unwrap();
        assert_eq!(titles(&reopened), vec!["A", "B"]);
    }
}
