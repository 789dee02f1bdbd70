use crate::types::tab::{HostWindow, Snapshot};

/// Holds the most recently built snapshot.
///
/// Every store replaces the previous snapshot wholesale; the generation
/// counter only tells callers whether anything has been stored since they
/// last looked.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    current: Snapshot,
    generation: u64,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens the host's windows into one ordered snapshot and caches it.
    pub fn store_windows(&mut self, windows: Vec<HostWindow>) -> &Snapshot {
        self.store(Snapshot::from_windows(windows))
    }

    pub fn store(&mut self, snapshot: Snapshot) -> &Snapshot {
        self.current = snapshot;
        self.generation += 1;
        &self.current
    }

    /// The last stored snapshot, empty before the first store.
    pub fn get(&self) -> &Snapshot {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
