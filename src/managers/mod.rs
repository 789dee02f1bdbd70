// Tab rail state managers
// Managers own the coordinator's state: the snapshot cache, the broadcast debouncer and the overlay registry.

pub mod broadcast_scheduler;
pub mod overlay_registry;
pub mod snapshot_cache;
