// Tab rail shared type definitions
// Each submodule defines types used across the coordinator, the hosts and the overlay client.

pub mod errors;
pub mod overlay;
pub mod protocol;
pub mod settings;
pub mod tab;
