//! Shared async service handle and event stream APIs.

/// Event stream types emitted by the service.
pub mod events;
/// Handle, configuration, and operation implementations.
pub mod handle;
