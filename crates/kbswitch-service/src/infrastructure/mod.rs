//! Infrastructure layer for the switching service.
//!
//! Contains OS-facing adapters: input capture hooks, file-system storage,
//! change notification, and the host bridge collaborators talk to.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `kbswitch_core`. The application layer only reaches into it for plain
//! data types (`RawInputEvent`, `ShortcutsConfig`).

pub mod host_bridge;
pub mod input_capture;
pub mod notify;
pub mod storage;
