//! Application layer use cases for the switching service.
//!
//! Use cases in this layer orchestrate the core types, depend on traits for
//! anything that touches the outside world, and make no OS calls, no file
//! system access and no network I/O.
//!
//! # Sub-modules
//!
//! - **`switch_layout`**     – The layout state machine behind a lock, with
//!   announcing and persisting of every resolved layout.
//! - **`toggle_indicator`**  – Registration and show/hide of the on-screen
//!   indicator.
//! - **`resolve_command`**   – Maps command tokens to chord actions.
//! - **`manage_shortcuts`**  – Keeps the shortcut registry in step with the
//!   configured slot descriptors, and captures new descriptors.
//! - **`handle_input`**      – Runs on every key event: modifier tracking and
//!   dispatch.

pub mod handle_input;
pub mod manage_shortcuts;
pub mod resolve_command;
pub mod switch_layout;
pub mod toggle_indicator;
