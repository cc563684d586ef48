//! Client-side state and sync logic for the todo service.
//!
//! # Overview
//! Keeps an in-memory todo list consistent with a remote CRUD store while
//! several independently failing requests are in flight.
//!
//! # Design
//! - `TodoClient` is stateless: `build_*` produces requests, `parse_*`
//!   consumes responses. The network sits behind the `Transport` trait, so
//!   the core performs no I/O of its own (host-does-IO).
//! - `RemoteClient` adds the fixed request delay and collapses every failure
//!   into one uniform `RemoteError`.
//! - `SyncCore` owns the list, the in-flight set, the pending-add
//!   placeholder and the current error, and reconciles remote results.
//! - `ItemEditor` is the per-item display/edit state machine.
//! - `view` holds the pure derived state the presentation layer renders.

pub mod client;
pub mod editor;
pub mod error;
pub mod http;
pub mod remote;
pub mod sync;
pub mod transport;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use editor::{CommitIntent, EditorState, ItemEditor};
pub use error::{ApiError, Operation, RemoteError, SyncError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use remote::{RemoteClient, REQUEST_DELAY};
pub use sync::{ClearOutcome, SyncCore};
pub use transport::Transport;
pub use types::{CreateTodo, Todo, TodoId, UpdateTodo, UserId};
pub use view::{Counts, FilterMode, ParseFilterError, ViewState};
