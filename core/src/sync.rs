//! The synchronization core: one source of truth for the todo list.
//!
//! # Design
//! `SyncCore` owns the list, the set of ids with a request in flight, the
//! pending-add placeholder, the current error and the filter. Intents take
//! `&self` so several can be in flight at once on a single thread; state
//! lives in a `RefCell` and no borrow is ever held across an `.await`.
//!
//! The list only changes once the remote store has confirmed an operation.
//! The placeholder shown while a create is in flight is the one exception,
//! and it lives outside the list.
//!
//! Batch intents dispatch their requests concurrently and wait for all of
//! them to settle before reconciling:
//! - `clear_completed` keeps whatever succeeded (partial commit).
//! - `toggle_all` commits only if every update succeeded (all or nothing).

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::remote::RemoteClient;
use crate::transport::Transport;
use crate::types::{CreateTodo, Todo, TodoId, UpdateTodo, UserId};
use crate::view::{filter_todos, Counts, FilterMode, ViewState};

/// Result of a clear-completed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    pub removed: Vec<TodoId>,
    pub failed: Vec<TodoId>,
}

impl ClearOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Default)]
struct State {
    todos: Vec<Todo>,
    processing: BTreeSet<TodoId>,
    pending_title: Option<String>,
    error: Option<SyncError>,
    filter: FilterMode,
}

impl State {
    fn fail(&mut self, error: SyncError) -> SyncError {
        warn!(%error, "surfacing error");
        self.error = Some(error);
        error
    }

    fn lists(&self, id: TodoId) -> bool {
        self.todos.iter().any(|todo| todo.id == id)
    }

    fn replace(&mut self, updated: Todo) {
        match self.todos.iter_mut().find(|todo| todo.id == updated.id) {
            Some(slot) => *slot = updated,
            None => debug!(id = updated.id, "update resolved for a todo no longer listed"),
        }
    }
}

pub struct SyncCore<T> {
    remote: RemoteClient<T>,
    user_id: UserId,
    state: RefCell<State>,
}

impl<T: Transport> SyncCore<T> {
    pub fn new(remote: RemoteClient<T>, user_id: UserId) -> Self {
        Self {
            remote,
            user_id,
            state: RefCell::new(State::default()),
        }
    }

    pub fn remote(&self) -> &RemoteClient<T> {
        &self.remote
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Populates the list from the remote store.
    pub async fn load(&self) -> Result<(), SyncError> {
        match self.remote.fetch_all(self.user_id).await {
            Ok(todos) => {
                info!(count = todos.len(), "loaded todos");
                self.state.borrow_mut().todos = todos;
                Ok(())
            }
            Err(_) => Err(self.state.borrow_mut().fail(SyncError::Load)),
        }
    }

    /// Creates a todo from `title`, appending it once the store confirms.
    ///
    /// A blank title is rejected without a remote call. On failure the error
    /// is returned so the input form can keep the user's text.
    pub async fn add(&self, title: &str) -> Result<Todo, SyncError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(self.state.borrow_mut().fail(SyncError::EmptyTitle));
        }

        let input = CreateTodo {
            title: title.to_string(),
            completed: false,
            user_id: self.user_id,
        };
        self.state.borrow_mut().pending_title = Some(input.title.clone());
        let result = self.remote.create(&input).await;

        let mut state = self.state.borrow_mut();
        state.pending_title = None;
        match result {
            Ok(todo) => {
                info!(id = todo.id, "added todo");
                state.todos.push(todo.clone());
                Ok(todo)
            }
            Err(_) => Err(state.fail(SyncError::Add)),
        }
    }

    /// Deletes a listed todo. Ids missing from the list are rejected without
    /// a remote call.
    pub async fn delete(&self, id: TodoId) -> Result<(), SyncError> {
        {
            let mut state = self.state.borrow_mut();
            if !state.lists(id) {
                debug!(id, "delete of a todo that is not listed");
                return Err(state.fail(SyncError::Delete));
            }
            state.processing.insert(id);
        }
        let result = self.remote.delete(id).await;

        let mut state = self.state.borrow_mut();
        state.processing.remove(&id);
        match result {
            Ok(()) => {
                info!(id, "deleted todo");
                state.todos.retain(|todo| todo.id != id);
                Ok(())
            }
            Err(_) => Err(state.fail(SyncError::Delete)),
        }
    }

    /// Applies `changes` remotely and adopts the server's copy of the todo.
    ///
    /// Only listed todos can be edited, and a new title is trimmed and must
    /// not be empty. Rejected edits never reach the remote store.
    pub async fn edit(&self, id: TodoId, mut changes: UpdateTodo) -> Result<Todo, SyncError> {
        {
            let mut state = self.state.borrow_mut();
            if !state.lists(id) {
                debug!(id, "edit of a todo that is not listed");
                return Err(state.fail(SyncError::Update));
            }
            if let Some(title) = changes.title.as_mut() {
                let trimmed = title.trim();
                if trimmed.is_empty() {
                    return Err(state.fail(SyncError::EmptyTitle));
                }
                *title = trimmed.to_string();
            }
            state.processing.insert(id);
        }
        let result = self.remote.update(id, &changes).await;

        let mut state = self.state.borrow_mut();
        state.processing.remove(&id);
        match result {
            Ok(todo) => {
                info!(id, "updated todo");
                state.replace(todo.clone());
                Ok(todo)
            }
            Err(_) => Err(state.fail(SyncError::Update)),
        }
    }

    /// Flips the completion flag of a single todo.
    pub async fn toggle(&self, id: TodoId) -> Result<Todo, SyncError> {
        let completed = {
            let state = self.state.borrow();
            state.todos.iter().find(|todo| todo.id == id).map(|todo| todo.completed)
        };
        match completed {
            Some(completed) => self.edit(id, UpdateTodo::completed(!completed)).await,
            None => Err(self.state.borrow_mut().fail(SyncError::Update)),
        }
    }

    /// Deletes every completed todo, keeping whatever deletes succeeded.
    pub async fn clear_completed(&self) -> ClearOutcome {
        let targets: Vec<TodoId> = {
            let mut state = self.state.borrow_mut();
            let targets: Vec<TodoId> =
                state.todos.iter().filter(|todo| todo.completed).map(|todo| todo.id).collect();
            state.processing.extend(targets.iter().copied());
            targets
        };
        if targets.is_empty() {
            return ClearOutcome::default();
        }
        debug!(count = targets.len(), "clearing completed todos");

        let settled = join_all(targets.iter().map(|&id| async move {
            let result = self.remote.delete(id).await;
            self.state.borrow_mut().processing.remove(&id);
            (id, result.is_ok())
        }))
        .await;

        let mut outcome = ClearOutcome::default();
        for (id, ok) in settled {
            if ok {
                outcome.removed.push(id);
            } else {
                outcome.failed.push(id);
            }
        }

        let mut state = self.state.borrow_mut();
        state.todos.retain(|todo| !outcome.removed.contains(&todo.id));
        info!(
            removed = outcome.removed.len(),
            failed = outcome.failed.len(),
            "cleared completed todos"
        );
        if !outcome.is_complete() {
            state.fail(SyncError::Clear);
        }
        outcome
    }

    /// Completes every active todo, or reopens everything if nothing is active.
    ///
    /// The list is only touched if every update succeeds.
    pub async fn toggle_all(&self) -> Result<(), SyncError> {
        let (targets, completed) = {
            let mut state = self.state.borrow_mut();
            let completed = !state.todos.iter().all(|todo| todo.completed);
            let targets: Vec<TodoId> = state
                .todos
                .iter()
                .filter(|todo| todo.completed != completed)
                .map(|todo| todo.id)
                .collect();
            state.processing.extend(targets.iter().copied());
            (targets, completed)
        };
        if targets.is_empty() {
            return Ok(());
        }
        debug!(count = targets.len(), completed, "toggling todos");

        let changes = UpdateTodo::completed(completed);
        let settled = join_all(targets.iter().map(|&id| self.remote.update(id, &changes))).await;

        let mut state = self.state.borrow_mut();
        for id in &targets {
            state.processing.remove(id);
        }
        let updated: Result<Vec<Todo>, _> = settled.into_iter().collect();
        match updated {
            Ok(updated) => {
                let updated: HashMap<TodoId, Todo> =
                    updated.into_iter().map(|todo| (todo.id, todo)).collect();
                for todo in state.todos.iter_mut() {
                    if let Some(server) = updated.get(&todo.id) {
                        *todo = server.clone();
                    }
                }
                info!(count = targets.len(), completed, "toggled todos");
                Ok(())
            }
            Err(_) => Err(state.fail(SyncError::Toggle)),
        }
    }

    pub fn set_filter(&self, filter: FilterMode) {
        self.state.borrow_mut().filter = filter;
    }

    pub fn dismiss_error(&self) {
        self.state.borrow_mut().error = None;
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.state.borrow().todos.clone()
    }

    pub fn visible(&self) -> Vec<Todo> {
        let state = self.state.borrow();
        filter_todos(&state.todos, state.filter).into_iter().cloned().collect()
    }

    pub fn counts(&self) -> Counts {
        Counts::of(&self.state.borrow().todos)
    }

    pub fn filter(&self) -> FilterMode {
        self.state.borrow().filter
    }

    pub fn is_processing(&self, id: TodoId) -> bool {
        self.state.borrow().processing.contains(&id)
    }

    pub fn processing_ids(&self) -> BTreeSet<TodoId> {
        self.state.borrow().processing.clone()
    }

    pub fn pending_title(&self) -> Option<String> {
        self.state.borrow().pending_title.clone()
    }

    pub fn error(&self) -> Option<SyncError> {
        self.state.borrow().error
    }

    pub fn snapshot(&self) -> ViewState {
        let state = self.state.borrow();
        ViewState {
            todos: state.todos.clone(),
            pending_title: state.pending_title.clone(),
            processing_ids: state.processing.clone(),
            error_message: state.error.map(|error| error.to_string()),
            filter: state.filter,
            counts: Counts::of(&state.todos),
        }
    }
}
