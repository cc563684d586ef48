//! Terminal front-end for the todo sync core.
//!
//! # Design
//! The binary is the presentation layer: it reads one command per line,
//! turns it into an intent on `SyncCore`, and redraws the `ViewState`
//! snapshot. Title edits go through a per-item `ItemEditor`, kept across
//! commands so a failed edit keeps the typed text for `retry` or `cancel`.
//!
//! Intents run as local tasks, so the prompt stays live while requests are
//! in flight. The screen is drawn once an intent has dispatched its
//! requests and again when it settles.

pub mod command;
pub mod config;
pub mod render;
pub mod transport;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinSet, LocalSet};
use todo_core::{ItemEditor, RemoteClient, SyncCore, SyncError, TodoId, Transport, UpdateTodo};
use tracing::{debug, info, warn};

pub use command::{Command, CommandError};
pub use config::{AppConfig, ConfigError};
pub use transport::HttpTransport;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One user's session: the core plus the editors the user has opened.
///
/// Every method takes `&self`, so several commands can be in flight at once.
/// An editor is taken out of the map while its intent is in flight and put
/// back only if it is still editing afterwards.
pub struct Session<T> {
    core: SyncCore<T>,
    editors: RefCell<HashMap<TodoId, ItemEditor>>,
}

impl<T: Transport> Session<T> {
    pub fn new(core: SyncCore<T>) -> Self {
        Self {
            core,
            editors: RefCell::new(HashMap::new()),
        }
    }

    pub fn core(&self) -> &SyncCore<T> {
        &self.core
    }

    /// Draft left behind by a failed edit of `id`, if any.
    pub fn open_draft(&self, id: TodoId) -> Option<String> {
        self.editors.borrow().get(&id).and_then(ItemEditor::draft).map(str::to_string)
    }

    /// Every open draft, by todo id.
    pub fn drafts(&self) -> BTreeMap<TodoId, String> {
        self.editors
            .borrow()
            .iter()
            .filter_map(|(id, editor)| editor.draft().map(|draft| (*id, draft.to_string())))
            .collect()
    }

    /// Renders the current snapshot together with the open drafts.
    pub fn render(&self) -> String {
        render::render(&self.core.snapshot(), &self.drafts())
    }

    /// Dispatches one command. Failures are already recorded in the core's
    /// error state, so they are only logged here.
    pub async fn handle(&self, command: Command) -> Flow {
        debug!(?command, "handling command");
        let result = match command {
            Command::Add(title) => self.core.add(&title).await.map(|_| ()),
            Command::Edit { id, title } => self.edit(id, title).await,
            Command::Retry(id) => self.retry(id).await,
            Command::Cancel(id) => {
                self.cancel(id);
                Ok(())
            }
            Command::Toggle(id) => self.core.toggle(id).await.map(|_| ()),
            Command::Delete(id) => self.core.delete(id).await,
            Command::ToggleAll => self.core.toggle_all().await,
            Command::ClearCompleted => {
                self.core.clear_completed().await;
                Ok(())
            }
            Command::Filter(mode) => {
                self.core.set_filter(mode);
                Ok(())
            }
            Command::Dismiss => {
                self.core.dismiss_error();
                Ok(())
            }
            Command::List | Command::Help => Ok(()),
            Command::Quit => return Flow::Quit,
        };
        if let Err(error) = result {
            debug!(%error, "command failed");
        }
        self.forget_removed();
        Flow::Continue
    }

    async fn edit(&self, id: TodoId, title: String) -> Result<(), SyncError> {
        let editor = self.editors.borrow_mut().remove(&id);
        let mut editor = match editor {
            Some(editor) => editor,
            None => match self.core.todos().iter().find(|todo| todo.id == id) {
                Some(todo) => ItemEditor::new(todo),
                // The core rejects unlisted ids without a remote call.
                None => return self.core.edit(id, UpdateTodo::title(title)).await.map(|_| ()),
            },
        };
        editor.begin();
        editor.set_draft(title);
        self.submit(id, editor).await
    }

    async fn retry(&self, id: TodoId) -> Result<(), SyncError> {
        let editor = self.editors.borrow_mut().remove(&id);
        match editor {
            Some(editor) => self.submit(id, editor).await,
            None => {
                warn!(id, "no open draft to retry");
                Ok(())
            }
        }
    }

    fn cancel(&self, id: TodoId) {
        match self.editors.borrow_mut().remove(&id) {
            Some(mut editor) => {
                editor.cancel();
                debug!(id, title = editor.title(), "discarded draft");
            }
            None => warn!(id, "no open draft to cancel"),
        }
    }

    async fn submit(&self, id: TodoId, mut editor: ItemEditor) -> Result<(), SyncError> {
        let result = editor.submit(&self.core).await;
        if editor.is_editing() {
            self.editors.borrow_mut().insert(id, editor);
        }
        result
    }

    /// Drops editors whose todo has left the list.
    fn forget_removed(&self) {
        let todos = self.core.todos();
        self.editors
            .borrow_mut()
            .retain(|id, _| todos.iter().any(|todo| todo.id == *id));
    }
}

/// Runs the interactive loop against the configured API until `quit` or EOF.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    info!(api_url = %config.api_url, user_id = config.user_id, "starting");
    let remote = RemoteClient::new(&config.api_url, HttpTransport::new());
    let session = Rc::new(Session::new(SyncCore::new(remote, config.user_id)));
    LocalSet::new().run_until(drive(session)).await
}

async fn drive<T: Transport + 'static>(session: Rc<Session<T>>) -> Result<(), AppError> {
    // A failed load is shown in the error line; the session stays usable.
    let _ = session.core().load().await;
    print!("{}", session.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Command>() {
                    Ok(Command::Help) => println!("{}", command::HELP),
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        let task = Rc::clone(&session);
                        in_flight.spawn_local(async move { task.handle(command).await });
                        // Let the intent mark its ids before drawing.
                        tokio::task::yield_now().await;
                        print!("{}", session.render());
                    }
                    Err(error) => println!("{error}"),
                }
            }
            Some(_) = in_flight.join_next() => print!("{}", session.render()),
        }
    }

    // Intents already dispatched are allowed to settle.
    while in_flight.join_next().await.is_some() {
        print!("{}", session.render());
    }
    info!("bye");
    Ok(())
}
