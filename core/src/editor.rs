//! Inline title editor for a single todo.
//!
//! `ItemEditor` is a two-state machine held by the presentation layer:
//! `Display` shows the title, `Editing` holds a draft. Committing a draft
//! yields a `CommitIntent` describing what, if anything, should be sent to
//! the core; `settle` feeds the outcome back. A failed dispatch leaves the
//! editor in `Editing` with the draft intact.

use crate::error::SyncError;
use crate::sync::SyncCore;
use crate::transport::Transport;
use crate::types::{Todo, TodoId, UpdateTodo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Display,
    Editing { draft: String },
}

/// What a commit asks the core to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitIntent {
    /// The draft matched the current title; back to display, nothing sent.
    None,
    Edit { id: TodoId, title: String },
    /// An empty draft removes the todo.
    Delete { id: TodoId },
}

#[derive(Debug, Clone)]
pub struct ItemEditor {
    id: TodoId,
    title: String,
    state: EditorState,
}

impl ItemEditor {
    pub fn new(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            state: EditorState::Display,
        }
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            EditorState::Editing { draft } => Some(draft),
            EditorState::Display => None,
        }
    }

    /// Enters edit mode with the current title as the draft.
    pub fn begin(&mut self) {
        if !self.is_editing() {
            self.state = EditorState::Editing {
                draft: self.title.clone(),
            };
        }
    }

    /// Replaces the draft. Ignored outside edit mode.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let EditorState::Editing { draft } = &mut self.state {
            *draft = text.into();
        }
    }

    /// Discards the draft without dispatching anything.
    pub fn cancel(&mut self) {
        self.state = EditorState::Display;
    }

    /// Decides what the draft means. A no-op commit returns to `Display`
    /// immediately; other intents stay in `Editing` until `settle`.
    pub fn commit(&mut self) -> CommitIntent {
        let EditorState::Editing { draft } = &self.state else {
            return CommitIntent::None;
        };
        let trimmed = draft.trim();
        if trimmed == self.title {
            self.state = EditorState::Display;
            return CommitIntent::None;
        }
        if trimmed.is_empty() {
            return CommitIntent::Delete { id: self.id };
        }
        CommitIntent::Edit {
            id: self.id,
            title: trimmed.to_string(),
        }
    }

    /// Losing focus commits exactly like an explicit submit.
    pub fn blur(&mut self) -> CommitIntent {
        self.commit()
    }

    /// Applies the outcome of a dispatched intent.
    pub fn settle(&mut self, outcome: Result<Option<&Todo>, SyncError>) {
        if let Ok(updated) = outcome {
            if let Some(todo) = updated {
                self.title = todo.title.clone();
            }
            self.state = EditorState::Display;
        }
    }

    /// Commits the draft and dispatches the resulting intent to `core`.
    pub async fn submit<T: Transport>(&mut self, core: &SyncCore<T>) -> Result<(), SyncError> {
        match self.commit() {
            CommitIntent::None => Ok(()),
            CommitIntent::Edit { id, title } => {
                let result = core.edit(id, UpdateTodo::title(title)).await;
                self.settle(result.as_ref().map(Some).map_err(|e| *e));
                result.map(|_| ())
            }
            CommitIntent::Delete { id } => {
                let result = core.delete(id).await;
                self.settle(result.map(|()| None));
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(title: &str) -> Todo {
        Todo {
            id: 7,
            title: title.to_string(),
            completed: false,
            user_id: 1,
        }
    }

    fn editing(title: &str, draft: &str) -> ItemEditor {
        let mut editor = ItemEditor::new(&todo(title));
        editor.begin();
        editor.set_draft(draft);
        editor
    }

    #[test]
    fn begin_seeds_draft_with_title() {
        let mut editor = ItemEditor::new(&todo("walk dog"));
        assert_eq!(editor.state(), &EditorState::Display);
        editor.begin();
        assert_eq!(editor.draft(), Some("walk dog"));
    }

    #[test]
    fn unchanged_title_is_a_no_op() {
        let mut editor = editing("walk dog", "  walk dog  ");
        assert_eq!(editor.commit(), CommitIntent::None);
        assert!(!editor.is_editing());
    }

    #[test]
    fn blank_draft_means_delete() {
        let mut editor = editing("walk dog", "   ");
        assert_eq!(editor.commit(), CommitIntent::Delete { id: 7 });
        assert!(editor.is_editing());
    }

    #[test]
    fn changed_draft_is_trimmed_into_an_edit() {
        let mut editor = editing("walk dog", " walk cat ");
        assert_eq!(
            editor.blur(),
            CommitIntent::Edit {
                id: 7,
                title: "walk cat".to_string()
            }
        );
    }

    #[test]
    fn cancel_discards_draft() {
        let mut editor = editing("walk dog", "something else");
        editor.cancel();
        assert_eq!(editor.state(), &EditorState::Display);
        assert_eq!(editor.title(), "walk dog");
        assert_eq!(editor.commit(), CommitIntent::None);
    }

    #[test]
    fn failure_keeps_the_draft() {
        let mut editor = editing("walk dog", "walk cat");
        editor.commit();
        editor.settle(Err(SyncError::Update));
        assert_eq!(editor.draft(), Some("walk cat"));
    }

    #[test]
    fn success_adopts_the_server_title() {
        let mut editor = editing("walk dog", "walk cat");
        editor.commit();
        editor.settle(Ok(Some(&todo("Walk cat"))));
        assert_eq!(editor.state(), &EditorState::Display);
        assert_eq!(editor.title(), "Walk cat");
    }

    #[test]
    fn set_draft_outside_edit_mode_is_ignored() {
        let mut editor = ItemEditor::new(&todo("walk dog"));
        editor.set_draft("ignored");
        assert_eq!(editor.draft(), None);
    }
}
