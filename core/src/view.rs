//! Derived, side-effect free views over the todo list.
//!
//! Everything the presentation layer needs is computed from the list and a
//! `FilterMode`. `ViewState` is the owned snapshot handed across the
//! presentation boundary.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::types::{Todo, TodoId};

/// Which subset of the list is visible. Never sent to the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !todo.completed,
            FilterMode::Completed => todo.completed,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown filter '{0}': expected all, active or completed")]
pub struct ParseFilterError(String);

impl FromStr for FilterMode {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" => Ok(FilterMode::Completed),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub active: usize,
    pub completed: usize,
}

impl Counts {
    pub fn of(todos: &[Todo]) -> Self {
        let active = todos.iter().filter(|todo| !todo.completed).count();
        Self {
            active,
            completed: todos.len() - active,
        }
    }

    pub fn total(&self) -> usize {
        self.active + self.completed
    }

    /// True when the list is non-empty and nothing is left to do.
    pub fn all_completed(&self) -> bool {
        self.total() > 0 && self.active == 0
    }
}

/// The todos selected by `filter`, in list order.
pub fn filter_todos(todos: &[Todo], filter: FilterMode) -> Vec<&Todo> {
    todos.iter().filter(|todo| filter.matches(todo)).collect()
}

/// Everything the presentation layer renders, detached from the core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub todos: Vec<Todo>,
    pub pending_title: Option<String>,
    pub processing_ids: BTreeSet<TodoId>,
    pub error_message: Option<String>,
    pub filter: FilterMode,
    pub counts: Counts,
}

impl ViewState {
    pub fn visible(&self) -> Vec<&Todo> {
        filter_todos(&self.todos, self.filter)
    }

    pub fn is_processing(&self, id: TodoId) -> bool {
        self.processing_ids.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: TodoId, title: &str, completed: bool) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            completed,
            user_id: 1,
        }
    }

    #[test]
    fn completed_filter_and_counts() {
        let todos = vec![todo(1, "a", false), todo(2, "b", true)];
        let visible = filter_todos(&todos, FilterMode::Completed);
        assert_eq!(visible, vec![&todos[1]]);
        assert_eq!(Counts::of(&todos), Counts { active: 1, completed: 1 });
    }

    #[test]
    fn active_filter_keeps_list_order() {
        let todos = vec![todo(3, "c", false), todo(1, "a", true), todo(2, "b", false)];
        let ids: Vec<_> = filter_todos(&todos, FilterMode::Active).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(filter_todos(&todos, FilterMode::All).len(), 3);
    }

    #[test]
    fn all_completed_needs_a_non_empty_list() {
        assert!(!Counts::of(&[]).all_completed());
        assert!(Counts::of(&[todo(1, "a", true)]).all_completed());
        assert!(!Counts::of(&[todo(1, "a", true), todo(2, "b", false)]).all_completed());
    }

    #[test]
    fn filter_mode_parses_case_insensitively() {
        assert_eq!("Active".parse::<FilterMode>(), Ok(FilterMode::Active));
        assert_eq!(" completed ".parse::<FilterMode>(), Ok(FilterMode::Completed));
        assert!("done".parse::<FilterMode>().is_err());
        assert_eq!(FilterMode::Completed.to_string(), "completed");
    }

    #[test]
    fn view_state_applies_its_own_filter() {
        let state = ViewState {
            todos: vec![todo(1, "a", false), todo(2, "b", true)],
            filter: FilterMode::Active,
            processing_ids: BTreeSet::from([2]),
            ..ViewState::default()
        };
        assert_eq!(state.visible().len(), 1);
        assert!(state.is_processing(2));
        assert!(!state.is_processing(1));
    }
}
