//! Plain-text rendering of a `ViewState`.

use std::collections::BTreeMap;
use std::fmt::Write;

use todo_core::{FilterMode, TodoId, ViewState};

/// Renders the whole screen: header, items with any open drafts,
/// placeholder, footer and error.
pub fn render(view: &ViewState, drafts: &BTreeMap<TodoId, String>) -> String {
    let mut out = String::new();

    let toggle = if view.counts.all_completed() { "[v]" } else { "[ ]" };
    if view.counts.total() > 0 {
        let _ = writeln!(out, "{toggle} todos");
    } else {
        let _ = writeln!(out, "    todos");
    }

    for todo in view.visible() {
        let mark = if todo.completed { "[x]" } else { "[ ]" };
        let busy = if view.is_processing(todo.id) { "  ..." } else { "" };
        let _ = writeln!(out, "  {mark} {:>3}  {}{busy}", todo.id, todo.title);
        if let Some(draft) = drafts.get(&todo.id) {
            let _ = writeln!(out, "          editing: {draft}");
        }
    }
    if let Some(title) = &view.pending_title {
        let _ = writeln!(out, "  [ ]   -  {title}  ...");
    }

    if view.counts.total() > 0 {
        let noun = if view.counts.active == 1 { "item" } else { "items" };
        let _ = write!(out, "{} {noun} left | {}", view.counts.active, filters(view.filter));
        if view.counts.completed > 0 {
            let _ = write!(out, " | clear completed");
        }
        out.push('\n');
    }

    if let Some(message) = &view.error_message {
        let _ = writeln!(out, "! {message}");
    }
    out
}

fn filters(selected: FilterMode) -> String {
    [FilterMode::All, FilterMode::Active, FilterMode::Completed]
        .iter()
        .map(|mode| {
            if *mode == selected {
                format!("<{mode}>")
            } else {
                mode.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
