//! Line commands typed at the prompt.

use std::str::FromStr;

use thiserror::Error;
use todo_core::{FilterMode, ParseFilterError, TodoId};

pub const HELP: &str = "\
commands:
  add <title>            create a todo
  edit <id> <title>      rename a todo (an empty title deletes it)
  retry <id>             resubmit the draft of a failed edit
  cancel <id>            discard the draft of a failed edit
  toggle <id>            flip a todo between active and completed
  delete <id>            delete a todo
  toggle-all             complete everything, or reopen everything if all done
  clear                  delete all completed todos
  filter <mode>          show all, active or completed todos
  dismiss                hide the current error
  list                   redraw the list
  help                   show this help
  quit                   exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Edit { id: TodoId, title: String },
    Retry(TodoId),
    Cancel(TodoId),
    Toggle(TodoId),
    Delete(TodoId),
    ToggleAll,
    ClearCompleted,
    Filter(FilterMode),
    Dismiss,
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'\n  hint: type 'help' to list commands")]
    Unknown(String),

    #[error("'{0}' needs a todo id")]
    MissingId(&'static str),

    #[error("invalid todo id '{0}'")]
    InvalidId(String),

    #[error("'filter' needs a mode: all, active or completed")]
    MissingFilter,

    #[error(transparent)]
    Filter(#[from] ParseFilterError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match name {
            "" | "list" | "ls" => Ok(Command::List),
            // The title keeps its spacing; the core trims and validates it.
            "add" | "a" => Ok(Command::Add(rest.to_string())),
            "edit" | "e" => {
                let rest = rest.trim_start();
                let (id, title) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Ok(Command::Edit {
                    id: parse_id("edit", id)?,
                    title: title.to_string(),
                })
            }
            "retry" | "r" => Ok(Command::Retry(parse_id("retry", rest)?)),
            "cancel" | "c" => Ok(Command::Cancel(parse_id("cancel", rest)?)),
            "toggle" | "t" => Ok(Command::Toggle(parse_id("toggle", rest)?)),
            "delete" | "rm" => Ok(Command::Delete(parse_id("delete", rest)?)),
            "toggle-all" => Ok(Command::ToggleAll),
            "clear" => Ok(Command::ClearCompleted),
            "filter" | "f" => {
                let mode = rest.trim();
                if mode.is_empty() {
                    return Err(CommandError::MissingFilter);
                }
                Ok(Command::Filter(mode.parse()?))
            }
            "dismiss" => Ok(Command::Dismiss),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_id(command: &'static str, raw: &str) -> Result<TodoId, CommandError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CommandError::MissingId(command));
    }
    raw.parse().map_err(|_| CommandError::InvalidId(raw.to_string()))
}
