//! Line protocol spoken on the control socket
//!
//! One request line per connection, one response line back.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::store::Snapshot;

/// Commands understood by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Remove one notification (see [`PopOrder`])
    Pop,
    /// Remove all notifications
    Clear,
    /// Return the list as JSON
    GetList,
    /// Stop the agent
    Exit,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Pop => "pop",
            Command::Clear => "clear",
            Command::GetList => "get-list",
            Command::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    /// Parse a request line; surrounding whitespace is ignored
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line.trim() {
            "pop" => Ok(Command::Pop),
            "clear" => Ok(Command::Clear),
            "get-list" => Ok(Command::GetList),
            "exit" => Ok(Command::Exit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// Which end of the list `pop` removes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PopOrder {
    /// Index 0, the most recently received notification
    #[default]
    Newest,
    /// The tail of the list
    Oldest,
}

/// A single response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok,
    List(String),
    Error(String),
}

impl Response {
    pub fn unknown_command() -> Self {
        Response::Error("Unknown Command".to_string())
    }

    /// Serialize a snapshot for `get-list`
    pub fn list(snapshot: &Snapshot) -> Self {
        match serde_json::to_string(snapshot) {
            Ok(json) => Response::List(json),
            Err(e) => Response::Error(e.to_string()),
        }
    }

    /// Wire form, always newline terminated
    pub fn to_line(&self) -> String {
        match self {
            Response::Ok => "Ok\n".to_string(),
            Response::List(json) => format!("{}\n", json),
            Response::Error(message) => format!("Error: {}\n", message),
        }
    }

    pub fn is_error(line: &str) -> bool {
        line.starts_with("Error:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("pop".parse::<Command>(), Ok(Command::Pop));
        assert_eq!("clear\n".parse::<Command>(), Ok(Command::Clear));
        assert_eq!("  get-list \r\n".parse::<Command>(), Ok(Command::GetList));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Exit));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "foobar\n".parse::<Command>(),
            Err(UnknownCommand("foobar".to_string()))
        );
        assert!("POP".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn test_response_lines() {
        assert_eq!(Response::Ok.to_line(), "Ok\n");
        assert_eq!(Response::unknown_command().to_line(), "Error: Unknown Command\n");
        assert_eq!(Response::list(&Vec::new()).to_line(), "[]\n");
    }

    #[test]
    fn test_pop_order_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            pop_order: PopOrder,
        }
        let w: Wrapper = toml::from_str("pop_order = \"oldest\"").unwrap();
        assert_eq!(w.pop_order, PopOrder::Oldest);
        assert_eq!(PopOrder::default(), PopOrder::Newest);
    }
}
