//! Line-oriented terminal front end
//!
//! Plain text replaces the search term; slash commands navigate, commit and
//! manage cards. Card and suggestion positions are 1-based as displayed.

use std::fmt::Write;

use crate::dashboard::{DashboardView, Input, Key};

pub const HELP: &str = "\
Type to search. Commands:
  /up /down      move the suggestion highlight
  /enter         select the highlighted (or first) suggestion
  /pick N        select suggestion N
  /rm N          remove card N
  /refresh N     fetch fresh weather for card N
  /unit          switch between °C and °F
  /clear         clear the search term
  /help          show this help
  /quit          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Input(Input),
    RemoveCard(usize),
    RefreshCard(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand(String),
    BadPosition(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnknownCommand(command) => {
                write!(f, "unknown command {command}, try /help")
            }
            ParseError::BadPosition(raw) => {
                write!(f, "expected a position starting at 1, got {raw:?}")
            }
        }
    }
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let Some(command) = line.trim_end().strip_prefix('/') else {
        return Ok(Command::Input(Input::Type(line.trim_end().to_string())));
    };

    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command, ""),
    };

    Ok(match name {
        "up" => Command::Input(Input::Key(Key::Up)),
        "down" => Command::Input(Input::Key(Key::Down)),
        "enter" => Command::Input(Input::Key(Key::Enter)),
        "pick" => Command::Input(Input::Pick(position(argument)?)),
        "rm" => Command::RemoveCard(position(argument)?),
        "refresh" => Command::RefreshCard(position(argument)?),
        "unit" => Command::Input(Input::ToggleUnit),
        "clear" => Command::Input(Input::Type(String::new())),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(format!("/{other}"))),
    })
}

/// 1-based position to 0-based index
fn position(raw: &str) -> Result<usize, ParseError> {
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| ParseError::BadPosition(raw.to_string()))
}

impl Command {
    /// Map card positions to the cities currently shown
    #[must_use]
    pub fn resolve(self, view: &DashboardView) -> Option<Input> {
        match self {
            Command::Input(input) => Some(input),
            Command::RemoveCard(index) => view
                .cards
                .get(index)
                .map(|card| Input::Remove(card.catalog_ref.clone())),
            Command::RefreshCard(index) => view
                .cards
                .get(index)
                .map(|card| Input::Refresh(card.catalog_ref.clone())),
            Command::Help | Command::Quit => None,
        }
    }
}

#[must_use]
pub fn render(view: &DashboardView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Search: {}", view.term);
    for (index, suggestion) in view.suggestions.iter().enumerate() {
        let marker = if suggestion.highlighted { '>' } else { ' ' };
        let _ = writeln!(
            out,
            " {marker} {}. {} ({})",
            index + 1,
            suggestion.name,
            suggestion.country
        );
    }

    if view.cards.is_empty() {
        let _ = writeln!(out, "No cities selected");
    }
    for (index, card) in view.cards.iter().enumerate() {
        let flash = if card.highlighted { " *" } else { "" };
        let weather = match (&card.temperature, &card.description) {
            (Some(temperature), Some(description)) => {
                let place = card.display_name.as_deref().unwrap_or_default();
                format!("{temperature} {description} [{place}]")
            }
            _ if card.loading => "loading...".to_string(),
            _ => "weather unavailable".to_string(),
        };
        let _ = writeln!(out, "[{}] {}{}: {}", index + 1, card.name, flash, weather);
    }

    out
}
