//! Input line classification.

/// A recognised slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/name <new>`
    Name(Option<String>),
    /// `/users`
    Users,
    /// `/help`
    Help,
    /// `/join <room>`
    Join(Option<String>),
    /// `/leave`
    Leave,
    /// `/rooms` or `/rooms <room>`
    Rooms(Option<String>),
    /// `/quit`
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Anything that is not a recognised command, line ending removed
    Content(String),
    Blank,
}

/// 1 行の入力をコマンドか本文に分類する
///
/// Only the first word selects a command; the argument is the rest of the line,
/// trimmed. An unrecognised `/word` is treated as content.
pub fn parse_line(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Blank;
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let command = match word {
        "/name" => Command::Name(argument),
        "/users" => Command::Users,
        "/help" => Command::Help,
        "/join" => Command::Join(argument),
        "/leave" => Command::Leave,
        "/rooms" => Command::Rooms(argument),
        "/quit" => Command::Quit,
        _ => return Input::Content(line.to_string()),
    };
    Input::Command(command)
}
