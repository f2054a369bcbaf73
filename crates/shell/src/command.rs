//! Parsing of one line of user input

/// A command typed at the `bwilcd>` prompt.
///
/// Arguments keep their original case; only the verb is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    /// `connect <n>`
    Connect(String),
    /// `url <address>`
    Url(String),
    /// `select <n>`
    Select(String),
    /// A bare number; its meaning depends on the current level
    Number(usize),
    Next,
    Prev,
    Back,
    Refresh,
    /// `download [<n>]`
    Download(String),
    /// `search <query>`
    Search(String),
    List,
    /// `view <n>`
    View(String),
    /// Blank line
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if line.bytes().all(|b| b.is_ascii_digit()) {
            return match line.parse() {
                Ok(n) => Command::Number(n),
                Err(_) => Command::Unknown(line.to_string()),
            };
        }

        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim().to_string()),
            None => (line, String::new()),
        };

        match verb.to_lowercase().as_str() {
            "q" | "quit" | "exit" => Command::Quit,
            "h" | "help" => Command::Help,
            "c" | "connect" => Command::Connect(arg),
            "url" => Command::Url(arg),
            "sl" | "select" => Command::Select(arg),
            "n" | "next" => Command::Next,
            "p" | "prev" => Command::Prev,
            "b" | "back" => Command::Back,
            "r" | "refresh" => Command::Refresh,
            "d" | "dd" | "download" => Command::Download(arg),
            "s" | "search" => Command::Search(arg),
            "l" | "ll" | "list" => Command::List,
            "v" | "view" => Command::View(arg),
            _ => Command::Unknown(line.to_string()),
        }
    }
}
