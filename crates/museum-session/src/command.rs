//! Slash commands and the fixed text the server answers with.

/// A parsed slash command.
///
/// Parsing splits the message on single spaces, so `"/goto  x"` has an
/// empty level name. Arguments past the ones a command uses are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    About,
    Levels,
    /// `/goto <levelname>`; `None` when the name is missing.
    Goto(Option<&'a str>),
    Random,
    /// Anything else, carrying the first token as typed.
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parses a chat message that starts with `/`.
    pub fn parse(message: &'a str) -> Self {
        let mut args = message.split(' ');
        let name = args.next().unwrap_or_default();
        match name {
            "/help" => Self::Help,
            "/about" => Self::About,
            "/levels" => Self::Levels,
            "/goto" => Self::Goto(args.next()),
            "/random" => Self::Random,
            other => Self::Unknown(other),
        }
    }
}

/// Lines of the `/help` reply.
pub const HELP: [&str; 5] = [
    "Available commands:",
    "- &c/about&e: show information about this server",
    "- &c/levels&e: list available levels",
    "- &c/goto <levelname>&e: warp to another level",
    "- &c/random&e: warp to a random level",
];

/// Lines of the `/about` reply, also sent right after joining.
pub fn about(server_name: &str) -> [String; 4] {
    [
        format!("Welcome to &c{server_name}"),
        "This server is a view-only archive of Minecraft levels circa 2009-2010".to_string(),
        "For information about available commands, type &c/help".to_string(),
        "For questions or comments, contact &ccalzoneman&e on &circ.esper.net".to_string(),
    ]
}

pub const SET_BLOCK_NOTICE: &str =
    "This server is a view-only archive of old levels.  Your changes won't be saved";
pub const CHAT_DISABLED: &str = "Chat is disabled for this server";
pub const GOTO_USAGE: &str = "Usage: &c/goto <levelname>";
pub const LOCATE_FAILED: &str = "Internal error locating level.  Try again later";
/// Kick reason when the starting level can't be sent.
pub const KICK_LOAD_FAILED: &str = "Failed to load level";

pub fn levels_list(names: &[String]) -> String {
    format!("Available levels: {}", names.join(", "))
}

pub fn unknown_level(name: &str) -> String {
    format!("Unknown level &c{name}")
}

pub fn unknown_command(token: &str) -> String {
    format!("Unknown command &c{token}")
}

pub fn load_failed(name: &str) -> String {
    format!("Failed to load level &c{name}")
}

pub fn level_intro(name: &str, date: &str) -> String {
    format!("This level is &c{name}&e, from {date}")
}
