use crate::keys::{Finger, Hand, InputSource, KeyInput};
use crate::session::SessionEvent;

pub const CMD_START: &str = "xpstart";
pub const CMD_MODE_NOW: &str = "modenow";
pub const CMD_NEXT_MODE: &str = "modenext";
pub const CMD_MODE_RESET: &str = "modereset";
pub const CMD_CONFIG_LOCATION: &str = "confloc";

pub const HELP: &str = "\
xpstart <id>                   start the experiment with the given id
modenow                        show the current modality
modenext                       continue with the next round after standby
modereset                      discard the current round and start it over
confloc                        show where the config file is read from
key <label> [hand] [finger]    send one key label (e.g. a, SPACE, BACKSPACE)
type <text>                    send text from the in-scene keyboard
physical <text>                send text from a physical keyboard
press                          press the finish button (chain to finish)
finish                         finish the current round immediately
help                           show this help
quit                           leave";

/// One parsed operator line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Session(SessionEvent),
    Keys(Vec<KeyInput>),
    Press,
    ModeNow,
    ConfigLocation,
    Help,
    Quit,
}

/// Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }
    let (cmd, rest) = match line.trim_start().split_once(' ') {
        Some((cmd, rest)) => (cmd, rest),
        None => (line.trim(), ""),
    };

    let command = match cmd {
        CMD_START => {
            let id = rest
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("usage: {CMD_START} <id> (got `{}`)", rest.trim()))?;
            ConsoleCommand::Session(SessionEvent::Start(id))
        }
        CMD_NEXT_MODE => ConsoleCommand::Session(SessionEvent::Advance),
        CMD_MODE_RESET => ConsoleCommand::Session(SessionEvent::Reset),
        "finish" => ConsoleCommand::Session(SessionEvent::Finish),
        CMD_MODE_NOW => ConsoleCommand::ModeNow,
        CMD_CONFIG_LOCATION => ConsoleCommand::ConfigLocation,
        "key" => ConsoleCommand::Session(SessionEvent::Keystroke(parse_key(rest)?)),
        "type" => ConsoleCommand::Keys(text_keys(rest, InputSource::Virtual)),
        "physical" => ConsoleCommand::Keys(text_keys(rest, InputSource::Physical)),
        "press" => ConsoleCommand::Press,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command `{other}`, try `help`")),
    };
    Ok(Some(command))
}

fn parse_key(args: &str) -> Result<KeyInput, String> {
    let mut parts = args.split_whitespace();
    let label = parts
        .next()
        .ok_or_else(|| "usage: key <label> [hand] [finger]".to_string())?;
    let hand = parts.next().map(str::parse::<Hand>).transpose()?;
    let finger = parts.next().map(str::parse::<Finger>).transpose()?;
    Ok(KeyInput::new(label).with_origin(hand, finger))
}

fn text_keys(text: &str, source: InputSource) -> Vec<KeyInput> {
    text.chars()
        .map(|c| KeyInput {
            source,
            ..KeyInput::from_char(c)
        })
        .collect()
}
