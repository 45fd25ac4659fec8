//! PromptInput - line input handler for the interactive studio.
//!
//! Regular text is a prompt to generate; lines starting with `/` are commands.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

/// Commands read from the terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptCommand {
    /// Generate a video from the given text prompt.
    Generate(String),
    /// Return to the idle form.
    Another,
    /// Save the current video.
    Download,
    /// Cancel the in-flight request.
    Abort,
    /// Query the backend health endpoint.
    Health,
    Help,
    Quit,
}

/// Help text listing the slash commands.
pub const HELP: &str = "Commands:
  <text>      generate a video from the prompt
  /another    clear the result and start over
  /download   save the current video
  /abort      cancel the request in flight
  /health     check the video server
  /help       show this help
  /quit       exit";

/// Stdin listener feeding parsed commands into a channel.
pub struct PromptInput {
    tx: mpsc::Sender<PromptCommand>,
}

impl PromptInput {
    /// Start listening for input on stdin.
    ///
    /// Spawns a background thread that reads lines from stdin and parses
    /// them into `PromptCommand` values, printing the `> ` marker before each
    /// line. The thread sends `Quit` on EOF.
    ///
    /// # Returns
    /// A tuple of:
    /// - `PromptInput` - Handle for sending commands programmatically
    /// - `Receiver<PromptCommand>` - Channel receiver for processed commands
    pub fn spawn_listener() -> (Self, mpsc::Receiver<PromptCommand>) {
        let (tx, rx) = mpsc::channel();
        let tx_clone = tx.clone();

        thread::spawn(move || {
            let stdin = io::stdin();
            Self::listen(stdin.lock(), &mut io::stdout(), &tx_clone);
        });

        (Self { tx }, rx)
    }

    /// Read lines from `reader` until EOF, forwarding parsed commands.
    ///
    /// Writes the input marker to `out` before the first line and after every
    /// line read. Sends `Quit` when the input ends.
    ///
    /// # Arguments
    /// * `reader` - Line source, stdin in the studio
    /// * `out` - Where the input marker is written
    /// * `tx` - Channel the parsed commands are sent to
    pub fn listen(reader: impl BufRead, out: &mut impl Write, tx: &mpsc::Sender<PromptCommand>) {
        Self::write_prompt(out);

        for line in reader.lines() {
            let Ok(input) = line else {
                break; // read error
            };
            if let Some(cmd) = Self::parse_input(&input) {
                if tx.send(cmd).is_err() {
                    return; // receiver dropped
                }
            }
            Self::write_prompt(out);
        }
        let _ = tx.send(PromptCommand::Quit);
    }

    /// Parse a line of input into a PromptCommand.
    ///
    /// # Arguments
    /// * `input` - The raw input string from the user
    ///
    /// # Returns
    /// * `Some(PromptCommand)` - Parsed command
    /// * `None` - Unknown slash command
    ///
    /// Blank lines become an empty `Generate` so the studio rejects them with a
    /// notice. Other text is kept as typed; length validation happens on submit.
    pub fn parse_input(input: &str) -> Option<PromptCommand> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Some(PromptCommand::Generate(String::new()));
        }

        if trimmed.starts_with('/') {
            return Self::parse_command(trimmed);
        }

        Some(PromptCommand::Generate(input.to_string()))
    }

    fn parse_command(input: &str) -> Option<PromptCommand> {
        let word = input.split_whitespace().next()?;

        match word.to_lowercase().as_str() {
            "/another" | "/new" => Some(PromptCommand::Another),
            "/download" | "/save" => Some(PromptCommand::Download),
            "/abort" | "/cancel" => Some(PromptCommand::Abort),
            "/health" => Some(PromptCommand::Health),
            "/help" | "/?" => Some(PromptCommand::Help),
            "/quit" | "/exit" | "/q" => Some(PromptCommand::Quit),
            _ => {
                Self::print_status(&format!("Unknown command: {}", word));
                Self::print_status("Type /help for the list of commands.");
                None
            }
        }
    }

    /// Send a command programmatically.
    pub fn send(&self, command: PromptCommand) -> Result<(), mpsc::SendError<PromptCommand>> {
        self.tx.send(command)
    }

    /// Print the input prompt marker.
    pub fn print_prompt() {
        Self::write_prompt(&mut io::stdout());
    }

    fn write_prompt(out: &mut impl Write) {
        let _ = write!(out, "> ");
        let _ = out.flush();
    }

    pub fn print_status(message: &str) {
        println!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_is_generate() {
        assert_eq!(
            PromptInput::parse_input("a dragon over mountains"),
            Some(PromptCommand::Generate("a dragon over mountains".to_string()))
        );
    }

    #[test]
    fn test_parse_keeps_short_text_for_validation() {
        assert_eq!(
            PromptInput::parse_input("hi"),
            Some(PromptCommand::Generate("hi".to_string()))
        );
    }

    #[test]
    fn test_parse_blank_input_is_an_empty_prompt() {
        assert_eq!(
            PromptInput::parse_input(""),
            Some(PromptCommand::Generate(String::new()))
        );
        assert_eq!(
            PromptInput::parse_input("   \t"),
            Some(PromptCommand::Generate(String::new()))
        );
    }

    #[test]
    fn test_listen_reprints_marker_after_every_line() {
        let input = io::Cursor::new("a cat on a skateboard\n\n/help\n");
        let mut out = Vec::new();
        let (tx, rx) = mpsc::channel();

        PromptInput::listen(input, &mut out, &tx);

        assert_eq!(String::from_utf8(out).unwrap(), "> > > > ");
        let commands: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            commands,
            vec![
                PromptCommand::Generate("a cat on a skateboard".to_string()),
                PromptCommand::Generate(String::new()),
                PromptCommand::Help,
                PromptCommand::Quit,
            ]
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(PromptInput::parse_input("/another"), Some(PromptCommand::Another));
        assert_eq!(PromptInput::parse_input("/DOWNLOAD"), Some(PromptCommand::Download));
        assert_eq!(PromptInput::parse_input("  /abort  "), Some(PromptCommand::Abort));
        assert_eq!(PromptInput::parse_input("/health"), Some(PromptCommand::Health));
        assert_eq!(PromptInput::parse_input("/help"), Some(PromptCommand::Help));
        assert_eq!(PromptInput::parse_input("/q"), Some(PromptCommand::Quit));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(PromptInput::parse_input("/frobnicate"), None);
    }

    #[test]
    fn test_send_delivers_to_receiver() {
        let (tx, rx) = mpsc::channel();
        let input = PromptInput { tx };
        input.send(PromptCommand::Abort).unwrap();
        assert_eq!(rx.recv().unwrap(), PromptCommand::Abort);
    }
}
