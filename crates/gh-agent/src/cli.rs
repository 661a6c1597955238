//! Interactive chat client (reedline REPL)
//!
//! Checks the session once on startup, then relays each line to `/chat`.

use std::borrow::Cow;

use gh_core::ClientConfig;
use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, KeyCode, KeyModifiers, Keybindings,
    MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, Span, Suggestion, default_emacs_keybindings,
};
use tracing::info;

use crate::client::ServerClient;

/// Available commands for autocomplete display
const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show this help"),
    ("/login", "Show the login URL"),
    ("/logout", "Forget the stored GitHub token"),
    ("/exit", "Quit"),
    ("/quit", "Quit"),
];

const COMMAND_MENU: &str = "command_menu";

/// Command completer for reedline
#[derive(Clone)]
pub struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if !line.starts_with('/') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                extra: None,
                span: Span::new(0, pos),
                append_whitespace: false,
                style: None,
            })
            .collect()
    }
}

/// "You: " prompt with colored styling
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint("You: ").to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// What a line of input asks for
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Empty,
    Quit,
    Help,
    Login,
    Logout,
    Unknown(&'a str),
    Chat(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let input = line.trim();
    if input.is_empty() {
        return Command::Empty;
    }

    match input.to_lowercase().as_str() {
        "exit" | "/exit" | "/quit" | "/q" => Command::Quit,
        "/help" | "/?" => Command::Help,
        "/login" => Command::Login,
        "/logout" => Command::Logout,
        lower if lower.starts_with('/') => Command::Unknown(input),
        _ => Command::Chat(input),
    }
}

/// Run the interactive chat client
pub async fn run_chat(config: ClientConfig) -> anyhow::Result<()> {
    let client = ServerClient::new(&config)?;

    print_welcome();

    if !check_auth(&client).await {
        println!("\nPlease restart this client after logging in.");
        return Ok(());
    }

    println!("\nYou can start chatting with the bot. Type 'exit' to quit.");
    println!("Examples: 'list my public repos' or 'create a repo named test-repo'");
    println!();

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name(COMMAND_MENU)
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );

    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(chat_keybindings())));

    let prompt = ColoredPrompt::new();
    let bot = Color::Green.bold().paint("Bot:");

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => match parse_command(&line) {
                Command::Empty => continue,
                Command::Quit => {
                    println!("Goodbye!");
                    break;
                }
                Command::Help => print_help(),
                Command::Login => {
                    println!("Visit this URL to authenticate: {}", client.login_url());
                }
                Command::Logout => match client.logout().await {
                    Ok(message) => println!("{}", message),
                    Err(e) => eprintln!("{}", e),
                },
                Command::Unknown(cmd) => {
                    eprintln!("Unknown command: {}. Type /help for the list.", cmd);
                }
                Command::Chat(text) => {
                    println!("{} Thinking...", bot);
                    let answer = match client.chat(text).await {
                        Ok(answer) => answer,
                        Err(e) => e.to_string(),
                    };
                    println!("{} {}\n", bot, answer);
                }
            },
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("\nError: {}\n", err);
                break;
            }
        }
    }

    Ok(())
}

/// Ask the server whether this user id has a valid token
async fn check_auth(client: &ServerClient) -> bool {
    match client.check_auth().await {
        Ok(status) if status.logged_in => {
            info!("Session is valid");
            println!("{}", status.user.unwrap_or_default());
            true
        }
        Ok(status) => {
            if let Some(error) = status.error {
                println!("{}", error);
            }
            println!("You are not logged in.");
            println!(
                "Please visit this URL to authenticate: {}",
                client.login_url()
            );
            false
        }
        Err(e) => {
            println!("{}", e);
            println!("Did you start the server (gh-agent)?");
            false
        }
    }
}

/// Keybindings for the chat prompt.
///
/// Printable keys stay unbound so the Emacs mode inserts them; `/` is needed
/// for commands and `owner/repo` names alike.
fn chat_keybindings() -> Keybindings {
    let mut keybindings = default_emacs_keybindings();
    // Tab opens the command menu, or moves through it once open
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu(COMMAND_MENU.to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings
}

fn print_welcome() {
    println!();
    println!("--- Welcome to the GitHub AI Agent ---");
    println!();
}

fn print_help() {
    println!();
    println!("Available commands:");
    for (cmd, desc) in COMMANDS {
        println!("  {:<8} {}", cmd, desc);
    }
    println!();
    println!("Press Tab after '/' to pick a command.");
    println!("Anything else is sent to the bot, e.g. 'show open issues in octocat/hello'.");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{Event, KeyEvent};
    use reedline::{EditCommand, EditMode, ReedlineRawEvent};

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(parse_command("exit"), Command::Quit);
        assert_eq!(parse_command("EXIT"), Command::Quit);
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/login"), Command::Login);
        assert_eq!(parse_command(" /logout "), Command::Logout);
        assert_eq!(parse_command("/merge"), Command::Unknown("/merge"));
        assert_eq!(
            parse_command("  list my repos "),
            Command::Chat("list my repos")
        );
    }

    fn key(code: KeyCode) -> ReedlineRawEvent {
        ReedlineRawEvent::try_from(Event::Key(KeyEvent::new(code, KeyModifiers::NONE))).unwrap()
    }

    #[test]
    fn test_slash_is_typed() {
        let mut emacs = Emacs::new(chat_keybindings());
        assert_eq!(
            emacs.parse_event(key(KeyCode::Char('/'))),
            ReedlineEvent::Edit(vec![EditCommand::InsertChar('/')])
        );
        assert_eq!(
            emacs.parse_event(key(KeyCode::Char('a'))),
            ReedlineEvent::Edit(vec![EditCommand::InsertChar('a')])
        );
    }

    #[test]
    fn test_tab_opens_command_menu() {
        let keybindings = chat_keybindings();
        assert_eq!(
            keybindings.find_binding(KeyModifiers::NONE, KeyCode::Tab),
            Some(ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("command_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]))
        );
        assert_eq!(
            keybindings.find_binding(KeyModifiers::CONTROL, KeyCode::Char('d')),
            Some(ReedlineEvent::CtrlD)
        );
        assert!(
            keybindings
                .find_binding(KeyModifiers::NONE, KeyCode::Backspace)
                .is_some()
        );
    }

    #[test]
    fn test_completer_only_for_commands() {
        let mut completer = CommandCompleter::new();
        assert!(completer.complete("list", 4).is_empty());

        let values: Vec<String> = completer
            .complete("/lo", 3)
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["/login", "/logout"]);
    }
}
