//! REPL (Read-Eval-Print Loop) for interactive chat

use super::session::run_prompt;
use crate::output::control_hint;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use std::sync::Arc;
use streamchat_application::{GenerationController, StreamTransport, SubmitError};
use streamchat_domain::EngineSelection;

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Quit,
    Clear,
    Models,
    /// `/service [name]`: show or switch the engine service
    Service(Option<String>),
    /// `/model [name]`: show or switch the model
    Model(Option<String>),
    State,
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };
        Some(match name {
            "help" | "h" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            "clear" => ReplCommand::Clear,
            "models" => ReplCommand::Models,
            "service" => ReplCommand::Service(arg),
            "model" => ReplCommand::Model(arg),
            "state" => ReplCommand::State,
            _ => ReplCommand::Unknown(line.to_string()),
        })
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    controller: GenerationController,
    transport: Arc<dyn StreamTransport>,
    engine: EngineSelection,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(controller: GenerationController, transport: Arc<dyn StreamTransport>) -> Self {
        Self {
            controller,
            transport,
            engine: EngineSelection::default(),
            history_path: dirs::data_dir().map(|p| p.join("streamchat").join("history.txt")),
        }
    }

    pub fn with_engine(mut self, engine: EngineSelection) -> Self {
        self.engine = engine;
        self
    }

    /// Override the readline history file.
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.history_path = path;
        }
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command).await {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_prompt(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn engine_label(&self) -> String {
        format!(
            "{} / {}",
            self.engine.service().unwrap_or("default service"),
            self.engine.model().unwrap_or("default model")
        )
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│             streamchat - Chat Mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Conversation: {}   Engine: {}",
            self.controller.conversation_id(),
            self.engine_label()
        );
        println!("{} Ctrl-C while a reply streams stops it.", "Tip:".dimmed());
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /models           - List models of the current service");
        println!("  /service [name]   - Show or switch the engine service");
        println!("  /model [name]     - Show or switch the model");
        println!("  /clear            - Forget the conversation history");
        println!("  /state            - Show the session state");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => Self::print_help(),
            ReplCommand::Clear => {
                self.controller.clear_transcript();
                println!("History cleared.");
            }
            ReplCommand::Models => match self.transport.list_models(self.engine.service()).await {
                Ok(models) if models.is_empty() => println!("No models available."),
                Ok(models) => {
                    println!();
                    println!("Models ({}):", self.engine.service().unwrap_or("default service"));
                    for model in models {
                        let marker = if Some(model.as_str()) == self.engine.model() {
                            "*"
                        } else {
                            "-"
                        };
                        println!("  {} {}", marker, model);
                    }
                    println!();
                }
                Err(e) => eprintln!("{} {}", "Error:".red(), e),
            },
            ReplCommand::Service(Some(service)) => {
                self.engine.service = Some(service);
                self.engine.model = None;
                println!("Engine: {}", self.engine_label());
            }
            ReplCommand::Model(Some(model)) => {
                self.engine.model = Some(model);
                println!("Engine: {}", self.engine_label());
            }
            ReplCommand::Service(None) | ReplCommand::Model(None) => {
                println!("Engine: {}", self.engine_label());
            }
            ReplCommand::State => {
                let composer = self.controller.composer();
                println!(
                    "State: {}   History: {} messages   ({})",
                    self.controller.state(),
                    self.controller.transcript().len(),
                    control_hint(composer)
                );
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn process_prompt(&self, prompt: &str) {
        println!();
        match run_prompt(&self.controller, prompt, self.engine.clone()).await {
            Ok(_) => {}
            Err(SubmitError::AlreadyActive) => {
                eprintln!("{} a reply is still being generated", "Busy:".yellow());
            }
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_is_not_a_command() {
        assert_eq!(ReplCommand::parse("hello /there"), None);
    }

    #[test]
    fn test_parse_commands_and_aliases() {
        assert_eq!(ReplCommand::parse("/q"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse(" /help "), Some(ReplCommand::Help));
        assert_eq!(ReplCommand::parse("/clear"), Some(ReplCommand::Clear));
        assert_eq!(ReplCommand::parse("/state"), Some(ReplCommand::State));
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            ReplCommand::parse("/model  llama3.1 "),
            Some(ReplCommand::Model(Some("llama3.1".to_string())))
        );
        assert_eq!(ReplCommand::parse("/service"), Some(ReplCommand::Service(None)));
        assert_eq!(
            ReplCommand::parse("/frobnicate now"),
            Some(ReplCommand::Unknown("/frobnicate now".to_string()))
        );
    }
}
