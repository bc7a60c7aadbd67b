// Interactive query console
//
// Readline loop with history and editing support. Non-command lines are
// executed as SurrealQL; slash commands control the connection. A background
// reconnect task keeps probing while the console is open.

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::client::{Connection, ConnectionState};

use super::examples::EXAMPLE_QUERIES;

pub struct Repl {
    connection: Connection,
    editor: DefaultEditor,
    history_path: PathBuf,
}

impl Repl {
    /// Create a new console with history support.
    pub fn new(connection: Connection) -> Result<Self> {
        let mut editor = DefaultEditor::new().context("Failed to initialize readline editor")?;

        // History path: ~/.surq/history.txt
        let history_path = dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(".surq")
            .join("history.txt");

        // Load existing history if available
        if history_path.exists() {
            let _ = editor.load_history(&history_path);
        }

        Ok(Self {
            connection,
            editor,
            history_path,
        })
    }

    /// Run the interactive console loop.
    pub async fn run(mut self) -> Result<()> {
        println!("surq console");
        println!("Type /help for commands, /exit to quit");

        self.connection.start_reconnect_task();
        self.connection.probe().await;
        self.print_status();

        loop {
            match self.editor.readline("surq> ") {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }

                    self.editor
                        .add_history_entry(&line)
                        .context("Failed to add history entry")?;

                    if line.starts_with('/') {
                        if self.handle_command(&line).await? {
                            break;
                        }
                        continue;
                    }

                    self.run_query(&line).await;
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    return Err(err).context("Failed to read input");
                }
            }
        }

        self.connection.shutdown();
        self.save_history()?;

        Ok(())
    }

    /// Execute one query line and render the result.
    async fn run_query(&self, query: &str) {
        let result = self.connection.execute(query).await;

        if let Some(error) = &result.error {
            println!("{}", error.to_string().red());
            return;
        }

        if let Some(execution_time_ms) = result.execution_time_ms {
            println!("{}", format!("{:.2}ms", execution_time_ms).green());
        }

        if let Some(payload) = &result.payload {
            match serde_json::to_string_pretty(payload) {
                Ok(pretty) => println!("{}", pretty),
                Err(_) => println!("{}", payload),
            }
        }
    }

    /// Handle console commands. Returns true when exit was requested.
    async fn handle_command(&mut self, command: &str) -> Result<bool> {
        match command {
            "/exit" | "/quit" => {
                println!("Goodbye!");
                return Ok(true);
            }
            "/help" => {
                self.show_help();
            }
            "/status" => {
                self.print_status();
            }
            "/reconnect" => {
                println!("Reconnecting...");
                self.connection.probe().await;
                self.print_status();
            }
            "/examples" => {
                println!("Example queries:");
                for example in EXAMPLE_QUERIES {
                    println!("  {}", example);
                }
            }
            "/clear" => {
                use crossterm::terminal::{Clear, ClearType};
                use crossterm::{cursor::MoveTo, execute};
                use std::io::Write;

                let mut stdout = std::io::stdout();
                execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))
                    .context("Failed to clear screen")?;
                stdout.flush().context("Failed to flush stdout")?;
            }
            _ => {
                println!("Unknown command: {}", command);
                println!("Type /help for available commands");
            }
        }

        Ok(false)
    }

    /// Render the connection status chip and any recorded error.
    fn print_status(&self) {
        let chip = match self.connection.state() {
            ConnectionState::Connected => "Connected".green(),
            ConnectionState::Connecting => "Connecting...".yellow(),
            ConnectionState::Disconnected => "Disconnected".red(),
        };
        println!("Status: {}", chip);

        if let Some(error) = self.connection.last_error() {
            println!("{}", error.to_string().red());
        }
    }

    fn show_help(&self) {
        println!("Enter a SurrealQL query to execute it.");
        println!();
        println!("Available commands:");
        println!("  /help       - Show this help message");
        println!("  /status     - Show connection status");
        println!("  /reconnect  - Probe the endpoint again");
        println!("  /examples   - List example queries");
        println!("  /clear      - Clear the screen");
        println!("  /exit       - Exit the console");
    }

    /// Save history to disk.
    fn save_history(&mut self) -> Result<()> {
        if let Some(parent) = self.history_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        self.editor
            .save_history(&self.history_path)
            .with_context(|| {
                format!("Failed to save history to {}", self.history_path.display())
            })?;

        Ok(())
    }
}
