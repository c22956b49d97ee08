//! REPL (Read-Eval-Print Loop) for the interview chat

use std::sync::Arc;

use anyhow::Result;
use coach_application::{InterviewConfig, SessionStore, TurnOutcome};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tracing::debug;

use crate::output::ConsoleRenderer;

/// Interactive interview REPL: one session per run.
pub struct ChatRepl {
    store: Arc<SessionStore>,
    config: InterviewConfig,
    quiet: bool,
}

impl ChatRepl {
    pub fn new(store: Arc<SessionStore>, config: InterviewConfig) -> Self {
        Self {
            store,
            config,
            quiet: false,
        }
    }

    /// Suppress the welcome banner.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Run the interview until it terminates or the user quits.
    pub async fn run(&self) -> Result<()> {
        if !self.quiet {
            self.print_welcome();
        }

        let session_id = self.store.create(self.config.clone()).await;
        debug!(%session_id, "interactive session created");

        let greeting = self.store.start(session_id).await?;
        println!("\n{}\n", ConsoleRenderer::format_interviewer_message(&greeting));

        let mut line_editor = Reedline::create();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("you".to_string()),
            DefaultPromptSegment::Empty,
        );

        loop {
            match line_editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line.starts_with('/') {
                        if self.handle_command(session_id, line).await? {
                            break;
                        }
                        continue;
                    }
                    if self.process(session_id, line).await? {
                        break;
                    }
                }
                Ok(Signal::CtrlC) => {
                    println!("^C (use /stop for feedback, /quit to leave)");
                }
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Input error: {err}");
                    break;
                }
            }
        }

        let _ = self.store.remove(session_id).await;
        Ok(())
    }

    /// Run one turn. Returns true when the session terminated.
    async fn process(
        &self,
        session_id: coach_application::SessionId,
        message: &str,
    ) -> Result<bool> {
        match self.store.process_message(session_id, message).await? {
            TurnOutcome::Reply(reply) => {
                println!("\n{}\n", ConsoleRenderer::format_interviewer_message(&reply));
                Ok(false)
            }
            TurnOutcome::Failed { message } => {
                println!("\n{}\n", ConsoleRenderer::format_failure(&message));
                Ok(false)
            }
            TurnOutcome::Finished { message, feedback } => {
                println!("\n{}", ConsoleRenderer::format_interviewer_message(&message));
                println!("{}", ConsoleRenderer::format_feedback(&feedback));
                Ok(true)
            }
        }
    }

    /// Handle slash commands. Returns true if the REPL should exit.
    async fn handle_command(
        &self,
        session_id: coach_application::SessionId,
        command: &str,
    ) -> Result<bool> {
        match command {
            "/stop" => {
                let feedback = self.store.force_stop(session_id).await?;
                println!("{}", ConsoleRenderer::format_feedback(&feedback));
                Ok(true)
            }
            "/quit" | "/exit" | "/q" => {
                println!("Bye! (no feedback generated)");
                Ok(true)
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /stop           - End the interview and get feedback");
                println!("  /quit, /q       - Leave without feedback");
                println!("  /help, /h, /?   - Show this help");
                println!();
                Ok(false)
            }
            _ => {
                println!("Unknown command: {command} (try /help)");
                Ok(false)
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("+---------------------------------------------+");
        println!("|        interview-coach - Chat Mode          |");
        println!("+---------------------------------------------+");
        println!();
        println!("Model: {}   Max turns: {}", self.config.model, self.config.max_turns);
        println!("Answer the interviewer, or /stop to end and get your feedback.");
        println!();
    }
}
