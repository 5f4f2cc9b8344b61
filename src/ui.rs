//! Terminal front end: notice rendering and the interactive command loop.

use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::session::{Session, SessionState, Tab, View};

const RULE: &str = "────────────────────────────────────────";

/// Renders notices and tabs on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalView;

/// A tab's content framed by rules under its heading.
pub fn panel(tab: Tab, content: &str) -> String {
    let heading = match tab {
        Tab::Answer => "### Answer:".to_string(),
        other => format!("## {}", other.label()),
    };
    format!("{}\n{}\n{}\n{}", RULE, heading, content, RULE)
}

impl View for TerminalView {
    fn warning(&mut self, message: &str) {
        println!("⚠ {}", message);
    }

    fn error(&mut self, message: &str) {
        println!("✗ {}", message);
    }

    fn success(&mut self, message: &str) {
        println!("✓ {}", message);
    }

    fn render(&mut self, tab: Tab, content: &str) {
        println!("{}", panel(tab, content));
    }
}

/// One notice or render captured by [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Error(String),
    Success(String),
    Render(Tab, String),
}

/// A [`View`] that keeps everything it is shown, for tests and scripting.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub notices: Vec<Notice>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.notices
            .iter()
            .filter_map(|n| match n {
                Notice::Warning(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.notices
            .iter()
            .filter_map(|n| match n {
                Notice::Error(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The most recent content rendered into `tab`.
    pub fn rendered(&self, tab: Tab) -> Option<&str> {
        self.notices.iter().rev().find_map(|n| match n {
            Notice::Render(t, content) if *t == tab => Some(content.as_str()),
            _ => None,
        })
    }
}

impl View for RecordingView {
    fn warning(&mut self, message: &str) {
        self.notices.push(Notice::Warning(message.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.notices.push(Notice::Error(message.to_string()));
    }

    fn success(&mut self, message: &str) {
        self.notices.push(Notice::Success(message.to_string()));
    }

    fn render(&mut self, tab: Tab, content: &str) {
        self.notices.push(Notice::Render(tab, content.to_string()));
    }
}

pub const HELP: &str = "\
Commands:
  key <API_KEY>     enter your Groq API key
  open <PATH>       upload a PDF file
  summary           generate a summary
  ask <QUESTION>    ask a question about the document
  text              show the extracted text
  tabs              show every tab
  status            show the session state
  reset             forget the current document
  help              show this help
  quit              leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Key(String),
    Open(PathBuf),
    Summary,
    Ask(String),
    Text,
    Tabs,
    Status,
    Reset,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Command::Empty,
            "key" => Command::Key(rest.to_string()),
            "open" | "upload" => Command::Open(PathBuf::from(rest)),
            "summary" | "summarize" => Command::Summary,
            "ask" => Command::Ask(rest.to_string()),
            "text" => Command::Text,
            "tabs" => Command::Tabs,
            "status" => Command::Status,
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Interactive loop reading commands from `input`, one at a time.
pub struct Repl<'a> {
    session: &'a mut Session,
    view: &'a mut dyn View,
}

impl<'a> Repl<'a> {
    pub fn new(session: &'a mut Session, view: &'a mut dyn View) -> Self {
        Self { session, view }
    }

    /// Run until `quit` or end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> std::io::Result<()> {
        let mut lines = input.lines();
        self.prompt_for_next_step();

        while let Some(line) = lines.next_line().await? {
            if !self.execute(Command::parse(&line)).await {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command. Returns `false` when the loop should stop.
    pub async fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::Key(key) => {
                self.session.set_api_key(&key, self.view);
                self.prompt_for_next_step();
            }
            Command::Open(path) => {
                if path.as_os_str().is_empty() {
                    self.view.warning("Usage: open <PATH>");
                } else {
                    self.session.upload_path(&path, self.view);
                }
            }
            Command::Summary => {
                self.session.summarize(self.view).await;
            }
            Command::Ask(question) => {
                self.session.answer(&question, self.view).await;
            }
            Command::Text => {
                self.session.show_original_text(self.view);
            }
            Command::Tabs => self.render_tabs(),
            Command::Status => {
                let state = self.session.state();
                let detail = match self.session.document() {
                    Some(doc) => format!(
                        "Session {}: {} ({} pages, {} characters)",
                        state,
                        doc.source,
                        doc.page_count,
                        doc.char_count()
                    ),
                    None => format!("Session {}", state),
                };
                self.view.success(&detail);
            }
            Command::Reset => {
                self.session.reset();
                self.prompt_for_next_step();
            }
            Command::Help => self.view.success(HELP),
            Command::Quit => return false,
            Command::Empty => {}
            Command::Unknown(word) => {
                self.view
                    .warning(&format!("Unknown command '{}'. Type 'help' for commands.", word));
            }
        }
        true
    }

    fn render_tabs(&mut self) {
        if self.session.state() != SessionState::Ready {
            self.prompt_for_next_step();
            return;
        }
        for tab in Tab::ALL {
            let content = match tab {
                Tab::Summary => self.session.summary(),
                Tab::Answer => self.session.answer_text(),
                Tab::OriginalText => self.session.original_text(),
            };
            match content {
                Some(content) => self.view.render(tab, content),
                None => self.view.render(tab, "(nothing yet)"),
            }
        }
    }

    fn prompt_for_next_step(&mut self) {
        match self.session.state() {
            SessionState::AwaitingApiKey => self
                .view
                .warning("Please enter your Groq API key to continue: key <API_KEY>"),
            SessionState::AwaitingUpload => self.view.success("Upload your PDF file: open <PATH>"),
            SessionState::Ready => {}
        }
    }
}
