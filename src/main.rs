use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pdfqa::pdf::extract_pdf;
use pdfqa::session::{source_name, Session, SessionState, Tab, View};
use pdfqa::ui::{RecordingView, Repl, TerminalView, HELP};
use pdfqa::{LlmConfig, ModelParams, PdfQaError, Task, DEFAULT_MODEL};

#[derive(Parser, Debug)]
#[command(name = "pdfqa", version, about = "Summarize a PDF and ask questions about it")]
struct Cli {
    #[command(flatten)]
    llm: LlmArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct LlmArgs {
    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = "PDFQA_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.3, global = true)]
    temperature: f64,

    /// Maximum output tokens for summaries
    #[arg(long, default_value_t = 2048, global = true)]
    summary_max_tokens: u64,

    /// Maximum output tokens for answers
    #[arg(long, default_value_t = 1024, global = true)]
    answer_max_tokens: u64,
}

impl From<&LlmArgs> for LlmConfig {
    fn from(args: &LlmArgs) -> Self {
        LlmConfig::new()
            .with_model(args.model.clone())
            .with_temperature(args.temperature)
            .with_summary_max_tokens(args.summary_max_tokens)
            .with_answer_max_tokens(args.answer_max_tokens)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive session (the default)
    Interactive {
        /// PDF to upload at start
        file: Option<PathBuf>,
    },
    /// Print a bullet-point summary of a PDF
    Summarize {
        file: PathBuf,
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Answer a question about a PDF
    Ask {
        file: PathBuf,
        question: String,
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the text extracted from a PDF
    Text { file: PathBuf },
}

#[derive(Serialize)]
struct Report<'a> {
    source: &'a str,
    pages: usize,
    task: &'a Task,
    params: ModelParams,
    result: &'a str,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pdfqa=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = LlmConfig::from(&cli.llm);
    let mut session = Session::groq(config.clone());
    let mut view = TerminalView;

    match cli.command.unwrap_or(Commands::Interactive { file: None }) {
        Commands::Interactive { file } => {
            println!("📄 PDF Summarizer & Q&A\n\n{}\n", HELP);
            if let Some(key) = &cli.llm.api_key {
                session.set_api_key(key, &mut view);
            }
            if let Some(file) = &file {
                session.upload_path(file, &mut view);
            }

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            match Repl::new(&mut session, &mut view).run(stdin).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: failed to read input: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Summarize { file, json } => {
            if json {
                let mut quiet = RecordingView::new();
                let summary = if prepare(&mut session, &mut quiet, &cli.llm, &file) {
                    session.summarize(&mut quiet).await
                } else {
                    None
                };
                report(
                    &session,
                    &config,
                    &Task::Summarize,
                    summary.as_deref(),
                    &quiet,
                )
            } else {
                let ok = prepare(&mut session, &mut view, &cli.llm, &file)
                    && session.summarize(&mut view).await.is_some();
                exit_code(ok)
            }
        }
        Commands::Ask {
            file,
            question,
            json,
        } => {
            if json {
                let mut quiet = RecordingView::new();
                let answer = if prepare(&mut session, &mut quiet, &cli.llm, &file) {
                    session.answer(&question, &mut quiet).await
                } else {
                    None
                };
                let task = Task::Answer {
                    question: question.trim().to_string(),
                };
                report(&session, &config, &task, answer.as_deref(), &quiet)
            } else {
                let ok = prepare(&mut session, &mut view, &cli.llm, &file)
                    && session.answer(&question, &mut view).await.is_some();
                exit_code(ok)
            }
        }
        Commands::Text { file } => {
            // extraction alone needs no API key
            let extracted = std::fs::read(&file)
                .map_err(PdfQaError::from)
                .and_then(|bytes| extract_pdf(&source_name(&file), &bytes));
            match extracted {
                Ok(document) => {
                    view.render(Tab::OriginalText, document.as_str());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    view.error(&format!("Error processing PDF: {}", e.detail()));
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Enter the key and upload `file`; true once the session is ready.
fn prepare(session: &mut Session, view: &mut dyn View, llm: &LlmArgs, file: &Path) -> bool {
    session.set_api_key(llm.api_key.as_deref().unwrap_or(""), view);
    if session.state() == SessionState::AwaitingApiKey {
        return false;
    }
    session.upload_path(file, view) == SessionState::Ready
}

fn report(
    session: &Session,
    config: &LlmConfig,
    task: &Task,
    result: Option<&str>,
    notices: &RecordingView,
) -> ExitCode {
    let (Some(document), Some(result)) = (session.document(), result) else {
        for message in notices.warnings().into_iter().chain(notices.errors()) {
            eprintln!("{}", message);
        }
        return ExitCode::FAILURE;
    };

    let report = Report {
        source: &document.source,
        pages: document.page_count,
        task,
        params: config.params_for(task),
        result,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
