//! docchat application binary - composition root.
//!
//! Ties the crates together into a terminal chat loop:
//! 1. Load configuration from TOML
//! 2. Build the HTTP document service
//! 3. Wire the upload and query orchestrators to a session context
//! 4. Run the REPL: /upload a document, then ask questions against it

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use docchat_chat::{
    AskOutcome, ChatError, Notifier, QueryOrchestrator, SessionContext, SessionStatus,
    UploadOrchestrator,
};
use docchat_client::{DocumentService, HttpDocumentService};
use docchat_core::{DocChatConfig, Role, Turn};

mod cli;
use cli::CliArgs;

/// Notifier that prints to the terminal, the REPL's stand-in for a dialog.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        println!("* {}", message);
    }
}

/// Render one transcript turn the way the chat pane shows it.
fn print_turn(turn: &Turn) {
    let label = match turn.role {
        Role::User => "You",
        Role::Assistant => "AI",
    };
    println!("{}: {}", label, turn.text);
    if !turn.citations.is_empty() {
        println!("  Sources:");
        for citation in &turn.citations {
            println!("  - Page {}: {}", citation.page, citation.snippet);
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /upload <path>  upload a document (starts a fresh session when one is ready)");
    println!("  /id             show the current doc_id");
    println!("  /history        show the conversation so far");
    println!("  /new            discard the session and start over");
    println!("  /help           show this help");
    println!("  /quit           exit");
    println!("Anything else is asked as a question about the document.");
}

fn print_placeholder() {
    println!("Upload a document and ask something like \"Summarize page 1\".");
}

async fn run_upload(
    uploader: &UploadOrchestrator,
    ctx: &SessionContext,
    file: Option<PathBuf>,
) {
    if ctx.status() == SessionStatus::Uploading {
        println!("An upload is already in progress.");
        return;
    }
    if file.is_some() {
        println!("Uploading...");
    }
    match uploader.upload(ctx, file.as_deref()).await {
        // Both outcomes were already surfaced through the notifier.
        Ok(_) | Err(ChatError::UploadFailed(_)) => {}
        Err(e) => println!("* {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = DocChatConfig::load_or_default(&config_file);
    if let Some(server) = args.resolve_server() {
        config.server.base_url = server;
    }
    let log_level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting docchat v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(base_url = %config.server.base_url, "Using document service");

    let service: Arc<dyn DocumentService> = Arc::new(HttpDocumentService::new(&config.server));
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier);
    let uploader = UploadOrchestrator::new(Arc::clone(&service), Arc::clone(&notifier));
    let asker = QueryOrchestrator::new(Arc::clone(&service), Arc::clone(&notifier));

    // One context per document; /new and a re-upload replace it wholesale.
    let mut ctx = Arc::new(SessionContext::new());

    if let Some(file) = args.file.clone() {
        run_upload(&uploader, &ctx, Some(file)).await;
    }

    println!("docchat — chat with a document. Type /help for commands.");
    if ctx.transcript_is_empty() {
        print_placeholder();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();

        if line == "/upload" || line.starts_with("/upload ") {
            let path = line["/upload".len()..].trim();
            if path.is_empty() {
                run_upload(&uploader, &ctx, None).await;
                continue;
            }
            if ctx.status() == SessionStatus::Ready {
                // No transition out of Ready: a re-upload gets a fresh
                // session, discarding the old transcript.
                ctx = Arc::new(SessionContext::new());
                println!("Starting a fresh session for the new document.");
            }
            run_upload(&uploader, &ctx, Some(PathBuf::from(path))).await;
        } else if line == "/id" {
            match ctx.document_id() {
                Some(id) => println!("doc_id: {}", id),
                None => println!("doc_id: (upload a document)"),
            }
        } else if line == "/history" {
            let transcript = ctx.transcript();
            if transcript.is_empty() {
                print_placeholder();
            } else {
                for turn in transcript.turns() {
                    print_turn(turn);
                }
            }
        } else if line == "/new" {
            ctx = Arc::new(SessionContext::new());
            println!("Session discarded.");
            print_placeholder();
        } else if line == "/help" {
            print_help();
        } else if line == "/quit" || line == "/exit" {
            break;
        } else if line.starts_with('/') {
            println!("Unknown command: {}. Type /help.", line);
        } else {
            match asker.ask(&ctx, &line).await {
                Ok(AskOutcome::Answered) | Ok(AskOutcome::Failed) => {
                    if let Some(turn) = ctx.transcript().last() {
                        print_turn(turn);
                    }
                }
                Ok(AskOutcome::Busy) => {
                    println!("Still answering the previous question...");
                }
                Ok(AskOutcome::Ignored) => {}
                Err(ChatError::DocumentNotReady) => {
                    println!("Upload a document first.");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Ask failed unexpectedly");
                    println!("* {}", e);
                }
            }
        }
    }

    tracing::info!("docchat exiting");
    Ok(())
}
