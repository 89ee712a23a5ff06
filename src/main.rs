//! pbl-planner - Line-oriented chat over stdin.
//!
//! Each line is one message for the current thread. Commands:
//!
//! - `/new` starts a fresh thread
//! - `/lang <code>` switches the language for the next thread
//! - `/profile <text>` sets the class profile for the next thread
//! - `/refine <change>` refines the most recently saved project
//! - `/history` lists the versions of that project
//! - `/quit` exits

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use pbl_planner::adapters::{
    AnthropicGenerationClient, FileDocumentStore, InMemoryCheckpointStore,
    InMemoryDocumentStore, MockGenerationClient, PresetLocalizer, StaticContentCatalog,
};
use pbl_planner::application::{
    Emitter, GetVersionHistoryHandler, GetVersionHistoryQuery, HandleMessageCommand,
    PipelineSettings, RefineProjectCommand, RefineProjectHandler, SessionRunner, StepContext,
};
use pbl_planner::config::{AppConfig, GenerationProvider, StorageBackend};
use pbl_planner::domain::conversation::RunOutcome;
use pbl_planner::domain::foundation::{DocumentId, Language, SessionId, ThreadId};
use pbl_planner::ports::{DocumentStore, GenerationClient};

/// Chat loop state that outlives a single thread.
struct Chat {
    thread_id: ThreadId,
    session_id: SessionId,
    language: Language,
    class_profile: String,
    last_document: Option<DocumentId>,
}

impl Chat {
    fn new(language: Language) -> Self {
        Self {
            thread_id: ThreadId::new(),
            session_id: SessionId::new(),
            language,
            class_profile: String::new(),
            last_document: None,
        }
    }

    fn restart(&mut self) {
        self.thread_id = ThreadId::new();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    config.logging.init_tracing()?;

    let generation: Arc<dyn GenerationClient> = match config.generation.provider {
        GenerationProvider::Mock => Arc::new(MockGenerationClient::demo()),
        GenerationProvider::Anthropic => {
            let settings = config
                .generation
                .anthropic()
                .ok_or("generation API key is not configured")?;
            match AnthropicGenerationClient::new(settings) {
                Ok(client) => Arc::new(client),
                Err(err) => {
                    error!(error = %err, "failed to construct generation client");
                    return Err(err.into());
                }
            }
        }
    };
    let documents: Arc<dyn DocumentStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryDocumentStore::new()),
        StorageBackend::File => Arc::new(FileDocumentStore::new(&config.storage.data_dir)),
    };
    info!(
        provider = ?config.generation.provider,
        storage = ?config.storage.backend,
        "pbl-planner starting"
    );

    let ctx = StepContext::new(
        generation,
        Arc::new(StaticContentCatalog::new()),
        Arc::clone(&documents),
        Arc::new(PresetLocalizer::new()),
    )
    .with_settings(PipelineSettings::from(&config.pipeline));
    let runner = SessionRunner::new(ctx.clone(), Arc::new(InMemoryCheckpointStore::new()));
    let refiner = RefineProjectHandler::new(ctx);
    let history = GetVersionHistoryHandler::new(documents);

    let mut chat = Chat::new(config.pipeline.default_language);
    println!("Describe the project you have in mind (topic, grade level, duration).");
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').unwrap_or((line, "")) {
            ("", _) => {}
            ("/quit", _) => break,
            ("/new", _) => {
                chat.restart();
                println!("Started a new conversation.");
            }
            ("/lang", code) => match code.parse::<Language>() {
                Ok(language) => {
                    chat.language = language;
                    chat.restart();
                    println!("Language set to {}. Started a new conversation.", language);
                }
                Err(err) => {
                    warn!(error = %err, "rejected language switch");
                    println!("{}", unsupported_language_hint());
                }
            },
            ("/profile", text) => {
                chat.class_profile = text.to_string();
                chat.restart();
                println!("Class profile saved. Started a new conversation.");
            }
            ("/refine", change) => refine(&refiner, &mut chat, change).await,
            ("/history", _) => show_history(&history, &chat).await,
            _ => send(&runner, &mut chat, line).await,
        }
        prompt();
    }

    Ok(())
}

fn unsupported_language_hint() -> String {
    let codes: Vec<_> = Language::ALL.iter().map(|l| l.code()).collect();
    format!("Unsupported language. Use one of: {}.", codes.join(", "))
}

fn prompt() {
    print!("\n> ");
    let _ = std::io::stdout().flush();
}

/// Prints emissions as they arrive until the returned emitter is dropped.
fn printer() -> (Emitter, tokio::task::JoinHandle<()>) {
    let (emit, mut rx) = Emitter::channel();
    let handle = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            print!("{}", text);
            let _ = std::io::stdout().flush();
        }
    });
    (emit, handle)
}

async fn send(runner: &SessionRunner, chat: &mut Chat, message: &str) {
    let cmd = HandleMessageCommand::new(chat.thread_id, message)
        .with_session(chat.session_id)
        .with_language(chat.language)
        .with_class_profile(chat.class_profile.clone());

    let (emit, printing) = printer();
    let outcome = runner.handle(cmd, &emit).await;
    drop(emit);
    let _ = printing.await;

    match outcome {
        Ok(RunOutcome::Done { document_id, .. }) => {
            if document_id.is_some() {
                chat.last_document = document_id;
            }
            chat.restart();
            println!("\n\nType /refine <change> to edit this project, or describe a new one.");
        }
        Ok(RunOutcome::Suspended { .. }) => {}
        Err(err) => {
            error!(error = %err, thread_id = %chat.thread_id, "message handling failed");
            chat.restart();
            println!("\nSomething went wrong; starting a new conversation.");
        }
    }
}

async fn refine(refiner: &RefineProjectHandler, chat: &mut Chat, change: &str) {
    let Some(source) = chat.last_document else {
        println!("There is no saved project to refine yet.");
        return;
    };
    let cmd = RefineProjectCommand {
        session_id: Some(chat.session_id),
        class_profile: Some(chat.class_profile.clone()).filter(|p| !p.is_empty()),
        ..RefineProjectCommand::new(change)
            .with_source(source)
            .with_language(chat.language)
    };

    let (emit, printing) = printer();
    let result = refiner.handle(cmd, &emit).await;
    drop(emit);
    let _ = printing.await;

    match result {
        Ok(result) => {
            if let Some(id) = result.updated_document_id {
                chat.last_document = Some(id);
            }
        }
        Err(err) => error!(error = %err, "refinement failed"),
    }
}

async fn show_history(history: &GetVersionHistoryHandler, chat: &Chat) {
    let Some(document_id) = chat.last_document else {
        println!("There is no saved project yet.");
        return;
    };
    match history.handle(GetVersionHistoryQuery { document_id }).await {
        Ok(chain) => {
            for doc in chain {
                println!(
                    "v{} {} {}",
                    doc.version,
                    doc.id,
                    doc.change_request.as_deref().unwrap_or("(original selection)")
                );
            }
        }
        Err(err) => {
            error!(error = %err, document_id = %document_id, "history lookup failed");
            println!("Could not load the history right now.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_hint_lists_supported_codes() {
        let err = "xx".parse::<Language>().unwrap_err();
        let hint = unsupported_language_hint();

        assert_eq!(hint, "Unsupported language. Use one of: en, es, fr.");
        assert!(!hint.contains(&err.to_string()));
    }
}
