//! notely: terminal front end for a Note Store.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use notely_client::{
    AiDispatcher, ClientConfig, CredentialStore, NoteListController, NoteStoreClient,
    Notification, RevisionRequest, RevisionStatus,
};
use notely_core::{
    format_timestamp, logging, Error, HistoryEntry, HistoryView, Note, NoteId, NoteInput, NoteStore,
    NoteType, Provider, TagFilter, TypeFilter,
};
use notely_inference::ProviderClient;

#[derive(Parser)]
#[command(name = "notely")]
#[command(author, version, about = "Notes with AI conversation history")]
#[command(propagate_version = true)]
struct Cli {
    /// Client config file (default: ~/.config/notely/client.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Note Store base URL, overriding the config file
    #[arg(long, global = true)]
    store_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes, optionally filtered
    List {
        /// Case-insensitive title substring
        #[arg(short, long, default_value = "")]
        query: String,

        /// Only notes with this exact tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Only notes of this type
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
    },

    /// Show one note and its history
    Show {
        id: NoteId,

        /// Show every history entry instead of the first few
        #[arg(short, long)]
        all: bool,
    },

    /// Create a note
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        #[arg(long)]
        tag: Option<String>,

        #[arg(long = "type", value_enum, default_value = "normal")]
        kind: KindArg,

        /// Provider for a prompt note (gpt-4o, claude, gemini, ...)
        #[arg(long)]
        target: Option<String>,
    },

    /// Edit a note's fields; omitted fields are kept
    Edit {
        id: NoteId,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        target: Option<String>,
    },

    /// Delete a note and its history
    Delete { id: NoteId },

    /// Send a prompt note to its provider and record the reply
    Send { id: NoteId },

    /// Ask the store to revise a note
    Revise {
        id: NoteId,

        /// What to change, e.g. "fix grammar"
        text: String,
    },

    /// Print the full history of a note
    History { id: NoteId },

    /// Search title, content and tag on the store
    Search { query: String },

    /// Export all notes
    Export {
        #[arg(value_enum)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import notes from a JSON array file
    Import { file: PathBuf },

    /// Manage provider API keys
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Store an API key for a provider
    SetKey { provider: String, key: String },

    /// Remove a provider's API key
    ClearKey { provider: String },

    /// Show the effective configuration
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Normal,
    Prompt,
}

impl From<KindArg> for NoteType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Normal => NoteType::Normal,
            KindArg::Prompt => NoteType::Prompt,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(notification) => {
            if let Some(n) = notification {
                println!("{}", n);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let notification = match e.downcast_ref::<Error>() {
                Some(err) => Notification::from(err),
                None => Notification::error(format!("{:#}", e)),
            };
            eprintln!("{}", notification);
            ExitCode::FAILURE
        }
    }
}

/// Compact stderr logging, quiet unless RUST_LOG says otherwise.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging::DEFAULT_CLI_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::load()?,
    };
    if let Some(url) = &cli.store_url {
        config.store_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<Option<Notification>> {
    let config = load_config(&cli)?;

    if let Commands::Config { action } = &cli.command {
        return cmd_config(&config, action);
    }

    let client = Arc::new(NoteStoreClient::from_config(&config)?);
    let mut controller = NoteListController::new(client.clone());

    let notification = match cli.command {
        Commands::List { query, tag, kind } => {
            controller.refresh().await?;
            controller.set_query(query);
            if let Some(tag) = tag {
                controller.set_tag(TagFilter::Exact(tag));
            }
            if let Some(kind) = kind {
                controller.set_type(TypeFilter::Exact(kind.into()));
            }
            print_list(controller.displayed());
            None
        }
        Commands::Show { id, all } => {
            controller.refresh().await?;
            let note = controller
                .find(id)
                .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))?;
            print_note(note, all);
            None
        }
        Commands::Add {
            title,
            content,
            tag,
            kind,
            target,
        } => {
            let input = NoteInput::new(title, content)
                .with_tag(tag.unwrap_or_default())
                .with_kind(kind.into())
                .with_prompt_target(target.as_deref().map(Provider::from));
            let note = controller.create(input).await?;
            print_list(controller.displayed());
            Some(Notification::success(format!("Created note {}", note.id)))
        }
        Commands::Edit {
            id,
            title,
            content,
            tag,
            target,
        } => {
            controller.refresh().await?;
            let draft = controller.begin_edit(id)?;
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(content) = content {
                draft.content = content;
            }
            if let Some(tag) = tag {
                draft.tag = tag;
            }
            if let Some(target) = target {
                draft.prompt_target = Some(Provider::from(target.as_str()));
            }
            let note = controller.save_edit().await?;
            print_list(controller.displayed());
            Some(Notification::success(format!("Updated note {}", note.id)))
        }
        Commands::Delete { id } => {
            let ack = controller.delete(id).await?;
            print_list(controller.displayed());
            Some(Notification::success(ack.message))
        }
        Commands::Send { id } => {
            let credentials = CredentialStore::open(config.credentials_path())?;
            let dispatcher = AiDispatcher::new(
                client.clone(),
                config.registry()?,
                ProviderClient::new(config.provider_timeout())?,
                Arc::new(credentials),
            );
            controller.refresh().await?;
            let outcome = controller.send_to_ai(&dispatcher, id).await?;
            println!("{}", outcome.reply);
            Some(Notification::success(format!(
                "Reply from {} saved to history",
                outcome.provider
            )))
        }
        Commands::Revise { id, text } => {
            let request = RevisionRequest::new(id).with_input(text);
            match controller.revise(&request).await? {
                RevisionStatus::Submitted(reply) => {
                    println!("{}", reply.ai_response);
                    Some(Notification::success(reply.message))
                }
                RevisionStatus::Ignored => Some(Notification::info("Nothing to revise")),
                RevisionStatus::Busy => {
                    Some(Notification::info("A revision is already in progress"))
                }
            }
        }
        Commands::History { id } => {
            let history = client.full_history(id).await?;
            print_history(&history);
            None
        }
        Commands::Search { query } => {
            let notes = client.search_notes(&query).await?;
            print_list(&notes);
            None
        }
        Commands::Export { format, output } => {
            let body = match format {
                ExportFormat::Csv => client.export_csv().await?,
                ExportFormat::Json => serde_json::to_string_pretty(&client.export_json().await?)
                    .context("Failed to encode export")?,
            };
            match output {
                Some(path) => {
                    write_file(&path, &body)?;
                    Some(Notification::success(format!(
                        "Exported to {}",
                        path.display()
                    )))
                }
                None => {
                    println!("{}", body);
                    None
                }
            }
        }
        Commands::Import { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let notes = client.import_json_str(&raw).await?;
            controller.refresh().await?;
            print_list(controller.displayed());
            Some(Notification::success(format!(
                "Imported {} notes",
                notes.len()
            )))
        }
        Commands::Config { .. } => None,
    };
    Ok(notification)
}

fn cmd_config(
    config: &ClientConfig,
    action: &ConfigAction,
) -> anyhow::Result<Option<Notification>> {
    let mut store = CredentialStore::open(config.credentials_path())?;
    match action {
        ConfigAction::SetKey { provider, key } => {
            let provider = Provider::from(provider.as_str());
            store.set(&provider, key)?;
            Ok(Some(Notification::success(format!(
                "API key saved for {}",
                provider
            ))))
        }
        ConfigAction::ClearKey { provider } => {
            let provider = Provider::from(provider.as_str());
            let message = if store.remove(&provider)? {
                Notification::success(format!("API key removed for {}", provider))
            } else {
                Notification::info(format!("No API key stored for {}", provider))
            };
            Ok(Some(message))
        }
        ConfigAction::Show => {
            println!("store_url:        {}", config.store_url);
            println!("timeout:          {}s", config.timeout_secs);
            println!("provider_timeout: {}s", config.provider_timeout_secs);
            println!("credentials:      {}", store.path().display());
            let registry = config.registry()?;
            for provider in Provider::known() {
                let endpoint = registry
                    .get(&provider)
                    .map(|e| e.url.as_str())
                    .unwrap_or("(no endpoint)");
                let key = if store.get(&provider).is_some() {
                    "key set"
                } else {
                    "no key"
                };
                println!("  {:<16} {:<8} {}", provider.as_str(), key, endpoint);
            }
            Ok(None)
        }
    }
}

fn write_file(path: &Path, body: &str) -> anyhow::Result<()> {
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_list(notes: &[Note]) {
    if notes.is_empty() {
        println!("No notes.");
        return;
    }
    for note in notes {
        let target = match (&note.prompt_target, note.is_prompt()) {
            (Some(p), true) => format!(" -> {}", p),
            _ => String::new(),
        };
        println!(
            "{:>5}  [{}] {}  ({}{})",
            note.id,
            note.tag,
            note.display_title(),
            note.kind,
            target
        );
    }
}

fn print_note(note: &Note, all: bool) {
    println!("#{} {}", note.id, note.display_title());
    println!("tag: {}  type: {}", note.tag, note.kind);
    if let Some(target) = note.prompt_target.as_ref().filter(|_| note.is_prompt()) {
        println!("target: {}", target);
    }
    println!();
    println!("{}", note.display_content());

    if note.ai_history.is_empty() {
        return;
    }
    println!();
    let view = HistoryView::new(&note.ai_history).expanded(all);
    print_history(view.visible());
    if view.has_more() {
        println!("... {} more (use --all)", view.hidden_count());
    }
}

fn print_history(entries: &[HistoryEntry]) {
    for entry in entries {
        println!(
            "[{}] {}: {}",
            format_timestamp(entry.timestamp.as_ref()),
            entry.role,
            entry.text
        );
    }
}
