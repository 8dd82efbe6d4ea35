use crate::cli::Commands;
use quill_core::storage::SnippetStore;
use quill_core::{JsonStore, QuillError, Result, Snippet, SnippetBody};
use quill_daemon::{daemon_status, daemon_worker_entry, start_daemon, stop_daemon};

pub fn handle_command(command: Option<Commands>) -> Result<()> {
    match command {
        Some(command) => handle_subcommand(command),
        None => list_snippets(),
    }
}

fn handle_subcommand(command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            key,
            value,
            regex,
            dynamic,
        } => add_snippet(key, value, regex, dynamic),
        Commands::Delete { id } => {
            let store = JsonStore::open_default()?;
            store.delete_snippet(id)?;
            println!("Snippet {} deleted", id);
            Ok(())
        }
        Commands::Update { id, key, value } => update_snippet(id, key, value),
        Commands::Activate { id } => set_active(id, true),
        Commands::Deactivate { id } => set_active(id, false),
        Commands::List => list_snippets(),
        Commands::Start => start_daemon(),
        Commands::Stop => stop_daemon(),
        Commands::Status => daemon_status(),
        Commands::DaemonWorker => daemon_worker_entry(),
    }
}

fn add_snippet(key: String, value: String, regex: bool, dynamic: bool) -> Result<()> {
    let store = JsonStore::open_default()?;
    let mut snippet = if dynamic {
        Snippet::dynamic(0, key, value)
    } else {
        Snippet::literal(0, key, value)
    };
    snippet.regex = regex;
    store.add_snippet(snippet)?;
    println!("Snippet added successfully");
    Ok(())
}

fn update_snippet(id: u64, key: Option<String>, value: Option<String>) -> Result<()> {
    if key.is_none() && value.is_none() {
        return Err(QuillError::InvalidConfig(
            "update needs --key and/or --value".to_string(),
        ));
    }

    let store = JsonStore::open_default()?;
    let mut snippet = store
        .snippets()
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| QuillError::SnippetNotFound(id.to_string()))?;

    if let Some(key) = key {
        snippet.key = key;
    }
    if let Some(value) = value {
        snippet.body = match snippet.body {
            SnippetBody::Literal(_) => SnippetBody::Literal(value),
            SnippetBody::DynamicCode(_) => SnippetBody::DynamicCode(value),
        };
    }

    store.update_snippet(snippet)?;
    println!("Snippet {} updated", id);
    Ok(())
}

fn set_active(id: u64, active: bool) -> Result<()> {
    let store = JsonStore::open_default()?;
    store.set_snippet_active(id, active)?;
    println!(
        "Snippet {} {}",
        id,
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}

fn list_snippets() -> Result<()> {
    let store = JsonStore::open_default()?;
    let snippets = store.snippets();

    if snippets.is_empty() {
        println!("No snippets configured. Add one with 'quill add'.");
        return Ok(());
    }

    println!("{:<5} {:<8} {:<8} {:<14} TRIGGER", "ID", "ACTIVE", "REGEX", "TYPE");
    for snippet in snippets {
        println!(
            "{:<5} {:<8} {:<8} {:<14} {}",
            snippet.id,
            if snippet.active { "yes" } else { "no" },
            if snippet.regex { "yes" } else { "no" },
            snippet.body.type_name(),
            snippet.key,
        );
    }
    Ok(())
}
