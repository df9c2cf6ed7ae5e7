use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tome_engine::Book;
use tome_util::{InMemorySessionStore, JsonSessionStore, SESSION_PATH_ENV, SessionStore};
use tracing::Level;

/// Terminal reader for generated multi-page books.
///
/// A book is a directory holding `toc.json` and one file per page. The
/// reader shows the current page next to a navigation sidebar that follows
/// the open chapter.
#[derive(Debug, Parser)]
#[command(name = "tome", version, about)]
struct Cli {
    /// Book directory containing toc.json and the page files
    book_dir: PathBuf,

    /// Book-relative page to open instead of the first chapter
    #[arg(long, value_name = "HREF")]
    page: Option<String>,

    /// Persist session state to this JSON file instead of process memory
    #[arg(long, value_name = "PATH")]
    session_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let book = Book::load(&cli.book_dir).with_context(|| format!("failed to open book at {}", cli.book_dir.display()))?;
    let session = build_session_store(cli.session_file)?;
    tome_tui::run(book, session, cli.page).await
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .try_init();
}

/// Selects the session store scope. The in-memory store ties the sidebar
/// scroll state to this process, which fits an interactive reader. A JSON
/// file (`--session-file`, or `TOME_SESSION_PATH` for the default location
/// override) lets one-page-per-invocation embeddings share the state across
/// processes.
fn build_session_store(session_file: Option<PathBuf>) -> Result<Arc<dyn SessionStore>> {
    let env_path = std::env::var(SESSION_PATH_ENV).ok().filter(|value| !value.trim().is_empty());
    if session_file.is_some() || env_path.is_some() {
        let store = JsonSessionStore::new(session_file).context("failed to open the session file")?;
        return Ok(Arc::new(store));
    }
    Ok(Arc::new(InMemorySessionStore::new()))
}
