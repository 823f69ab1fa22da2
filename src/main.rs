use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use invfile::index::build::build_index_with_progress;
use invfile::index::stats::show_stats;
use invfile::index::types::ArtifactPaths;
use invfile::output::{TitleResolver, paginate, print_page};
use invfile::query::QueryEngine;
use invfile::shell::run_shell;
use invfile::utils::AppConfig;
use invfile::utils::progress::spinner;
use std::io;
use std::path::{Path, PathBuf};
use termcolor::{ColorChoice, StandardStream};

#[derive(Parser)]
#[command(name = "invfile")]
#[command(about = "Inverted-file document retrieval with tf-idf ranking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the one in the app data directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index artifacts from a tagged corpus
    Index {
        /// Corpus file to index
        corpus: PathBuf,

        /// Directory to write the artifacts into
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Suppress the progress spinner
        #[arg(short, long)]
        quiet: bool,
    },
    /// Rank documents against a keyword query
    Search {
        /// Query keywords
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,

        /// Directory holding the artifacts
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Raw corpus used to show titles
        #[arg(short, long)]
        corpus: Option<PathBuf>,

        /// Results per page
        #[arg(short = 'n', long)]
        page_size: Option<usize>,

        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Interactive query loop with paging
    Shell {
        /// Directory holding the artifacts
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Raw corpus used to show titles
        #[arg(short, long)]
        corpus: Option<PathBuf>,

        /// Results per page
        #[arg(short = 'n', long)]
        page_size: Option<usize>,
    },
    /// Show index statistics
    Stats {
        /// Directory holding the artifacts
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Number of most frequent terms to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Write the effective configuration to the app data directory
    InitConfig,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Commands::Index { corpus, out, quiet } => {
            let out_dir = config.resolve_index_dir(out)?;
            let stats = build_index_with_progress(&corpus, &out_dir, &config.index, quiet)
                .with_context(|| format!("Failed to index {}", corpus.display()))?;

            println!("Index stored at: {}", out_dir.display());
            println!("  Documents: {}", stats.document_count);
            println!("  Terms:     {}", stats.term_count);
            println!("  Postings:  {}", stats.posting_count);
        }
        Commands::Search {
            query,
            index,
            corpus,
            page_size,
            page,
            no_color,
        } => {
            let engine = load_engine(&config, index)?;
            let titles = title_resolver(&config, corpus);
            let ranked = engine.search(&query.join(" "));
            let shown = paginate(&ranked, page.saturating_sub(1), config.effective_page_size(page_size));
            print_page(&shown, titles.as_ref(), !no_color)?;
        }
        Commands::Shell {
            index,
            corpus,
            page_size,
        } => {
            let engine = load_engine(&config, index)?;
            let titles = title_resolver(&config, corpus);
            let mut stdout = StandardStream::stdout(ColorChoice::Auto);
            run_shell(
                &engine,
                titles.as_ref(),
                config.effective_page_size(page_size),
                io::stdin().lock(),
                &mut stdout,
            )?;
        }
        Commands::Stats { index, top } => {
            let index_dir = config.resolve_index_dir(index)?;
            let engine = load_from(&config, &index_dir)?;
            show_stats(&engine, &index_dir, top)?;
        }
        Commands::InitConfig => {
            let path = config.save()?;
            println!("Config written to: {}", path.display());
        }
    }

    Ok(())
}

fn load_engine(config: &AppConfig, index: Option<PathBuf>) -> Result<QueryEngine> {
    let index_dir = config.resolve_index_dir(index)?;
    load_from(config, &index_dir)
}

fn load_from(config: &AppConfig, index_dir: &Path) -> Result<QueryEngine> {
    let paths = ArtifactPaths::in_dir(index_dir, &config.index);
    let spinner = spinner("Loading index...".to_string(), false);
    let engine = QueryEngine::load(&paths);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    engine.with_context(|| {
        format!(
            "Failed to load index from {}. Run 'invfile index <corpus>' first.",
            index_dir.display()
        )
    })
}

fn title_resolver(config: &AppConfig, corpus: Option<PathBuf>) -> Option<TitleResolver> {
    corpus
        .or_else(|| config.corpus.clone())
        .map(|path| TitleResolver::new(path, config.index.clone()))
}
