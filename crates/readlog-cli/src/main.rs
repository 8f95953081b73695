mod cmd;
mod output;
mod root;

use clap::{ArgGroup, Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "readlog",
    about = "Enrich reading-log front-matter with book metadata from ISBNdb",
    version,
    propagate_version = true
)]
struct Cli {
    /// Site root (default: auto-detect from readlog.yaml or .git/)
    #[arg(long, global = true, env = "READLOG_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill missing front-matter fields from ISBNdb and stamp updated_at
    Enrich {
        /// Records to enrich (default: every record in the content directory)
        files: Vec<PathBuf>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// List records and whether they have been enriched
    Status,

    /// Run a single metadata lookup and print the result
    #[command(group(ArgGroup::new("by").required(true).args(["isbn", "title"])))]
    Lookup {
        /// Look up an exact ISBN-10 or ISBN-13
        #[arg(long, conflicts_with_all = ["title", "author"])]
        isbn: Option<String>,

        /// Search by title
        #[arg(long)]
        title: Option<String>,

        /// Narrow a title search by author
        #[arg(long, requires = "title")]
        author: Option<String>,
    },

    /// Show, create, or validate readlog.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Enrich { .. } | Commands::Lookup { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Enrich { files, dry_run } => cmd::enrich::run(&root, files, dry_run, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Lookup {
            isbn,
            title,
            author,
        } => cmd::lookup::run(
            &root,
            isbn.as_deref(),
            title.as_deref(),
            author.as_deref(),
            cli.json,
        ),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
