use arbor_cli::commands;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Traverse a recorded tree snapshot and export its leaves
    Crawl {
        snapshot: Utf8PathBuf,
        #[arg(short, long, default_value = "export.json")]
        output: Utf8PathBuf,
        #[arg(long, help = "Folder path to start from, e.g. /Team Content/Reports")]
        start: Option<String>,
    },
    /// Summarize a snapshot without crawling it
    Inspect { snapshot: Utf8PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("default subscriber");

    match cli.command {
        Commands::Crawl {
            snapshot,
            output,
            start,
        } => commands::cmd_crawl(snapshot, output, start).await?,
        Commands::Inspect { snapshot } => commands::cmd_inspect(snapshot)?,
    }

    Ok(())
}
