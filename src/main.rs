use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sporldl::{
    cli::{self, Target},
    config, error,
    types::LinkKind,
    utils, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Client id used when the stored credentials are missing or rejected
    #[clap(long, global = true)]
    username: Option<String>,

    /// Client secret used when the stored credentials are missing or rejected
    #[clap(long, global = true)]
    password: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Download albums by id or link
    Album(ItemsOptions),

    /// Download all albums and singles of artists by id or link
    Artist(ItemsOptions),

    /// Download album or artist links, detecting the kind from each link
    Download(ItemsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ItemsOptions {
    /// Ids, `https://open.spotify.com/...` links or `spotify:` URIs
    #[clap(required = true)]
    items: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn collect_targets(items: &[String], kind: Option<LinkKind>) -> Vec<Target> {
    let mut targets = Vec::new();
    for item in items {
        let parsed = match kind {
            Some(kind) => utils::resolve_id(item, kind).map(|id| (kind, id)),
            None => utils::parse_link(item),
        };

        match parsed {
            Some((kind, id)) => targets.push(Target::new(kind, id)),
            None => warning!("Ignoring unrecognized input: {}", item),
        }
    }
    targets
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    let targets = match &cli.command {
        Command::Album(opt) => collect_targets(&opt.items, Some(LinkKind::Album)),
        Command::Artist(opt) => collect_targets(&opt.items, Some(LinkKind::Artist)),
        Command::Download(opt) => collect_targets(&opt.items, None),
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            return;
        }
    };

    if targets.is_empty() {
        error!("Nothing to download.");
    }

    cli::download(targets, cli.username, cli.password).await;
}
