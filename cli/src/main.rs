mod atomic_write;
mod config;
mod logging;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use parley_protocol::BackgroundPattern;
use parley_protocol::FileRef;
use parley_tui::AppConfig;
use parley_tui::ResponseStyle;
use parley_tui::RevealConfig;

use crate::config::ConfigStore;
use crate::config::FileConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "kebab-case")]
enum CliPattern {
    Waves,
    Circles,
    Gradient,
}

impl From<CliPattern> for BackgroundPattern {
    fn from(pattern: CliPattern) -> Self {
        match pattern {
            CliPattern::Waves => BackgroundPattern::Waves,
            CliPattern::Circles => BackgroundPattern::Circles,
            CliPattern::Gradient => BackgroundPattern::Gradient,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Terminal chat composer with mentions, attachments and streamed replies"
)]
struct Cli {
    /// Model name attached to every submission.
    #[arg(long, env = "PARLEY_MODEL")]
    model: Option<String>,

    /// Maximum number of characters in a draft.
    #[arg(long)]
    max_length: Option<usize>,

    /// Shortest delay between revealed words, in milliseconds.
    #[arg(long)]
    reveal_min_ms: Option<u64>,

    /// Longest delay between revealed words, in milliseconds.
    #[arg(long)]
    reveal_max_ms: Option<u64>,

    /// Files to stage on the first draft.
    #[arg(long = "attach", value_name = "PATH", num_args = 1..)]
    attach: Vec<PathBuf>,

    /// Config file to use instead of `~/.parley/config.toml`.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Reply by quoting the prompt instead of picking a sample answer.
    #[arg(long)]
    echo: bool,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Show or update the background settings.
    Background(BackgroundArgs),
}

#[derive(Args, Debug)]
struct BackgroundArgs {
    #[arg(long, value_enum)]
    pattern: Option<CliPattern>,

    /// Accent color as `#RRGGBB`.
    #[arg(long)]
    color: Option<String>,

    /// Tint strength between 0 and 1.
    #[arg(long)]
    opacity: Option<f32>,

    /// Print the stored settings without changing them.
    #[arg(long, conflicts_with_all = ["pattern", "color", "opacity"])]
    show: bool,
}

impl BackgroundArgs {
    fn has_changes(&self) -> bool {
        self.pattern.is_some() || self.color.is_some() || self.opacity.is_some()
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::default_log_dir().map(|dir| logging::init(&dir)) {
        Some(Ok(guard)) => Some(guard),
        Some(Err(err)) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
        None => None,
    };

    let store = match cli.config.clone() {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::new_default()?,
    };

    if let Some(CliCommand::Background(args)) = cli.command {
        return run_background(&store, args);
    }

    let file_config = store
        .load()
        .with_context(|| format!("load {}", store.path().display()))?;
    let app_config = resolve_app_config(&cli, file_config);
    tracing::info!(
        model = %app_config.model,
        max_length = ?app_config.max_length,
        attachments = app_config.initial_attachments.len(),
        "starting parley"
    );

    let exit_info = parley_tui::run_app(app_config).await?;
    tracing::info!(
        reason = ?exit_info.exit_reason,
        messages = exit_info.message_count,
        "parley exited"
    );
    Ok(())
}

fn run_background(store: &ConfigStore, args: BackgroundArgs) -> anyhow::Result<()> {
    let mut settings = store.background_settings()?;
    if !args.show && args.has_changes() {
        if let Some(pattern) = args.pattern {
            settings.pattern = pattern.into();
        }
        if let Some(color) = args.color {
            settings.color = color;
        }
        if let Some(opacity) = args.opacity {
            settings.opacity = opacity;
        }
        store
            .set_background_settings(&settings)
            .context("save background settings")?;
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// CLI flags win over the config file, which wins over built-in defaults.
fn resolve_app_config(cli: &Cli, file: FileConfig) -> AppConfig {
    let defaults = AppConfig::default();
    let min_delay = cli
        .reveal_min_ms
        .or(file.reveal_min_delay_ms)
        .map_or(defaults.reveal.min_delay, Duration::from_millis);
    let max_delay = cli
        .reveal_max_ms
        .or(file.reveal_max_delay_ms)
        .map_or(defaults.reveal.max_delay, Duration::from_millis);

    AppConfig {
        model: cli
            .model
            .clone()
            .or(file.default_model)
            .unwrap_or(defaults.model),
        placeholder: file.placeholder.unwrap_or(defaults.placeholder),
        max_length: cli.max_length.or(file.max_length),
        reveal: RevealConfig::new(min_delay, max_delay),
        near_bottom_rows: file.near_bottom_rows.unwrap_or(defaults.near_bottom_rows),
        background: file.background,
        initial_attachments: load_attachments(&cli.attach),
        response_style: if cli.echo {
            ResponseStyle::Echo
        } else {
            ResponseStyle::Canned
        },
    }
}

fn load_attachments(paths: &[PathBuf]) -> Vec<FileRef> {
    paths
        .iter()
        .filter_map(|path| match FileRef::from_path(path) {
            Ok(file) => Some(file),
            Err(err) => {
                tracing::warn!("skipping attachment: {err}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("parley").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn flags_override_file_which_overrides_defaults() {
        let cli = parse(&["--model", "gpt-4o", "--reveal-max-ms", "5", "--echo"]);
        let file = FileConfig {
            default_model: Some("from-file".to_string()),
            max_length: Some(500),
            reveal_min_delay_ms: Some(20),
            reveal_max_delay_ms: Some(90),
            ..FileConfig::default()
        };

        let config = resolve_app_config(&cli, file);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_length, Some(500));
        // The bounds are reordered when min > max.
        assert_eq!(
            config.reveal,
            RevealConfig::new(Duration::from_millis(5), Duration::from_millis(20))
        );
        assert_eq!(config.placeholder, "Ask anything...");
        assert_eq!(config.response_style, ResponseStyle::Echo);
    }

    #[test]
    fn missing_attachments_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let present = dir.path().join("notes.md");
        std::fs::write(&present, "# notes").expect("write");

        let files = load_attachments(&[present, dir.path().join("missing.txt")]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "notes.md");
        assert_eq!(files[0].size_bytes, 7);
    }

    #[test]
    fn background_show_conflicts_with_updates() {
        assert!(
            Cli::try_parse_from(["parley", "background", "--show", "--color", "#000000"]).is_err()
        );
        let cli = parse(&["background", "--pattern", "waves", "--opacity", "0.5"]);
        let Some(CliCommand::Background(args)) = cli.command else {
            panic!("expected background subcommand");
        };
        assert_eq!(args.pattern, Some(CliPattern::Waves));
        assert!(args.has_changes());
    }

    #[test]
    fn background_command_persists_changes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("config.toml"));
        let cli = parse(&["background", "--color", "#102030"]);
        let Some(CliCommand::Background(args)) = cli.command else {
            panic!("expected background subcommand");
        };

        run_background(&store, args).expect("run");
        assert_eq!(
            store.background_settings().expect("load").color,
            "#102030"
        );
    }
}
