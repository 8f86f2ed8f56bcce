use anyhow::Context;
use clap::{Parser, ValueEnum};
use rulebridge::config::Settings;
use rulebridge::convert::convert_lines;
use rulebridge::emit::{AlertEmitter, Emitter, ZeekEmitter};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "rulebridge")]
#[command(version = "0.1.0")]
#[command(about = "Convert Suricata/Snort rules into alert-matcher and Zeek signature formats", long_about = None)]
struct Cli {
    /// Input rule file, one rule per line
    input: PathBuf,

    /// Conversion target
    #[arg(short, long, value_enum, default_value_t = Target::Alert)]
    target: Target,

    /// Output file for converted rules (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output file for lines that failed to convert (written verbatim)
    #[arg(long, value_name = "FILE")]
    failed: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    /// Compact alert-matching format
    Alert,
    /// Zeek signature blocks
    Zeek,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_config(&cli)?;
    init_logging(&cli, &settings);

    let input = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file {:?}", cli.input))?;

    let emitter: Box<dyn Emitter> = match cli.target {
        Target::Alert => Box::new(AlertEmitter::new(
            settings.alert_table(),
            settings.event_map(),
        )),
        Target::Zeek => Box::new(ZeekEmitter::new(settings.zeek_table())),
    };

    let outcome = convert_lines(input.lines(), emitter.as_ref());

    info!(
        "Converted {} rules, {} failed",
        outcome.converted.len(),
        outcome.failed.len()
    );

    let separator = match cli.target {
        Target::Alert => "\n",
        Target::Zeek => "\n\n",
    };
    write_sink(cli.output.as_deref(), &outcome.converted, separator)
        .context("Failed to write converted rules")?;

    match &cli.failed {
        Some(path) => write_sink(Some(path.as_path()), &outcome.failed, "\n")
            .context("Failed to write failure file")?,
        None => {
            if !outcome.failed.is_empty() {
                warn!(
                    "{} lines failed to convert (no --failed file given)",
                    outcome.failed.len()
                );
            }
        }
    }

    Ok(())
}

fn write_sink(
    path: Option<&std::path::Path>,
    entries: &[String],
    separator: &str,
) -> std::io::Result<()> {
    let mut text = entries.join(separator);
    if !text.is_empty() {
        text.push('\n');
    }
    match path {
        Some(path) => std::fs::write(path, text),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Settings> {
    match &cli.config {
        Some(path) => {
            Settings::from_file(path).context("Failed to load configuration file")
        }
        None => {
            let default_path = PathBuf::from("rulebridge.yaml");
            if default_path.exists() {
                Settings::from_file(&default_path)
                    .context("Failed to load configuration from rulebridge.yaml")
            } else {
                Ok(Settings::default_config())
            }
        }
    }
}

fn init_logging(cli: &Cli, settings: &Settings) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => settings.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    // RUST_LOG overrides CLI and config when explicitly set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rulebridge={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
