use clap::{ArgAction, Parser, Subcommand};
use quire::{config, markdown, output, pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Publishing pipeline for annotated markdown sites")]
#[command(long_about = "\
Publishing pipeline for annotated markdown sites

Documents carry a JSON metadata header above a `-----` line. Targets in
site.toml group documents into pages, indexes, series and feeds.

Content structure:

  content/
  ├── site.toml                    # Targets, nav, templates, image settings
  ├── templates/
  │   ├── main.xhtml               # Page skeleton (NavMenu, MainContent, CopyrightString)
  │   ├── index.html               # Index page body ($title, $items)
  │   ├── index_item.html          # One index entry ($title, $date, $href, ...)
  │   ├── index_item_series.html   # Series card ($title, $href, $series_items)
  │   └── series_nav.html          # Prev / root / next links
  ├── blog/
  │   ├── first-post.md            # {\"title\": \"First-Post\", \"date\": \"2023-01-01\"}
  │   ├── _index.md                # Custom index wrapping $items
  │   └── img/cover.png            # Converted to webp when convert_images = true
  └── tutorial/                    # series = [\"intro.md\", \"\\tsetup.md\"]

Output goes to <output>/<target>/, one HTML file per document plus
index.html, the target's feed and syntax-style.css when requested.

Run 'quire gen-config' to generate a documented site.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log more (-v: each written file, -vv: asset planning)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert assets and render every target
    Build,
    /// Validate config, target graph and document headers without writing
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
    /// Print the highlighter stylesheet for the configured themes
    Stylesheet,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);
            println!("==> Building {} → {}", cli.source.display(), cli.output.display());
            let report = pipeline::build(&site_config, &cli.source, &cli.output)?;
            output::print_build_output(&report, &cli.source, &cli.output);
            report.into_result()?;
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);
            println!("==> Checking {}", cli.source.display());
            let targets = pipeline::check(&site_config, &cli.source)?;
            output::print_check_output(&targets);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Stylesheet => {
            let site_config = config::load_config(&cli.source)?;
            print!("{}", markdown::stylesheet(&site_config.highlight.schemes())?);
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings, raised by each `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
