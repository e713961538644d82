use clap::{Parser, Subcommand, ValueEnum};
use parallax_kit::config::{self, ParallaxConfig};
use parallax_kit::engine::{TimelineEngine, TriggerLayout};
use parallax_kit::events::Event;
use parallax_kit::output::{self, Sample};
use parallax_kit::page::Page;
use parallax_kit::types::{ManifestProblem, ModuleManifest};
use parallax_kit::{render, srcset};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, channel};
use std::thread::JoinHandle;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "parallax-kit")]
#[command(about = "Scroll-linked parallax image modules")]
#[command(long_about = "\
Scroll-linked parallax image modules

Each module is described by a JSON manifest: optional scroll overrides plus
an ordered list of images. One image may be the background; the others can
carry fromParams/toParams object literals animated as the page scrolls.

  {
    \"moduleId\": \"harbor\",
    \"scrollConfig\": { \"scrollDistance\": 1200 },
    \"images\": [
      { \"id\": 1, \"url\": \"https://site/sky-desktop.jpg\", \"isBackground\": true },
      { \"id\": 2, \"url\": \"https://site/boat-tablet.png\", \"zIndex\": 2,
        \"fromParams\": \"{ y: 200 }\", \"toParams\": \"{ y: -100 }\" }
    ]
  }

Image URLs carrying a size marker (-mobile, -tablet, -desktop, -tiny, -w400)
get a full responsive srcset.

Run 'parallax-kit gen-config' to generate a documented parallax.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing parallax.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Show the default source and srcset candidates for an image URL
    Srcset { url: String },
    /// Validate manifests without building a page
    Check {
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },
    /// Build an HTML page with one module per manifest
    Render {
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
        /// Output HTML file
        #[arg(long, default_value = "parallax.html")]
        output: PathBuf,
        /// Page title
        #[arg(long, default_value = "Parallax")]
        title: String,
    },
    /// Print each animated image's properties at a scroll position
    Scrub {
        manifest: PathBuf,
        /// Scroll offset of the page in pixels
        #[arg(long)]
        scroll: f64,
        /// Viewport height in pixels
        #[arg(long, default_value_t = 800.0)]
        viewport: f64,
        /// Top of the module in page coordinates
        #[arg(long, default_value_t = 0.0)]
        top: f64,
        /// Height of the module in pixels
        #[arg(long, default_value_t = 800.0)]
        height: f64,
    },
    /// Print a stock parallax.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level.to_string().parse()?)
        .from_env_lossy();
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Command::Srcset { url } => {
            output::print_variants(&srcset::resolve(Some(&url)));
        }
        Command::Check { manifests } => {
            let mut invalid = 0;
            for path in &manifests {
                let manifest = ModuleManifest::load(path)?;
                let problems = manifest.problems();
                if problems.iter().any(ManifestProblem::is_error) {
                    invalid += 1;
                }
                output::print_problems(&path.display().to_string(), &problems);
            }
            if invalid > 0 {
                return Err(format!("{invalid} manifest(s) are invalid").into());
            }
            println!("==> {} manifest(s) valid", manifests.len());
        }
        Command::Render {
            manifests,
            output,
            title,
        } => {
            let config = config::load_config(&cli.config)?;
            let classes = config.markup.clone();
            let (tx, rx) = channel();
            let printer = spawn_printer(rx);

            let mut page = Page::new(TimelineEngine::new(), config).with_events(tx);
            for path in &manifests {
                let manifest = ModuleManifest::load(path)?;
                let module_id = manifest.module_id_or_stem(path);
                let skeleton = page.add_module();
                page.initialize_module(Some(skeleton.script), &module_id, &manifest)?;
            }
            let html = render::render_page(page.document(), &classes, &title).into_string();
            drop(page);
            printer.join().map_err(|_| "event printer panicked")?;

            std::fs::write(&output, html)?;
            println!("==> Wrote {}", output.display());
        }
        Command::Scrub {
            manifest,
            scroll,
            viewport,
            top,
            height,
        } => {
            let config = config::load_config(&cli.config)?;
            let samples = scrub(&manifest, config, scroll, viewport, TriggerLayout { top, height })?;
            output::print_samples(&samples);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn spawn_printer(rx: Receiver<Event>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for event in rx {
            for line in output::format_event(&event) {
                println!("{}", line);
            }
        }
    })
}

/// Initialize one module and sample every tween at a settled scroll position.
fn scrub(
    path: &Path,
    config: ParallaxConfig,
    scroll_y: f64,
    viewport_height: f64,
    layout: TriggerLayout,
) -> Result<Vec<Sample>, Box<dyn std::error::Error>> {
    let manifest = ModuleManifest::load(path)?;
    let module_id = manifest.module_id_or_stem(path);
    let mut page = Page::new(TimelineEngine::new(), config);
    let skeleton = page.add_module();
    let report = page.initialize_module(Some(skeleton.script), &module_id, &manifest)?;

    let engine = page.engine_mut();
    engine.scroll_to(scroll_y, viewport_height, |node| {
        (node == report.wrapper).then_some(layout)
    });
    engine.settle();

    let samples = report
        .bind
        .animations
        .iter()
        .filter_map(|a| {
            Some(Sample {
                element_id: a.element_id.clone(),
                trigger_id: a.trigger_id.clone(),
                progress: engine.progress(a.handle)?,
                properties: engine.sample(a.handle)?,
            })
        })
        .collect();
    Ok(samples)
}
