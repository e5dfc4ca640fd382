use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

mod diagnostics;
mod history;
mod layout;
mod render;
mod units;

use history::{Tokenizer, parse_history};
use render::RenderConfig;
use units::UnitMode;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "ophistory")]
#[command(about = "Render concurrent operation histories as SVG timelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a history where every line is one step.
    History(RenderArgs),
    /// Render a history where lines inside `[` ... `]` happen in the same step.
    Spans(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// File of operations.
    file: String,

    /// Output path (.svg); stdout when omitted or `-`.
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// Only use px units and a fixed 12px font.
    #[arg(long)]
    embed: bool,

    /// Add dashed lines at lane edges to debug alignment.
    #[arg(long)]
    guidelines: bool,

    /// Print each intermediate stage to stderr.
    #[arg(long)]
    debug: bool,
}

/// Input dialect accepted by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    History,
    Grouped,
}

#[derive(Debug, PartialEq, Eq)]
enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    fn from_arg(arg: Option<&str>) -> Result<Self> {
        match arg {
            None | Some("-") => Ok(OutputTarget::Stdout),
            Some(path) if path.ends_with(".svg") => Ok(OutputTarget::File(PathBuf::from(path))),
            Some(path) => bail!("unsupported output format for {}: expected a .svg path", path),
        }
    }

    fn write(&self, svg: &str) -> Result<()> {
        match self {
            OutputTarget::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(svg.as_bytes()).context("write svg to stdout")?;
                stdout.flush().context("flush stdout")?;
            }
            OutputTarget::File(path) => {
                std::fs::write(path, svg)
                    .with_context(|| format!("write svg to {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
        }
        Ok(())
    }
}

/// Whole pipeline for one input: tokenize, parse, lay out, render.
fn convert(text: &str, syntax: Syntax, config: &RenderConfig, debug: bool) -> Result<String> {
    let tokenizer = Tokenizer::new().context("compile line pattern")?;
    let lines = match syntax {
        Syntax::History => tokenizer.tokenize_history(text)?,
        Syntax::Grouped => tokenizer.tokenize_grouped(text)?,
    };
    diagnostics::dump_stage(debug, "lines", &lines)?;

    let history = parse_history(&lines)?;
    if history.is_empty() {
        diagnostics::warn("input contains no operations; the diagram will be empty");
    }
    diagnostics::dump_stage(debug, "history", &history)?;

    let geometry = layout::layout(&history)?;
    diagnostics::dump_stage(debug, "geometry", &geometry)?;

    let svg = render::render_svg(&geometry, config);
    diagnostics::dump_stage(debug, "svg", &svg)?;
    Ok(svg)
}

fn run(args: &RenderArgs, syntax: Syntax) -> Result<()> {
    // Reject a bad output path before doing any work.
    let target = OutputTarget::from_arg(args.output.as_deref())?;

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("read history file {}", args.file))?;

    let config = RenderConfig {
        mode: if args.embed {
            UnitMode::Embed
        } else {
            UnitMode::Scalable
        },
        guidelines: args.guidelines,
    };

    let svg = convert(&text, syntax, &config, args.debug)
        .with_context(|| format!("convert {}", args.file))?;
    target.write(&svg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.cmd {
        Commands::History(args) => run(args, Syntax::History),
        Commands::Spans(args) => run(args, Syntax::Grouped),
    }
}
