use crate::config::load_config;
use crate::export::{export_dot, export_latex};
use crate::interaction::{RegionKind, RenderContext, View};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::parser::parse_document;
use crate::render::{RenderMode, render_svg, write_output_svg};
use crate::{Entry, render_region};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "xmgv", version, about = "Render XMG grammar entries as SVG, LaTeX or DOT")]
pub struct Args {
    /// Grammar XML file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Print the entry names and exit
    #[arg(long = "list")]
    pub list: bool,

    /// Only render this entry
    #[arg(long = "entry")]
    pub entry: Option<String>,

    /// Region to render
    #[arg(long = "region", value_enum, default_value = "all")]
    pub region: RegionArg,

    /// Output file, or directory when several regions are rendered. Text formats
    /// default to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Collapse every tree node before exporting
    #[arg(long = "collapse-all")]
    pub collapse_all: bool,

    /// Keep click targets and collapse switches in SVG output
    #[arg(long = "interactive")]
    pub interactive: bool,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionArg {
    Tree,
    Frame,
    Interface,
    Trace,
    All,
}

impl RegionArg {
    fn regions(self) -> Vec<RegionKind> {
        match self {
            RegionArg::Tree => vec![RegionKind::Tree],
            RegionArg::Frame => vec![RegionKind::Frame],
            RegionArg::Interface => vec![RegionKind::Interface],
            RegionArg::Trace => vec![RegionKind::Trace],
            RegionArg::All => vec![
                RegionKind::Tree,
                RegionKind::Frame,
                RegionKind::Interface,
                RegionKind::Trace,
            ],
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Latex,
    Dot,
    Layout,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Latex => "tex",
            OutputFormat::Dot => "dot",
            OutputFormat::Layout => "json",
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let context = RenderContext::new(config);

    let input = read_input(args.input.as_deref())?;
    let grammar = parse_document(&input)?;

    if args.list {
        for name in grammar.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let entries: Vec<&Entry> = match &args.entry {
        Some(name) => vec![
            grammar
                .entry(name)
                .ok_or_else(|| anyhow::anyhow!("No entry named '{name}' in input"))?,
        ],
        None => grammar.entries.iter().collect(),
    };

    let mut views = Vec::new();
    for entry in entries {
        for region in args.region.regions() {
            let Some(mut view) = render_region(entry, region, &context).into_view() else {
                info!(entry = %entry.name, region = region.as_str(), "nothing to render");
                continue;
            };
            if args.collapse_all {
                view.collapse_all();
            }
            views.push(view);
        }
    }

    if views.is_empty() {
        return Err(anyhow::anyhow!("Nothing to render"));
    }

    if views.len() == 1 {
        return write_view(&views[0], &args, args.output.as_deref());
    }
    for view in &views {
        let output = resolve_multi_output(args.output.as_deref(), view, args.output_format)?;
        write_view(view, &args, Some(&output))?;
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn write_view(view: &View, args: &Args, output: Option<&Path>) -> Result<()> {
    let mode = if args.interactive {
        RenderMode::Interactive
    } else {
        RenderMode::Static
    };
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&render_svg(view, mode), output),
        OutputFormat::Png => {
            let output =
                output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_png(&render_svg(view, RenderMode::Static), output, view)
        }
        OutputFormat::Latex => write_output_svg(&export_latex(view), output),
        OutputFormat::Dot => write_output_svg(&export_dot(view), output),
        OutputFormat::Layout => match output {
            Some(path) => write_layout_dump(path, view),
            None => {
                let dump = LayoutDump::from_view(view);
                println!("{}", serde_json::to_string_pretty(&dump)?);
                Ok(())
            }
        },
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, view: &View) -> Result<()> {
    let config = view.config();
    crate::render::write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _view: &View) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the 'png' feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// `<dir>/<entry>-<region>.<ext>` when `output` is a directory, otherwise
/// `<stem>-<entry>-<region>.<ext>` next to it.
fn resolve_multi_output(
    output: Option<&Path>,
    view: &View,
    format: OutputFormat,
) -> Result<PathBuf> {
    let base = output
        .ok_or_else(|| anyhow::anyhow!("Output path required when rendering several regions"))?;
    let name = format!(
        "{}-{}.{}",
        file_safe(view.entry_name()),
        view.region().as_str(),
        format.extension()
    );
    if base.is_dir() {
        return Ok(base.join(name));
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("entry");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(format!("{stem}-{name}")))
}

fn file_safe(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "entry".to_string() } else { cleaned }
}
