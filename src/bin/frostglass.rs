use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "frostglass", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a parameter snapshot as a PNG.
    Frame(FrameArgs),
    /// Emit a randomized pastel default snapshot as JSON.
    Params(ParamsArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input parameter JSON. Omitted: randomized pastel defaults.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Parameter overrides as name=value (control-surface names, e.g.
    /// strips=12, startColor=#aabbcc). Repeatable; applied in order.
    #[arg(long = "set")]
    sets: Vec<String>,

    /// Seed for pastel defaults when no input JSON is given.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Viewport width; the canvas renders at 80% of it.
    #[arg(long, default_value_t = 1280)]
    viewport_width: u32,

    /// Viewport height; the canvas renders at 80% of it.
    #[arg(long, default_value_t = 800)]
    viewport_height: u32,

    /// TTF/OTF font file for the text overlay. Without it, non-empty text
    /// is skipped.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ParamsArgs {
    /// Seed for the randomized pastel colors.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Params(args) => cmd_params(args),
    }
}

fn read_params_json(path: &Path) -> anyhow::Result<frostglass::RenderParams> {
    let f = File::open(path).with_context(|| format!("open params '{}'", path.display()))?;
    let r = BufReader::new(f);
    let params: frostglass::RenderParams =
        serde_json::from_reader(r).with_context(|| "parse params JSON")?;
    Ok(params)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut params = match &args.in_path {
        Some(p) => read_params_json(p)?,
        None => frostglass::RenderParams::with_random_pastels(args.seed),
    };

    for set in &args.sets {
        let (name, value) = set
            .split_once('=')
            .with_context(|| format!("--set expects name=value, got '{set}'"))?;
        let update = frostglass::ParamUpdate::parse(name, value)
            .with_context(|| format!("parse override '{set}'"))?;
        params = params.with_update(update);
    }
    params.validate()?;

    let settings = frostglass::RenderSettings {
        viewport_width: args.viewport_width,
        viewport_height: args.viewport_height,
        ..frostglass::RenderSettings::default()
    };
    let mut renderer = frostglass::Renderer::new(settings)?;

    if let Some(font_path) = &args.font {
        let bytes = std::fs::read(font_path)
            .with_context(|| format!("read font '{}'", font_path.display()))?;
        renderer.set_font_bytes(bytes);
    }

    let frame = renderer.render(&params)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_params(args: ParamsArgs) -> anyhow::Result<()> {
    let params = frostglass::RenderParams::with_random_pastels(args.seed);
    let json = serde_json::to_string_pretty(&params).with_context(|| "serialize params")?;
    println!("{json}");
    Ok(())
}
