use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "texformula", version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a formula and print its normalized form.
    Check(CheckArgs),
    /// Emit GLSL for a color/alpha formula pair.
    Glsl(GlslArgs),
    /// Evaluate a formula pair over input images and write the result.
    Combine(CombineArgs),
    /// Apply an equations config and report every slot.
    Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Formula text.
    formula: String,

    /// Number of input images the formula may reference.
    #[arg(long, default_value_t = 1)]
    images: usize,

    /// Print the reduced tree as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct GlslArgs {
    /// Color formula.
    #[arg(long)]
    color: String,

    /// Alpha formula. Defaults to the color formula.
    #[arg(long)]
    alpha: Option<String>,

    /// Number of input images.
    #[arg(long, default_value_t = 1)]
    images: usize,

    /// Print only the color expression instead of a whole fragment shader.
    #[arg(long, default_value_t = false)]
    expr_only: bool,
}

#[derive(Parser, Debug)]
struct CombineArgs {
    /// Input image; repeat for I0, I1, ...
    #[arg(long = "in", required = true)]
    inputs: Vec<PathBuf>,

    /// Color formula.
    #[arg(long)]
    color: String,

    /// Alpha formula. Defaults to the color formula.
    #[arg(long)]
    alpha: Option<String>,

    /// Output image path; format follows the extension.
    #[arg(long)]
    out: PathBuf,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Equations config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Number of input images.
    #[arg(long, default_value_t = 1)]
    images: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Glsl(args) => cmd_glsl(args),
        Command::Combine(args) => cmd_combine(args),
        Command::Apply(args) => cmd_apply(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let expr = compile_reported(&args.formula, args.images)?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&expr).context("serialize tree")?
        );
    } else {
        println!("{expr}");
    }
    Ok(())
}

fn cmd_glsl(args: GlslArgs) -> anyhow::Result<()> {
    let color = compile_reported(&args.color, args.images)?;
    let alpha = match &args.alpha {
        Some(text) => compile_reported(text, args.images)?,
        None => color.clone(),
    };
    let opts = texformula::GlslOptions::default();
    let src = if args.expr_only {
        texformula::emit_glsl(&color, &opts)?
    } else {
        texformula::fragment_shader(&color, &alpha, args.images, &opts)?
    };
    println!("{src}");
    Ok(())
}

fn cmd_combine(args: CombineArgs) -> anyhow::Result<()> {
    let n = args.inputs.len();
    let color = compile_reported(&args.color, n)?;
    let alpha = match &args.alpha {
        Some(text) => compile_reported(text, n)?,
        None => color.clone(),
    };

    let images = args
        .inputs
        .iter()
        .map(|p| texformula::load_image(p))
        .collect::<Result<Vec<_>, _>>()?;

    let settings = texformula::CombineSettings {
        threads: args.threads,
    };
    let out = texformula::combine(&color, &alpha, &images, &settings)?;

    ensure_parent_dir(&args.out)?;
    texformula::save_image(&out, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let cfg = texformula::EquationsConfig::from_path(&args.config)?;
    let mut eqs = cfg.new_equations();
    let result = eqs.apply_all(&cfg.equations, args.images);

    for (slot, eq) in eqs.iter().enumerate() {
        if !eq.visible {
            println!("equation {slot}: hidden");
            continue;
        }
        for channel in [texformula::Channel::Color, texformula::Channel::Alpha] {
            match eq.formula(channel).root() {
                Some(root) => println!("equation {slot} {channel}: {root}"),
                None => println!("equation {slot} {channel}: <not applied>"),
            }
        }
    }

    if let Err(errs) = result {
        for e in &errs.0 {
            eprintln!("error: {e}");
        }
        anyhow::bail!("{} formula(s) failed to apply", errs.0.len());
    }
    Ok(())
}

/// Compile `text`, printing a caret diagnostic under the offending span on failure.
fn compile_reported(text: &str, num_images: usize) -> anyhow::Result<texformula::Expr> {
    texformula::compile(text, num_images).map_err(|e| {
        if let Some(span) = e.span() {
            eprintln!("{text}");
            eprintln!(
                "{}{}",
                " ".repeat(span.start),
                "^".repeat(span.len().max(1))
            );
        }
        anyhow::Error::new(e).context(format!("compile '{text}'"))
    })
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
