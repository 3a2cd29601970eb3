use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tessera::config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Generative trait-layer compositor")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a collection and write it as a zip archive.
    Generate(GenerateArgs),
    /// Composite a single random combination into a PNG.
    Preview(PreviewArgs),
    /// Print the ingested catalog and layer order as JSON.
    Inspect(CatalogArgs),
}

#[derive(Args, Debug)]
struct CatalogArgs {
    /// Asset tree laid out as `<root>/<trait>/<tier>/<file>` or `<root>/<trait>/<file>`.
    #[arg(long)]
    assets: PathBuf,

    /// Project config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Seed for reproducible output (overrides the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Canvas size as WIDTHxHEIGHT (overrides the config).
    #[arg(long, value_parser = parse_canvas)]
    size: Option<tessera::CanvasSize>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[command(flatten)]
    run: RunArgs,

    /// Number of artifacts (overrides the config).
    #[arg(long)]
    count: Option<usize>,

    /// Output directory for the archive.
    #[arg(long)]
    out: PathBuf,

    /// Items per batch (overrides the config).
    #[arg(long)]
    batch_size: Option<usize>,

    /// Worker threads for rasterization and encoding.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[command(flatten)]
    run: RunArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_canvas(s: &str) -> Result<tessera::CanvasSize, String> {
    tessera::CanvasSize::parse(s).map_err(|e| e.to_string())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ProjectConfig> {
    match path {
        Some(p) => Ok(ProjectConfig::from_path(p)?),
        None => Ok(ProjectConfig::default()),
    }
}

fn make_studio(
    catalog: &CatalogArgs,
    run: &RunArgs,
    cfg: &mut ProjectConfig,
) -> anyhow::Result<tessera::Studio> {
    if let Some(size) = run.size {
        cfg.canvas = size;
    }
    if let Some(seed) = run.seed {
        cfg.seed = Some(seed);
    }
    cfg.validate()?;

    let rng = match cfg.seed {
        Some(seed) => tessera::Rng::seeded(seed),
        None => tessera::Rng::from_entropy(),
    };
    let mut studio = tessera::Studio::with_rng(cfg.generate_opts(), rng);

    let files = tessera::SourceFile::walk_dir(&catalog.assets)
        .with_context(|| format!("read asset tree '{}'", catalog.assets.display()))?;
    let report = studio
        .catalog_mut()
        .add_assets_from_folder_structure(files);
    tracing::info!(
        added = report.added,
        skipped = report.skipped,
        categories = report.new_categories.len(),
        "assets ingested"
    );
    if studio.catalog().is_empty() {
        anyhow::bail!(
            "no images found under '{}' (expected <root>/<trait>/[<tier>/]<file>)",
            catalog.assets.display()
        );
    }
    cfg.apply_layers(studio.catalog_mut().layers_mut());
    Ok(studio)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.catalog.config.as_deref())?;
    if let Some(n) = args.batch_size {
        cfg.batch_size = n;
    }
    let count = args.count.unwrap_or(cfg.count);
    let mut studio = make_studio(&args.catalog, &args.run, &mut cfg)?;

    let mut gen_opts = cfg.generate_opts();
    gen_opts.threads = args.threads;
    studio.set_opts(gen_opts);

    let mut sink = tessera::FnProgress(|e: tessera::ProgressEvent| {
        eprintln!("{:?} {:>5.1}%", e.stage, e.percent);
    });
    studio.generate_collection(count, &mut sink, None)?;
    if let Some(stats) = studio.last_stats() {
        eprintln!(
            "generated {} artifacts ({} duplicates, {} failed layers)",
            stats.generated, stats.duplicates, stats.failed_layers
        );
    }

    let mut export_opts = cfg.export_opts();
    export_opts.threads = args.threads;
    let archive = studio.export(export_opts, false, &mut sink, None)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    let path = archive.write_to_dir(&args.out)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.catalog.config.as_deref())?;
    let mut studio = make_studio(&args.catalog, &args.run, &mut cfg)?;

    let preview = studio.generate_preview()?;
    for failure in &preview.report.failures {
        eprintln!(
            "warning: layer '{}' ({}) skipped: {}",
            failure.category, failure.asset_name, failure.message
        );
    }
    let raster = preview
        .raster
        .as_ref()
        .context("preview was not rasterized")?;
    let png = raster.encode_png(cfg.png_compression)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    let traits: Vec<String> = preview
        .traits
        .picks()
        .iter()
        .map(|p| format!("{}={}", p.category, p.asset.name))
        .collect();
    eprintln!("wrote {} [{}]", args.out.display(), traits.join(", "));
    Ok(())
}

fn cmd_inspect(args: CatalogArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    let studio = make_studio(
        &args,
        &RunArgs {
            seed: None,
            size: None,
        },
        &mut cfg,
    )?;
    let catalog = studio.catalog();

    let categories: Vec<serde_json::Value> = catalog
        .categories()
        .iter()
        .map(|cat| {
            let probs = tessera::WeightedSampler::probabilities(cat.assets());
            let assets: Vec<serde_json::Value> = cat
                .assets()
                .iter()
                .zip(probs)
                .map(|(a, p)| {
                    serde_json::json!({
                        "id": a.id,
                        "name": a.name,
                        "rarity": a.rarity,
                        "probability": p,
                    })
                })
                .collect();
            serde_json::json!({ "name": cat.name(), "assets": assets })
        })
        .collect();

    let out = serde_json::json!({
        "categories": categories,
        "layers": catalog.layers().entries(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
