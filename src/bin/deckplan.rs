use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "deckplan", version)]
struct Cli {
    /// Log debug events to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build or reuse the reference index and print a summary.
    Index(IndexArgs),
    /// Plan the storyboard and print it as JSON.
    Plan(PlanArgs),
    /// Plan, build, audit and write the job artifacts.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Directory for snapshots and job artifacts.
    #[arg(long, default_value = ".deckplan")]
    store: PathBuf,

    /// Engine options JSON; flags below override it.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Minimum reference files before indexing.
    #[arg(long)]
    min_references: Option<usize>,
}

#[derive(Args, Debug)]
struct IndexArgs {
    /// Reference image folder.
    #[arg(long)]
    references: PathBuf,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Poster,
    OnePager,
    Report,
    Cards,
    Brochure,
}

impl From<KindArg> for deckplan::DocKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Poster => Self::Poster,
            KindArg::OnePager => Self::OnePager,
            KindArg::Report => Self::Report,
            KindArg::Cards => Self::Cards,
            KindArg::Brochure => Self::Brochure,
        }
    }
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Input image folder.
    #[arg(long)]
    images: PathBuf,

    /// Optional font folder.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Optional reference image folder.
    #[arg(long)]
    references: Option<PathBuf>,

    /// Request JSON; flags below override it.
    #[arg(long)]
    request: Option<PathBuf>,

    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// `exact(N)`, `range(A,B)` or a bare number.
    #[arg(long)]
    pages: Option<String>,

    /// Preset name (A4P, A4L, ...) or `WxH` in millimeters.
    #[arg(long)]
    size: Option<String>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    variant: Option<u32>,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    plan: PlanArgs,

    /// Keep debug-only elements.
    #[arg(long)]
    debug: bool,

    /// Resolve pages on a worker pool.
    #[arg(long)]
    parallel: bool,

    #[arg(long)]
    threads: Option<usize>,

    /// Refuse export unless a fresh reference-driven plan was used.
    #[arg(long)]
    require_references: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let result = match cli.cmd {
        Command::Index(args) => cmd_index(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Generate(args) => cmd_generate(args),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn engine_opts(args: &StoreArgs) -> anyhow::Result<deckplan::EngineOpts> {
    let mut opts = match &args.opts {
        Some(path) => deckplan::EngineOpts::from_path(path)?,
        None => deckplan::EngineOpts::default(),
    };
    if let Some(n) = args.min_references {
        opts.min_references = n;
    }
    Ok(opts)
}

fn make_engine(opts: deckplan::EngineOpts, store: &Path) -> anyhow::Result<deckplan::DeckEngine> {
    let store: Arc<dyn deckplan::BlobStore> = Arc::new(deckplan::DirBlobStore::new(store));
    Ok(deckplan::DeckEngine::new(opts, store)?)
}

fn request_spec(args: &PlanArgs) -> anyhow::Result<deckplan::RequestSpec> {
    let mut req = match &args.request {
        Some(path) => deckplan::RequestSpec::from_path(path)?,
        None => deckplan::RequestSpec::default(),
    };
    if let Some(kind) = args.kind {
        req.doc_kind = Some(kind.into());
    }
    if let Some(pages) = &args.pages {
        req.page_count = Some(deckplan::PageCountSpec::parse(pages)?);
    }
    if let Some(size) = &args.size {
        req.page_size = Some(deckplan::PageSizeSpec::parse(size)?);
    }
    if let Some(title) = &args.title {
        req.title = title.clone();
    }
    if args.seed.is_some() {
        req.seed = args.seed;
    }
    if let Some(v) = args.variant {
        req.variant_index = v;
    }
    Ok(req)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize output JSON")?;
    println!("{s}");
    Ok(())
}

fn cmd_index(args: IndexArgs) -> anyhow::Result<ExitCode> {
    let engine = make_engine(engine_opts(&args.store)?, &args.store.store)?;
    let ctx = engine.index(&args.references)?;
    print_json(&deckplan::IndexSummary::from_context(&ctx))?;
    Ok(ExitCode::SUCCESS)
}

struct Scanned {
    images: Vec<deckplan::ScannedImage>,
    fonts: Vec<deckplan::ScannedFont>,
}

fn scan(args: &PlanArgs) -> anyhow::Result<Scanned> {
    let images = deckplan::scan_images(&args.images)
        .with_context(|| format!("scan images in '{}'", args.images.display()))?;
    let fonts = match &args.fonts {
        Some(dir) => deckplan::scan_fonts(dir)
            .with_context(|| format!("scan fonts in '{}'", dir.display()))?,
        None => Vec::new(),
    };
    Ok(Scanned { images, fonts })
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<ExitCode> {
    let engine = make_engine(engine_opts(&args.store)?, &args.store.store)?;
    let request = request_spec(&args)?;
    let scanned = scan(&args)?;
    let storyboard = engine.plan(&deckplan::DeckInputs {
        images: &scanned.images,
        fonts: &scanned.fonts,
        references_root: args.references.as_deref(),
        request: &request,
    })?;
    print_json(&storyboard)?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<ExitCode> {
    let mut opts = engine_opts(&args.plan.store)?;
    opts.debug |= args.debug;
    opts.parallel |= args.parallel;
    opts.references_required |= args.require_references;
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    let engine = make_engine(opts, &args.plan.store.store)?;
    let request = request_spec(&args.plan)?;
    let scanned = scan(&args.plan)?;
    let inputs = deckplan::DeckInputs {
        images: &scanned.images,
        fonts: &scanned.fonts,
        references_root: args.plan.references.as_deref(),
        request: &request,
    };

    match engine.generate(&inputs) {
        Ok(out) => {
            print_json(&serde_json::json!({
                "requestHash": out.request_hash,
                "auditHash": out.audit.audit_hash,
                "permitted": out.audit.permitted,
                "pages": out.pages.len(),
                "layout": args.plan.store.store.join(deckplan::job_key(&out.request_hash, "layout.json")),
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(deckplan::DeckError::Rejected { issues }) => {
            eprintln!("export refused with {} issue(s):", issues.len());
            for issue in &issues {
                match &issue.element_id {
                    Some(id) => eprintln!("  [{}] {} ({id})", issue.code.as_str(), issue.message),
                    None => eprintln!("  [{}] {}", issue.code.as_str(), issue.message),
                }
            }
            Ok(ExitCode::from(2))
        }
        Err(err) => Err(err.into()),
    }
}
