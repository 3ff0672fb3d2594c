use std::{
    cell::RefCell,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    rc::Rc,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sekai_stage::{
    Action, CpuStageRenderer, FsFetcher, IdentityVoiceLocator, NullMixer, PlaybackHost,
    PlayerSettings, PrefixResolver, Preloader, Scenario, Size, StoryRef,
    model::{prune::used_motions, residency::residency_queue},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sekai-stage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a scenario from a local asset mirror, writing one PNG per checkpoint.
    Play(PlayArgs),
    /// Print the checkpoint plan, used motions, and model residency without loading media.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Root of the local asset mirror.
    #[arg(long)]
    assets: PathBuf,

    /// Scenario path relative to the asset root.
    #[arg(long)]
    scenario: String,

    /// Directory for checkpoint PNGs. Nothing is written when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Viewport width; the stage is the largest 16:9 area inside it.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Player settings JSON (missing fields take defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    card_story: bool,

    #[arg(long)]
    action_set: bool,

    /// Pause `autoplay_delay_ms` between checkpoints.
    #[arg(long)]
    autoplay: bool,

    /// Show dialogue lines at once.
    #[arg(long)]
    no_typewriter: bool,

    /// Overrides the configured log level (`RUST_LOG` wins over both).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Root of the local asset mirror.
    #[arg(long)]
    assets: PathBuf,

    /// Scenario path relative to the asset root.
    #[arg(long)]
    scenario: String,

    /// Player settings JSON, for `model_queue_max`.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<PlayerSettings> {
    Ok(match path {
        Some(path) => PlayerSettings::from_json_file(path)?,
        None => PlayerSettings::default(),
    })
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_scenario_json(path: &Path) -> anyhow::Result<Scenario> {
    let f = File::open(path).with_context(|| format!("open scenario '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scenario: Scenario = serde_json::from_reader(r).with_context(|| "parse scenario JSON")?;
    Ok(scenario)
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    init_tracing(&settings.log_level);

    let scenario = read_scenario_json(&args.assets.join(args.scenario.trim_start_matches('/')))?;
    let script = sekai_stage::normalize(&scenario);
    let residency = residency_queue(&script, settings.model_queue_max);

    let id = if script.scenario_id.is_empty() {
        "<unnamed>"
    } else {
        script.scenario_id.as_str()
    };
    println!("{id}: {} entries", script.len());

    println!("steps:");
    for (i, plan) in sekai_stage::plan_all(&script).iter().enumerate() {
        let checkpoint = plan.checkpoint();
        let line = script
            .entries
            .get(checkpoint)
            .and_then(|entry| {
                entry.actions.iter().find_map(|action| match action {
                    Action::Talk(talk) => Some(format!(
                        "{}: {}",
                        talk.data.window_display_name,
                        talk.data.body.replace('\n', " ")
                    )),
                    _ => None,
                })
            })
            .unwrap_or_default();
        let resident = residency.get(checkpoint).cloned().unwrap_or_default();
        println!("  {i:>3}  entries {:?}  resident {resident:?}  {line}", plan.entries);
    }

    println!("motions:");
    for (base, catalog) in used_motions(&script) {
        println!("  {base}");
        println!("    motions:     {}", catalog.motions.join(", "));
        println!("    expressions: {}", catalog.expressions.join(", "));
    }
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(level) = &args.log_level {
        settings.log_level = level.clone();
    }
    if args.no_typewriter {
        settings.typewriter = false;
    }
    if args.autoplay {
        settings.autoplay = true;
    }
    settings.validate()?;
    init_tracing(&settings.log_level);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build runtime")?;
    rt.block_on(play(args, settings))
}

async fn play(args: PlayArgs, settings: PlayerSettings) -> anyhow::Result<()> {
    let preloader = Preloader::new(
        Arc::new(FsFetcher::new(&args.assets)),
        Arc::new(PrefixResolver::default()),
        Arc::new(IdentityVoiceLocator),
        &settings,
    );
    let stage = sekai_stage::fit_stage(Size::new(args.width, args.height))?;
    let autoplay = settings.autoplay;
    let host = PlaybackHost::new(preloader, Rc::new(NullMixer::default()), settings, stage);

    host.load(&StoryRef {
        scenario_url: args.scenario.clone(),
        is_card_story: args.card_story,
        is_action_set: args.action_set,
    })
    .await?;

    if let Some(out) = &args.out {
        std::fs::create_dir_all(out)
            .with_context(|| format!("create output dir '{}'", out.display()))?;
    }

    let snapshots = Snapshots::new(args.out.clone());
    if autoplay {
        host.play_to_end(|step| snapshots.capture(&host, step)).await?;
    } else {
        while !host.is_finished() {
            let step = host.advance().await?;
            snapshots.capture(&host, step);
        }
    }
    host.unload();
    snapshots.finish()
}

/// Writes a PNG per checkpoint, keeping the first failure for the end of the run.
struct Snapshots {
    out: Option<PathBuf>,
    renderer: RefCell<CpuStageRenderer>,
    written: RefCell<usize>,
    error: RefCell<Option<anyhow::Error>>,
}

impl Snapshots {
    fn new(out: Option<PathBuf>) -> Self {
        Self {
            out,
            renderer: RefCell::new(CpuStageRenderer::new()),
            written: RefCell::new(0),
            error: RefCell::new(None),
        }
    }

    fn capture(&self, host: &PlaybackHost, step: usize) {
        eprintln!("checkpoint {step}");
        let Some(out) = &self.out else {
            return;
        };
        if self.error.borrow().is_some() {
            return;
        }
        let Some(controller) = host.controller() else {
            return;
        };
        let path = out.join(format!("checkpoint_{step:04}.png"));
        let result = self
            .renderer
            .borrow_mut()
            .render(controller.root(), host.stage_size())
            .map_err(anyhow::Error::from)
            .and_then(|frame| {
                image::save_buffer_with_format(
                    &path,
                    &frame.data,
                    frame.width,
                    frame.height,
                    image::ColorType::Rgba8,
                    image::ImageFormat::Png,
                )
                .with_context(|| format!("write png '{}'", path.display()))
            });
        match result {
            Ok(()) => *self.written.borrow_mut() += 1,
            Err(err) => *self.error.borrow_mut() = Some(err),
        }
    }

    fn finish(self) -> anyhow::Result<()> {
        if let Some(err) = self.error.into_inner() {
            return Err(err);
        }
        if let Some(out) = &self.out {
            eprintln!(
                "wrote {} checkpoints to {}",
                self.written.into_inner(),
                out.display()
            );
        }
        Ok(())
    }
}
