use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use terrain_snap_core::{
    AlignOutcome, Aligner, AnimationController, RandomStartTrigger, RedrawCounter, Scene,
    SceneObject, TargetId, TerrainData, TerrainSnapper, ToolConfig, Vec3,
};
use tracing_subscriber::EnvFilter;

/// Side length of generated maps in world units.
const MAP_SIZE: f32 = 500.0;

/// Simulated frame length for the trigger run.
const FRAME: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TerrainKind {
    Flat,
    Hill,
    Valley,
}

/// Align scattered objects to terrain and run randomized start triggers
#[derive(Parser, Debug)]
#[command(name = "terrain-snap-demo")]
#[command(about = "Headless align-to-terrain and random start trigger demo", long_about = None)]
struct Args {
    /// Scene description (JSON); a generated scene is used when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Tool configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Terrain for the generated scene
    #[arg(short, long, value_enum, default_value_t = TerrainKind::Hill)]
    terrain: TerrainKind,

    /// Number of objects scattered in the generated scene
    #[arg(short, long, default_value_t = 20)]
    objects: u32,

    /// Override the maximum vertical search distance
    #[arg(short = 'd', long)]
    max_distance: Option<f32>,

    /// Random seed for object placement and trigger delays
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Plan snaps in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Undo the alignment afterwards
    #[arg(short, long)]
    undo: bool,

    /// Number of random start triggers to simulate (0 = skip)
    #[arg(long, default_value_t = 0)]
    triggers: u32,

    /// Simulated seconds for the trigger run
    #[arg(long, default_value_t = 5.0)]
    trigger_duration: f32,
}

/// Animation controller that remembers when it was started.
#[derive(Default)]
struct Animator {
    now: f32,
    started_at: Option<f32>,
}

impl AnimationController for Animator {
    fn set_trigger(&mut self, name: &str) {
        tracing::trace!("SetTrigger({name}) at {:.2}s", self.now);
        self.started_at = Some(self.now);
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    println!("=== Terrain Snap Demo ===\n");

    let mut config = match &args.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::default(),
    };
    if let Some(max_distance) = args.max_distance {
        config.snap.max_vertical_distance = max_distance;
    }
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut scene = match &args.scene {
        Some(path) => {
            println!("Loading scene from {}", path.display());
            Scene::load_json(path)?
        }
        None => generated_scene(args.terrain, args.objects, &mut rng)?,
    };
    println!(
        "Scene: {} terrain(s), {} object(s), {} selected",
        scene.terrains().len(),
        scene.object_count(),
        scene.selection().len()
    );
    println!(
        "Max vertical distance: {:.1}\n",
        config.snap.max_vertical_distance
    );

    let selection = scene.selection().to_vec();
    let before: Vec<(TargetId, Vec3)> = selection
        .iter()
        .filter_map(|&id| scene.object(id).map(|o| (id, o.position)))
        .collect();

    let aligner = Aligner::new(TerrainSnapper::new(config.snap)?);
    let mut views = RedrawCounter::default();
    let outcome = if args.parallel {
        aligner.align_targets_parallel(&selection, &mut scene, &mut views)
    } else {
        aligner.align_selection(&selection, &mut scene, &mut views)
    };

    report_alignment(&scene, &before, outcome, views.requests);

    if args.undo {
        let restored = scene.undo();
        println!("Undo restored {restored} object(s)");
    }

    if args.triggers > 0 {
        run_triggers(&config, args.triggers, args.trigger_duration, &mut rng)?;
    }

    Ok(())
}

fn generated_scene(kind: TerrainKind, objects: u32, rng: &mut StdRng) -> Result<Scene, Box<dyn Error>> {
    let terrain = match kind {
        TerrainKind::Flat => TerrainData::flat(MAP_SIZE, MAP_SIZE, 5.0, 0.0),
        TerrainKind::Hill => TerrainData::single_hill(MAP_SIZE, MAP_SIZE, 5.0, 0.0, 80.0, MAP_SIZE * 0.2),
        TerrainKind::Valley => TerrainData::valley_between_hills(MAP_SIZE, MAP_SIZE, 5.0, 20.0, 60.0),
    };
    println!("Generated {kind:?} terrain, {MAP_SIZE:.0}x{MAP_SIZE:.0}");

    let mut scene = Scene::new();
    scene.add_terrain(terrain);

    for id in 0..objects {
        let position = Vec3::new(
            rng.random_range(0.0..MAP_SIZE),
            rng.random_range(-50.0..250.0),
            rng.random_range(0.0..MAP_SIZE),
        );
        let mut object = SceneObject::new(id, format!("object-{id}"), position);
        if rng.random_bool(0.3) {
            object = object.with_box(Vec3::new(1.0, 1.0, 1.0));
        }
        scene.add_object(object)?;
    }
    scene.select_all();

    Ok(scene)
}

fn report_alignment(scene: &Scene, before: &[(TargetId, Vec3)], outcome: AlignOutcome, redraws: usize) {
    match outcome {
        AlignOutcome::NoSelection => {
            println!("Nothing selected");
            return;
        }
        AlignOutcome::NoTerrainFound { examined } => {
            println!("No terrain found for any of {examined} object(s)");
        }
        AlignOutcome::Moved { moved, examined } => {
            println!("Moved {moved} of {examined} object(s), {redraws} redraw request(s)");
        }
    }

    println!("\n{:<12} {:>10} {:>10}", "object", "y before", "y after");
    for &(id, start) in before.iter().take(15) {
        let Some(object) = scene.object(id) else {
            continue;
        };
        let marker = if object.position == start { "  (kept)" } else { "" };
        println!(
            "{:<12} {:>10.2} {:>10.2}{marker}",
            object.name, start.y, object.position.y
        );
    }
    if before.len() > 15 {
        println!("... {} more", before.len() - 15);
    }
    println!();
}

fn run_triggers(config: &ToolConfig, count: u32, duration: f32, rng: &mut StdRng) -> Result<(), Box<dyn Error>> {
    println!(
        "Simulating {count} start trigger(s) '{}' with delay in [{:.1}, {:.1}]s",
        config.trigger.trigger_name, config.trigger.min_delay, config.trigger.max_delay
    );

    let mut crowd: Vec<(RandomStartTrigger, Animator)> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut trigger = RandomStartTrigger::new(config.trigger.clone())?;
        trigger.activate(rng);
        crowd.push((trigger, Animator::default()));
    }

    let frames = (duration.max(0.0) / FRAME).ceil() as u32;
    let mut report_at = 1.0;
    for frame in 1..=frames {
        let now = frame as f32 * FRAME;
        for (trigger, animator) in &mut crowd {
            animator.now = now;
            trigger.update(FRAME, Some(animator));
        }

        if now >= report_at {
            let started = crowd.iter().filter(|(t, _)| t.has_fired()).count();
            println!("[{now:5.1}s] {started}/{count} started");
            report_at += 1.0;
        }
    }

    let waiting = crowd.iter().filter(|(t, _)| !t.has_fired()).count();
    if let Some(last) = crowd
        .iter()
        .filter_map(|(_, a)| a.started_at)
        .reduce(f32::max)
    {
        println!("Last start at {last:.2}s");
    }
    if waiting > 0 {
        println!("{waiting} trigger(s) still waiting after {duration:.1}s");
    }
    for (trigger, _) in &mut crowd {
        trigger.teardown();
    }

    Ok(())
}
