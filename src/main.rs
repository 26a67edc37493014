use clap::{Parser, Subcommand};
use sa2event::effects::EventEffects;
use sa2event::model::ModelData;
use sa2event::platform::Platform;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "evtool", about = "Inspector for decompressed event buffers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a short summary of a model buffer
    Info {
        input: PathBuf,
        /// Separate motion buffer (required for GameCube events)
        #[arg(short, long)]
        motion: Option<PathBuf>,
    },
    /// Dump scenes, entries and motion references
    Dump {
        input: PathBuf,
        #[arg(short, long)]
        motion: Option<PathBuf>,
    },
    /// Emit a JSON summary
    Json {
        input: PathBuf,
        #[arg(short, long)]
        motion: Option<PathBuf>,
        /// Effects buffer to include in the summary
        #[arg(short, long)]
        effects: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct ModelSummary {
    platform: Platform,
    scenes: usize,
    entries: usize,
    textures: usize,
    nodes: usize,
    motions: usize,
    event_motions: usize,
    reflections: usize,
    surface_animation_blocks: usize,
    enable_drop_shadows: bool,
}

#[derive(Serialize)]
struct EffectsSummary {
    screen_effects: usize,
    particles: usize,
    lighting_keys: usize,
    blare_effects: usize,
    particle_emitters: usize,
    video_overlays: Vec<String>,
}

#[derive(Serialize)]
struct EventSummary {
    model: ModelSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    effects: Option<EffectsSummary>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input, motion } => {
            let model = load_model(&input, &motion)?;
            let summary = summarize_model(&model);

            println!("── Event model ─────────────────────────────────────────");
            println!("  Path          {}", input.display());
            println!("  Platform      {}", model.platform);
            println!("  Scenes        {} (incl. root)", summary.scenes);
            println!("  Entries       {}", summary.entries);
            println!("  Textures      {}", summary.textures);
            println!("  Nodes         {}", summary.nodes);
            println!("  Motions       {}", summary.motions);
            println!("  Motion pairs  {}", summary.event_motions);
            println!("  Reflections   {}", summary.reflections);
            println!("  Surface anims {}", summary.surface_animation_blocks);
            if model.platform == Platform::Gc {
                println!("  Drop shadows  {}", model.enable_drop_shadows);
            }
        }

        // ── Dump ────────────────────────────────────────────────────────────
        Commands::Dump { input, motion } => {
            let model = load_model(&input, &motion)?;
            println!("platform {}", model.platform);

            for (i, scene) in model.scenes.iter().enumerate() {
                let label = if i == 0 { "root" } else { "scene" };
                println!(
                    "{} {}  frames={}  entries={}  cameras={}  particles={}{}",
                    label,
                    i,
                    scene.frame_count,
                    scene.entries.len(),
                    scene.camera_animations.len(),
                    scene.particle_motions.len(),
                    if scene.big.is_some() { "  big" } else { "" },
                );
                for (j, entry) in scene.entries.iter().enumerate() {
                    println!(
                        "  entry {:<3} layer={:<2} attr={:#06x}  anim={} shape={} shadow={}",
                        j,
                        entry.layer,
                        entry.attributes,
                        entry.animation.is_some(),
                        entry.shape_animation.is_some(),
                        entry.shadow_model.is_some(),
                    );
                }
            }

            for (i, texture) in model.texture_names.names.iter().enumerate() {
                let dims = model
                    .texture_dimensions
                    .get(i)
                    .map(|&(w, h)| format!("{}x{}", w, h))
                    .unwrap_or_default();
                println!(
                    "texture {:<3} {:<28} {}",
                    i,
                    texture.name.as_deref().unwrap_or("-"),
                    dims,
                );
            }
        }

        // ── Json ────────────────────────────────────────────────────────────
        Commands::Json { input, motion, effects } => {
            let model = load_model(&input, &motion)?;

            let effects = match effects {
                Some(path) => {
                    let data = std::fs::read(path)?;
                    let decoded = EventEffects::read_from_bytes(&data, model.platform.endian())?;
                    Some(summarize_effects(&decoded))
                }
                None => None,
            };

            let summary = EventSummary {
                model: summarize_model(&model),
                effects,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn load_model(input: &PathBuf, motion: &Option<PathBuf>) -> Result<ModelData, Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    let motion_data = match motion {
        Some(path) => Some(std::fs::read(path)?),
        None => None,
    };
    Ok(ModelData::read(&data, motion_data.as_deref())?)
}

fn summarize_model(model: &ModelData) -> ModelSummary {
    ModelSummary {
        platform: model.platform,
        scenes: model.scenes.len(),
        entries: model.scenes.iter().map(|s| s.entries.len()).sum(),
        textures: model.texture_names.names.len(),
        nodes: model.pool.node_count(),
        motions: model.pool.motion_count(),
        event_motions: model.collect_event_motions().len(),
        reflections: model.reflections.reflections.len(),
        surface_animation_blocks: model
            .surface_animations
            .as_ref()
            .map(|s| s.blocks.len())
            .unwrap_or(0),
        enable_drop_shadows: model.enable_drop_shadows,
    }
}

fn summarize_effects(effects: &EventEffects) -> EffectsSummary {
    EffectsSummary {
        screen_effects: effects.screen_effects.iter().filter(|e| e.frame != 0).count(),
        particles: effects.particles.iter().filter(|e| e.frame != 0).count(),
        lighting_keys: effects
            .lighting
            .iter()
            .map(|set| set.iter().filter(|l| l.frame != 0).count())
            .sum(),
        blare_effects: effects.blare_effects.iter().filter(|e| e.frame != 0).count(),
        particle_emitters: effects.particle_emitters.iter().filter(|e| e.frame != 0).count(),
        video_overlays: effects
            .video_overlays
            .iter()
            .filter(|v| v.frame != 0)
            .map(|v| v.filename.clone())
            .collect(),
    }
}
