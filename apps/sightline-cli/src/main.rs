mod scene;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use serde::Serialize;
use sightline_behaviors::{BehaviorKind, EffectHandle};
use sightline_common::{ObjectId, ObserverId, Transform};
use sightline_culling::{DistanceCulling, shared};
use sightline_lod::{LodConfig, LodSignal, LodStats, LodSystem};
use sightline_registry::{ObserverRegistry, ViewVolume};
use tracing_subscriber::EnvFilter;

use crate::scene::{ObserverEntry, Scene};

#[derive(Parser)]
#[command(name = "sightline-cli", about = "CLI tool for sightline LOD scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Run a scene file and print each object's signal per tick
    Simulate {
        /// Scene YAML with observers and objects
        #[arg(short, long)]
        scene: PathBuf,
        /// Number of ticks to run
        #[arg(short, long, default_value = "10")]
        ticks: u64,
        /// Optional LOD config YAML
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Seconds per tick
        #[arg(long, default_value = "0.016")]
        delta: f32,
        /// Emit one JSON object per tick instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add and remove a second camera mid-run, printing bindings per object
    CameraSwap {
        /// Number of objects in the demo row
        #[arg(short, long, default_value = "3")]
        objects: usize,
    },
}

#[derive(Serialize)]
struct ObjectReport<'a> {
    name: &'a str,
    behavior: &'static str,
    signal: Option<LodSignal>,
    effect: String,
}

#[derive(Serialize)]
struct TickReport<'a> {
    tick: u64,
    stats: LodStats,
    objects: Vec<ObjectReport<'a>>,
}

struct Managed {
    name: String,
    id: ObjectId,
    behavior: BehaviorKind,
    effect: EffectHandle,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("sightline-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", sightline_common::crate_info());
            println!("registry: {}", sightline_registry::crate_info());
            println!("culling: {}", sightline_culling::crate_info());
            println!("lod: {}", sightline_lod::crate_info());
            println!("behaviors: {}", sightline_behaviors::crate_info());
        }
        Commands::Simulate {
            scene,
            ticks,
            config,
            delta,
            json,
        } => simulate(&scene, ticks, config.as_deref(), delta, json)?,
        Commands::CameraSwap { objects } => camera_swap(objects)?,
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<LodConfig> {
    match path {
        Some(path) => {
            LodConfig::load(path).with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(LodConfig::default()),
    }
}

fn simulate(
    scene_path: &std::path::Path,
    ticks: u64,
    config_path: Option<&std::path::Path>,
    delta: f32,
    json: bool,
) -> anyhow::Result<()> {
    let scene = Scene::load(scene_path)?;
    let config = load_config(config_path)?;
    tracing::info!(
        observers = scene.observers.len(),
        objects = scene.objects.len(),
        ticks,
        "simulating scene"
    );

    let mut registry = ObserverRegistry::new();
    let mut movers: Vec<(ObserverId, Vec3, &ObserverEntry)> = Vec::new();
    for entry in &scene.observers {
        let (id, _) = registry.add(entry.transform_at(entry.position), entry.view);
        tracing::debug!(
            name = %entry.name,
            ?id,
            position = ?entry.position,
            "observer registered"
        );
        movers.push((id, entry.position, entry));
    }

    let mut system = LodSystem::with_registry(config, shared(DistanceCulling::new()), registry);
    let managed: Vec<Managed> = scene
        .objects
        .iter()
        .map(|entry| {
            let (behavior, effect) = entry.behavior.build();
            let id = system.spawn(Transform::at(entry.position), behavior);
            Managed {
                name: entry.name.clone(),
                id,
                behavior: entry.behavior.clone(),
                effect,
            }
        })
        .collect();

    for _ in 0..ticks {
        for (id, position, entry) in &mut movers {
            *position += entry.velocity;
            system.move_observer(*id, entry.transform_at(*position))?;
        }
        let stats = system.tick(delta);

        let report = TickReport {
            tick: stats.frame,
            stats,
            objects: managed
                .iter()
                .map(|m| ObjectReport {
                    name: &m.name,
                    behavior: m.behavior.name(),
                    signal: system.signal(m.id),
                    effect: m.effect.describe(),
                })
                .collect(),
        };

        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "tick {}: visible={} invisible={} events={}",
                report.tick, stats.visible, stats.invisible, stats.events_applied
            );
            for object in &report.objects {
                let signal = object
                    .signal
                    .map_or_else(|| "unbound".to_string(), |s| s.to_string());
                println!(
                    "  {:<16} {:<16} {:<36} {}",
                    object.name, object.behavior, signal, object.effect
                );
            }
        }
    }

    Ok(())
}

fn camera_swap(object_count: usize) -> anyhow::Result<()> {
    println!("Camera swap demo: {object_count} objects");

    let config = LodConfig {
        live_radii: false,
        ..LodConfig::default()
    };
    let mut system =
        LodSystem::with_registry(config, shared(DistanceCulling::new()), ObserverRegistry::new());
    system.add_observer(Transform::at(Vec3::new(0.0, 0.0, 8.0)), ViewVolume::sphere(4.0))?;

    let ids: Vec<ObjectId> = (0..object_count)
        .map(|i| {
            let (behavior, _) = BehaviorKind::Animator { radius: 6.0 }.build();
            system.spawn(Transform::at(Vec3::new(i as f32 * 20.0, 0.0, 0.0)), behavior)
        })
        .collect();

    let print_bindings = |label: &str, system: &mut LodSystem| {
        let stats = system.tick(0.016);
        println!(
            "{label}: observers={} culling bindings={} visible={}",
            system.registry().map_or(0, ObserverRegistry::len),
            system.culling().borrow().binding_count(),
            stats.visible
        );
        for id in &ids {
            let bindings = system.object(*id).map_or(0, |o| o.binding_count());
            let signal = system
                .signal(*id)
                .map_or_else(|| "unbound".to_string(), |s| s.to_string());
            println!("  {id:?}: bindings={bindings} {signal}");
        }
    };

    print_bindings("one camera", &mut system);

    let far_end = Vec3::new(object_count.saturating_sub(1) as f32 * 20.0, 0.0, 8.0);
    let second = system.add_observer(Transform::at(far_end), ViewVolume::sphere(4.0))?;
    print_bindings("two cameras", &mut system);

    system.remove_observer(second)?;
    print_bindings("second camera removed", &mut system);

    Ok(())
}
