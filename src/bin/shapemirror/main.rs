//! Shapemirror CLI - mirror maps and symmetric shape key editing.
//!
//! Usage: shapemirror <COMMAND> [OPTIONS] <INPUT>
//!
//! Run `shapemirror --help` for available commands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nalgebra::Point3;

use shapemirror::algo::components::connected_components;
use shapemirror::algo::mirror::{self, build_mirror_map, MirrorOptions};
use shapemirror::algo::symmetry::find_asymmetry;
use shapemirror::algo::transfer::{self, TransferReport};
use shapemirror::error::MirrorError;
use shapemirror::io;
use shapemirror::mesh::{MeshObject, ShapeKeyStore};

#[derive(Parser)]
#[command(name = "shapemirror")]
#[command(author, version, long_about = None)]
#[command(about = "Mirror maps and symmetric shape key editing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh and shape key information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Build and summarize the mirror map of a mesh
    Map {
        /// Input mesh file
        input: PathBuf,

        /// Print every (source, destination) pair
        #[arg(long)]
        pairs: bool,

        #[command(flatten)]
        mirror: MirrorArgs,
    },

    /// Check whether a reference shape is symmetric
    Check {
        /// Input mesh file
        input: PathBuf,

        /// Shape key of the input to check
        #[arg(short, long, conflicts_with = "reference")]
        key: Option<String>,

        /// File holding the reference positions to check
        #[arg(short, long)]
        reference: Option<PathBuf>,

        #[command(flatten)]
        mirror: MirrorArgs,
    },

    /// Mirror one side of a shape key onto the other
    Symmetrize {
        #[command(flatten)]
        key: KeyArgs,

        #[command(flatten)]
        mirror: MirrorArgs,
    },

    /// Swap the two sides of a shape key
    Swap {
        #[command(flatten)]
        key: KeyArgs,

        #[command(flatten)]
        mirror: MirrorArgs,
    },
}

/// Selects the shape key to edit and where to write it.
#[derive(Args)]
struct KeyArgs {
    /// Input mesh file
    input: PathBuf,

    /// Output file for the edited shape key
    #[arg(short, long)]
    output: PathBuf,

    /// Name of a shape key stored in the input
    #[arg(short, long, required_unless_present = "target", conflicts_with = "target")]
    key: Option<String>,

    /// File holding the shape key positions (named after its file stem)
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// File holding the reference positions for --target (default: Basis)
    #[arg(short, long, requires = "target")]
    reference: Option<PathBuf>,
}

#[derive(Args)]
struct MirrorArgs {
    /// Mirror axis
    #[arg(short, long, value_enum, default_value = "x")]
    axis: Axis,

    /// Which side is the source
    #[arg(short, long, value_enum, default_value = "negative")]
    direction: Direction,

    /// Distance tolerance for matching and the on-plane test
    #[arg(long, default_value = "0.0001")]
    tolerance: f64,

    /// Use single-threaded execution (for benchmarking)
    #[arg(long)]
    sequential: bool,
}

impl MirrorArgs {
    fn options(&self) -> MirrorOptions {
        MirrorOptions::default()
            .with_axis(self.axis.into())
            .with_direction(self.direction.into())
            .with_tolerance(self.tolerance)
            .with_parallel(!self.sequential)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Axis {
    /// Mirror across the YZ plane
    X,
    /// Mirror across the XZ plane
    Y,
    /// Mirror across the XY plane
    Z,
}

impl From<Axis> for mirror::Axis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => mirror::Axis::X,
            Axis::Y => mirror::Axis::Y,
            Axis::Z => mirror::Axis::Z,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Direction {
    /// Negative side is the source
    Negative,
    /// Positive side is the source
    Positive,
}

impl From<Direction> for mirror::Direction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Negative => mirror::Direction::NegativeToPositive,
            Direction::Positive => mirror::Direction::PositiveToNegative,
        }
    }
}

#[derive(Copy, Clone)]
enum Operation {
    Symmetrize,
    Swap,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        // Ran fine, but the checked shape is not symmetric
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run a command. Returns `Ok(false)` when `check` finds an asymmetry.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Map {
            input,
            pairs,
            mirror,
        } => {
            cmd_map(&input, pairs, &mirror.options())?;
        }

        Commands::Check {
            input,
            key,
            reference,
            mirror,
        } => {
            return cmd_check(&input, key.as_deref(), reference.as_deref(), &mirror.options());
        }

        Commands::Symmetrize { key, mirror } => {
            cmd_transfer(Operation::Symmetrize, &key, &mirror.options())?;
        }

        Commands::Swap { key, mirror } => {
            cmd_transfer(Operation::Swap, &key, &mirror.options())?;
        }
    }

    Ok(true)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let object = io::load(input)?;
    let mesh = &object.mesh;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());

    let components = connected_components(mesh);
    println!(
        "Components: {} (largest: {} vertices)",
        components.len(),
        components.largest()
    );

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    match &object.shape_keys {
        None => println!("Shape keys: none"),
        Some(keys) => {
            println!("Shape keys: {}", keys.len());
            for (id, key) in keys.iter() {
                let relative = key
                    .relative_key()
                    .map(|r| keys.key_name(r).to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                let moved = (0..mesh.num_vertices())
                    .filter(|&v| keys.delta(id, v).is_some_and(|d| d.norm() > 0.0))
                    .count();
                println!(
                    "  {} (relative to {}, {} displaced vertices)",
                    key.name(),
                    relative,
                    moved
                );
            }
        }
    }

    Ok(())
}

fn cmd_map(
    input: &Path,
    show_pairs: bool,
    options: &MirrorOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    options.validate()?;
    let object = io::load(input)?;

    print_loaded(&object);
    println!("Building mirror map ({}-axis, {})...", options.axis, options.direction);

    let start = Instant::now();
    let map = build_mirror_map(&object.mesh, options);
    let elapsed = start.elapsed();

    println!("Pairs: {}", map.len());
    println!("Self-mapped: {}", map.self_mapped());
    println!("Unmatched sources: {}", map.unmatched().len());
    println!("Elapsed: {:.2?}", elapsed);

    if show_pairs {
        for (src, dst) in map.iter() {
            println!("{} -> {}", src, dst);
        }
    }

    Ok(())
}

fn cmd_check(
    input: &Path,
    key: Option<&str>,
    reference: Option<&Path>,
    options: &MirrorOptions,
) -> Result<bool, Box<dyn std::error::Error>> {
    options.validate()?;
    let object = io::load(input)?;

    let (label, positions) = match (key, reference) {
        (Some(name), _) => {
            let keys = object.shape_keys.as_ref().ok_or(MirrorError::NoShapeKeys)?;
            let id = keys.find_key(name).ok_or_else(|| MirrorError::ShapeKeyNotFound {
                name: name.to_string(),
            })?;
            (name.to_string(), keys.key_positions(id).to_vec())
        }
        (None, Some(path)) => {
            let positions = load_key_positions(&object, path)?;
            (path.display().to_string(), positions)
        }
        (None, None) => ("base mesh".to_string(), object.mesh.positions().to_vec()),
    };

    // Symmetry is always judged on the negative-to-positive correspondence.
    let check_options = options
        .clone()
        .with_direction(mirror::Direction::NegativeToPositive);
    let map = build_mirror_map(&object.mesh, &check_options);
    if map.is_empty() {
        return Err(MirrorError::EmptyMirrorMap.into());
    }

    match find_asymmetry(&positions, &map, options.axis, options.tolerance) {
        None => {
            println!(
                "{} is symmetric on {}-axis ({} pairs checked)",
                label,
                options.axis,
                map.len()
            );
            Ok(true)
        }
        Some(a) => {
            println!("{} is NOT symmetric on {}-axis", label, options.axis);
            println!(
                "First violation: {} -> {} (distance {:.6}, tolerance {})",
                a.source, a.destination, a.distance, options.tolerance
            );
            Ok(false)
        }
    }
}

fn cmd_transfer(
    operation: Operation,
    args: &KeyArgs,
    options: &MirrorOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut object = io::load(&args.input)?;

    print_loaded(&object);

    let key_name = match (&args.key, &args.target) {
        (Some(name), _) => name.clone(),
        (None, Some(target)) => attach_key_files(&mut object, target, args.reference.as_deref())?,
        (None, None) => {
            return Err(MirrorError::invalid_param("key", "(none)", "pass --key or --target").into())
        }
    };

    let mode = if options.parallel { "parallel" } else { "sequential" };
    let start = Instant::now();
    let report: TransferReport = match operation {
        Operation::Symmetrize => {
            println!(
                "Symmetrizing '{}' ({}-axis, {}, {})...",
                key_name, options.axis, options.direction, mode
            );
            transfer::symmetrize(&mut object, &key_name, options)?
        }
        Operation::Swap => {
            println!("Swapping '{}' ({}, {})...", key_name, options.axis, mode);
            transfer::swap(&mut object, &key_name, options)?
        }
    };
    let elapsed = start.elapsed();

    println!(
        "Result: {} pairs, {} written, {} skipped",
        report.pairs, report.written, report.skipped
    );
    io::save_key(&object, &key_name, &args.output)?;
    println!("Saved: {} ({:.2?})", args.output.display(), elapsed);

    Ok(())
}

fn print_loaded(object: &MeshObject) {
    println!(
        "Loaded: {} vertices, {} edges",
        object.mesh.num_vertices(),
        object.mesh.num_edges()
    );
}

/// Add the `--target` (and optional `--reference`) files as shape keys and
/// return the target key's name.
fn attach_key_files(
    object: &mut MeshObject,
    target: &Path,
    reference: Option<&Path>,
) -> Result<String, Box<dyn std::error::Error>> {
    let target_positions = load_key_positions(object, target)?;
    let reference_positions = reference
        .map(|path| load_key_positions(object, path).map(|p| (key_name_for(path), p)))
        .transpose()?;

    let keys = object.ensure_shape_keys();
    let mut relative = keys.basis();
    if let Some((name, positions)) = reference_positions {
        relative = Some(keys.add_key(name, positions, relative)?);
    }

    let name = key_name_for(target);
    keys.add_key(name.clone(), target_positions, relative)?;
    Ok(name)
}

/// Load positions from a file and check they line up with the base mesh.
fn load_key_positions(
    object: &MeshObject,
    path: &Path,
) -> Result<Vec<Point3<f64>>, Box<dyn std::error::Error>> {
    let positions = io::load_positions(path)?;
    if positions.len() != object.mesh.num_vertices() {
        return Err(MirrorError::LoadError {
            path: path.to_path_buf(),
            message: format!(
                "{} vertices, base mesh has {}",
                positions.len(),
                object.mesh.num_vertices()
            ),
        }
        .into());
    }
    Ok(positions)
}

fn key_name_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Key")
        .to_string()
}
