//! Mesh Compare CLI Application

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mesh_compare::io::{self, ComparisonReport, MeshSummary};
use mesh_compare::mesh::{count_non_manifold_edges, count_open_edges, mask_to_mesh, Mesh};
use mesh_compare::{compare_with_config, MeshDifferences};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod cli;
use cli::{Cli, CompareOptions, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Compare {
            mesh1,
            mesh2,
            options,
        } => cmd_compare(mesh1, mesh2, options),
        Commands::Mask {
            mesh,
            mask,
            label,
            options,
        } => cmd_mask(mesh, mask, label, options),
        Commands::Info { input } => cmd_info(input),
        Commands::MaskToMesh {
            mask,
            output,
            label,
        } => cmd_mask_to_mesh(mask, output, label),
    }
}

fn cmd_compare(mesh1: PathBuf, mesh2: PathBuf, options: CompareOptions) -> Result<()> {
    let first = load_mesh(&mesh1)?;
    let second = load_mesh(&mesh2)?;

    run_comparison(
        (&mesh1.display().to_string(), &first),
        (&mesh2.display().to_string(), &second),
        &options,
    )
}

fn cmd_mask(mesh: PathBuf, mask: PathBuf, label: Option<f64>, options: CompareOptions) -> Result<()> {
    let mask_surface = load_mask_surface(&mask, label)?;
    let evaluated = load_mesh(&mesh)?;

    // The ground truth is always the first mesh
    run_comparison(
        (&mask.display().to_string(), &mask_surface),
        (&mesh.display().to_string(), &evaluated),
        &options,
    )
}

fn cmd_info(input: PathBuf) -> Result<()> {
    println!("Reading mesh file: {}", input.display());
    let mesh = load_mesh(&input)?;

    println!("\n{}", "=".repeat(60));
    println!("MESH INFORMATION");
    println!("{}", "=".repeat(60));
    println!();
    println!("  Vertices:             {}", mesh.num_vertices());
    println!("  Triangles:            {}", mesh.num_faces());
    println!("  Surface area:         {:.6}", mesh.surface_area());
    println!("  Enclosed volume:      {:.6}", mesh.signed_volume());
    println!("  Open edges:           {}", count_open_edges(&mesh));
    println!("  Non-manifold edges:   {}", count_non_manifold_edges(&mesh));

    if let Some(bounds) = mesh.bounds() {
        println!();
        println!("Bounds:");
        println!(
            "  Min:  ({:.6}, {:.6}, {:.6})",
            bounds.min.x, bounds.min.y, bounds.min.z
        );
        println!(
            "  Max:  ({:.6}, {:.6}, {:.6})",
            bounds.max.x, bounds.max.y, bounds.max.z
        );
        println!("  Diagonal: {:.6}", bounds.diagonal());
    }

    println!();
    println!("{}", "=".repeat(60));

    Ok(())
}

fn cmd_mask_to_mesh(mask: PathBuf, output: PathBuf, label: Option<f64>) -> Result<()> {
    let surface = load_mask_surface(&mask, label)?;

    io::write_mesh(&surface, &output)
        .with_context(|| format!("Failed to write mesh to {}", output.display()))?;

    println!(
        "Wrote {} vertices and {} triangles to {}",
        surface.num_vertices(),
        surface.num_faces(),
        output.display()
    );

    Ok(())
}

fn load_mesh(path: &Path) -> Result<Mesh> {
    io::read_mesh(path).with_context(|| format!("Failed to read mesh {}", path.display()))
}

fn load_mask_surface(path: &Path, label: Option<f64>) -> Result<Mesh> {
    let mask = io::read_mask(path, label)
        .with_context(|| format!("Failed to read mask {}", path.display()))?;

    mask_to_mesh(&mask)
        .with_context(|| format!("Failed to build a surface from mask {}", path.display()))
}

fn run_comparison(
    first: (&str, &Mesh),
    second: (&str, &Mesh),
    options: &CompareOptions,
) -> Result<()> {
    let config = options.resolve_config()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(format!("Comparing {} and {}", first.0, second.0));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = compare_with_config(first.1, second.1, &config);
    spinner.finish_and_clear();
    let differences: MeshDifferences = outcome?;

    differences.print_summary();

    io::append_results(&options.results, &differences).with_context(|| {
        format!("Failed to append results to {}", options.results.display())
    })?;

    if let Some(report_path) = &options.report {
        let report = ComparisonReport::new(
            MeshSummary::new(first.0, first.1),
            MeshSummary::new(second.0, second.1),
            &config,
            &differences,
        );
        report
            .export(report_path)
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;
        log::info!("Wrote comparison report to {:?}", report_path);
    }

    Ok(())
}
