//! CLI commands and interface

use clap::{Args, Parser, Subcommand};
use mesh_compare::config::ComparisonConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mesh-compare")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two surface meshes
    Compare {
        /// First mesh (.json, .vtk, .vtp or .vtu)
        #[arg(value_name = "MESH1")]
        mesh1: PathBuf,

        /// Second mesh (.json, .vtk, .vtp or .vtu)
        #[arg(value_name = "MESH2")]
        mesh2: PathBuf,

        #[command(flatten)]
        options: CompareOptions,
    },

    /// Compare a mesh against a ground-truth label mask
    Mask {
        /// Mesh to evaluate
        #[arg(value_name = "MESH")]
        mesh: PathBuf,

        /// Ground-truth mask (JSON label volume)
        #[arg(value_name = "MASK")]
        mask: PathBuf,

        /// Label value to extract (default: every non-zero voxel)
        #[arg(long)]
        label: Option<f64>,

        #[command(flatten)]
        options: CompareOptions,
    },

    /// Display information about a mesh file
    Info {
        /// Path to the mesh file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Convert a label mask to a closed surface mesh
    MaskToMesh {
        /// Mask file (JSON label volume)
        #[arg(value_name = "MASK")]
        mask: PathBuf,

        /// Output mesh path (.json, .vtk or .vtp)
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Label value to extract (default: every non-zero voxel)
        #[arg(long)]
        label: Option<f64>,
    },
}

/// Options shared by the comparison commands
#[derive(Args, Debug)]
pub struct CompareOptions {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Results file to append to
    #[arg(long, value_name = "FILE", default_value = "results.txt")]
    pub results: PathBuf,

    /// Also write a JSON report
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Sampling step as a fraction of the reference bounding-box diagonal
    #[arg(long)]
    pub step_fraction: Option<f64>,

    /// Minimum samples along each triangle side
    #[arg(long)]
    pub min_sample_freq: Option<usize>,

    /// Voxels along the longest axis for the volume overlap
    #[arg(long)]
    pub resolution: Option<usize>,
}

impl CompareOptions {
    /// Configuration from the optional file, with command-line overrides applied
    pub fn resolve_config(&self) -> mesh_compare::Result<ComparisonConfig> {
        let mut config = match &self.config {
            Some(path) => ComparisonConfig::from_file(path)?,
            None => ComparisonConfig::default(),
        };

        if let Some(step_fraction) = self.step_fraction {
            config.sampling.step_fraction = step_fraction;
        }
        if let Some(min_sample_freq) = self.min_sample_freq {
            config.sampling.min_sample_freq = min_sample_freq;
        }
        if let Some(resolution) = self.resolution {
            config.volume.resolution = resolution;
        }

        config.validate()?;
        Ok(config)
    }
}
