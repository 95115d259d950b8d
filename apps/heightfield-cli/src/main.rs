use anyhow::Context;
use clap::{Parser, Subcommand};
use heightfield_assets::load_heightmap;
use heightfield_common::GridSize;
use heightfield_mesh::GridMesh;
use heightfield_render::{DebugTextRenderer, Renderer, TerrainView};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heightfield-cli", about = "CLI tool for heightfield operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build a grid mesh and print its statistics
    Mesh {
        /// Grid size as WIDTHxHEIGHT or N for a square grid
        #[arg(short, long, default_value = "256x256")]
        size: GridSize,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a heightmap and describe the frame the viewer would draw
    Inspect {
        /// Heightmap image (PNG)
        heightmap: PathBuf,
        /// Grid resolution override (defaults to the image size)
        #[arg(short, long)]
        grid: Option<GridSize>,
        /// Height scale
        #[arg(short, long, default_value = "10")]
        scale: f32,
    },
}

fn mesh_report(size: GridSize, json: bool) -> anyhow::Result<String> {
    let summary = GridMesh::from_size(size).summary();
    tracing::debug!("built {size} grid: {} vertices", summary.vertex_count);
    if json {
        return Ok(serde_json::to_string_pretty(&summary)?);
    }
    Ok(format!(
        "Grid {size}\n  vertices:  {}\n  indices:   {}\n  triangles: {}\n  buffers:   {} B positions, {} B texcoords, {} B indices",
        summary.vertex_count,
        summary.index_count,
        summary.triangle_count,
        summary.position_bytes,
        summary.texcoord_bytes,
        summary.index_bytes,
    ))
}

fn inspect_report(path: &Path, grid: Option<GridSize>, scale: f32) -> anyhow::Result<String> {
    let heightmap = load_heightmap(path)
        .with_context(|| format!("failed to load heightmap {}", path.display()))?;
    let size = grid.unwrap_or_else(|| heightmap.size());
    let mesh = GridMesh::from_size(size);
    let (lo, hi) = heightmap.height_range();
    tracing::info!("inspecting {} on a {size} grid", path.display());

    let mut out = format!(
        "Heightmap {} ({}x{}), heights {lo:.3}..{hi:.3}\n",
        path.display(),
        heightmap.width(),
        heightmap.height()
    );
    out.push_str(&DebugTextRenderer::new().render(&mesh, &TerrainView::default(), scale));
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Info => {
            println!("heightfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", heightfield_common::crate_info());
            println!("mesh: {}", heightfield_mesh::crate_info());
            println!("assets: {}", heightfield_assets::crate_info());
            println!("input: {}", heightfield_input::crate_info());
            println!("render: {}", heightfield_render::crate_info());
        }
        Commands::Mesh { size, json } => {
            println!("{}", mesh_report(size, json)?);
        }
        Commands::Inspect {
            heightmap,
            grid,
            scale,
        } => {
            print!("{}", inspect_report(&heightmap, grid, scale)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_report_text() {
        let report = mesh_report(GridSize::new(2, 1).unwrap(), false).unwrap();
        assert!(report.contains("Grid 2x1"));
        assert!(report.contains("vertices:  8"));
        assert!(report.contains("indices:   12"));
    }

    #[test]
    fn mesh_report_json() {
        let report = mesh_report(GridSize::square(3).unwrap(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["vertex_count"], 36);
        assert_eq!(value["triangle_count"], 18);
    }

    #[test]
    fn inspect_missing_file_mentions_path() {
        let err = inspect_report(Path::new("nowhere/noise.png"), None, 10.0).unwrap_err();
        assert!(format!("{err:#}").contains("noise.png"));
    }

    fn write_ramp_png(dir: &Path) -> PathBuf {
        use image::ImageEncoder;
        let path = dir.join("ramp.png");
        let pixels: Vec<u8> = (0..16u8).map(|v| v * 17).collect();
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(&pixels, 4, 4, image::ExtendedColorType::L8)
            .unwrap();
        std::fs::write(&path, out).unwrap();
        path
    }

    #[test]
    fn inspect_reports_heights_and_image_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ramp_png(dir.path());
        let report = inspect_report(&path, None, 10.0).unwrap();
        assert!(report.contains("(4x4), heights 0.000..1.000"));
        assert!(report.contains("grid=4x4"));
    }

    #[test]
    fn inspect_grid_override_reaches_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ramp_png(dir.path());
        let report = inspect_report(&path, Some(GridSize::new(8, 2).unwrap()), 10.0).unwrap();
        let mesh = GridMesh::from_size(GridSize::new(8, 2).unwrap());
        let frame = DebugTextRenderer::new().render(&mesh, &TerrainView::default(), 10.0);
        assert!(report.ends_with(&frame));
    }

    #[test]
    fn cli_parses_mesh_size() {
        let cli = Cli::try_parse_from(["heightfield-cli", "mesh", "--size", "64x32"]).unwrap();
        match cli.command {
            Commands::Mesh { size, json } => {
                assert_eq!(size, GridSize::new(64, 32).unwrap());
                assert!(!json);
            }
            _ => panic!("expected mesh command"),
        }
    }
}
