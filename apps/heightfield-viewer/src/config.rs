use anyhow::{Context, Result};
use clap::Parser;
use heightfield_assets::AddressMode;
use heightfield_common::GridSize;
use heightfield_render::TerrainView;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "heightfield-viewer", about = "Render a heightmap-displaced terrain grid")]
pub struct Cli {
    /// Heightmap image (PNG); red channel is the height
    pub heightmap: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// JSON config file; flags given here override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// WGSL shader replacing the built-in terrain shader
    #[arg(long)]
    pub shader: Option<PathBuf>,

    /// Grid resolution WIDTHxHEIGHT (defaults to the image size)
    #[arg(long)]
    pub grid: Option<GridSize>,

    /// Initial height scale
    #[arg(long)]
    pub scale: Option<f32>,

    /// Height scale change per second while +/- is held
    #[arg(long)]
    pub scale_rate: Option<f32>,

    /// Heightmap addressing outside [0, 1]: clamp or mirror-repeat
    #[arg(long)]
    pub address_mode: Option<AddressMode>,

    /// Window width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    pub height: Option<u32>,
}

/// Viewer settings, resolved from defaults, an optional JSON file and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub heightmap: PathBuf,
    pub shader: Option<PathBuf>,
    pub grid: Option<GridSize>,
    pub title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub clear_color: [f64; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub initial_scale: f32,
    pub scale_rate: f32,
    pub address_mode: AddressMode,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::from("res/images/noise.png"),
            shader: None,
            grid: None,
            title: "Heightfield".into(),
            window_width: 1280,
            window_height: 720,
            clear_color: [0.1, 0.1, 0.1],
            fov_degrees: 45.0,
            near: 0.1,
            far: 1500.0,
            initial_scale: 10.0,
            scale_rate: 60.0,
            address_mode: AddressMode::Clamp,
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open config {}", path.display()))?;
        let config = serde_json::from_reader(file)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Defaults, then the `--config` file if given, then explicit flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.heightmap {
            self.heightmap = path.clone();
        }
        if let Some(path) = &cli.shader {
            self.shader = Some(path.clone());
        }
        if let Some(grid) = cli.grid {
            self.grid = Some(grid);
        }
        if let Some(scale) = cli.scale {
            self.initial_scale = scale;
        }
        if let Some(rate) = cli.scale_rate {
            self.scale_rate = rate;
        }
        if let Some(mode) = cli.address_mode {
            self.address_mode = mode;
        }
        if let Some(width) = cli.width {
            self.window_width = width;
        }
        if let Some(height) = cli.height {
            self.window_height = height;
        }
    }

    pub fn terrain_view(&self) -> TerrainView {
        let mut view = TerrainView {
            fov_degrees: self.fov_degrees,
            near: self.near,
            far: self.far,
            ..TerrainView::default()
        };
        view.set_viewport(self.window_width, self.window_height);
        view
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_color;
        wgpu::Color { r, g, b, a: 1.0 }
    }
}
