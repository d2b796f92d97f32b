// cli.rs - Command-line interface configuration
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "ray-caster")]
#[command(about = "Multithreaded CPU ray caster", long_about = None)]
pub struct Cli {
    /// Scene to render (demo, walls)
    #[arg(long, default_value = "demo")]
    pub scene: String,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Render worker count (defaults to the available parallelism)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 90.0)]
    pub fov: f32,
}
