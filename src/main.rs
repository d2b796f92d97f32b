use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use ray_caster::camera::Camera;
use ray_caster::cli::Cli;
use ray_caster::dispatch::{FrameBuffer, RenderPool};
use ray_caster::display::PixelBlitter;
use ray_caster::scene::Scene;
use ray_caster::scenes::create_scene;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    blitter: Option<PixelBlitter>,
    pool: RenderPool,
    scene: Scene,
    camera: Camera,
    output: Option<Arc<FrameBuffer>>,
    frame_in_flight: bool,
    start_time: Instant,
    last_frame_time: Instant,
    frame_count: u32,
    fps_update_timer: f32,
}

impl App {
    fn new(cli: Cli) -> Self {
        let pool = match cli.workers {
            Some(workers) => RenderPool::new(workers),
            None => RenderPool::with_default_workers(),
        };

        let scene = create_scene(&cli.scene);
        let mut camera = Camera::new_for_scene(&cli.scene);
        camera.fov = cli.fov.to_radians();

        log::info!(
            "scene '{}': {} surfaces, {} lights",
            cli.scene,
            scene.surface_count(),
            scene.lights.len()
        );

        let now = Instant::now();
        Self {
            cli,
            window: None,
            blitter: None,
            pool,
            scene,
            camera,
            output: None,
            frame_in_flight: false,
            start_time: now,
            last_frame_time: now,
            frame_count: 0,
            fps_update_timer: 0.0,
        }
    }

    fn update_fps(&mut self, delta: f32) {
        self.frame_count += 1;
        self.fps_update_timer += delta;

        if self.fps_update_timer >= FPS_UPDATE_INTERVAL {
            let fps = self.frame_count as f32 / self.fps_update_timer;
            log::info!("{fps:.1} fps");
            self.frame_count = 0;
            self.fps_update_timer = 0.0;
        }
    }

    /// Bake the scene for the current camera pose and hand the frame to
    /// the pool. Anything still in flight is superseded by the counter
    /// bump inside dispatch.
    fn dispatch_frame(&mut self) {
        let Some(output) = &self.output else { return };

        self.scene.tick(self.start_time.elapsed().as_secs_f32());
        let snapshot = Arc::new(self.scene.bake(&self.camera));
        let projection_distance = self.camera.projection_distance(output.width());
        self.pool.dispatch(snapshot, output, projection_distance);
        self.frame_in_flight = true;
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(blitter) = &mut self.blitter {
            blitter.resize(width, height);
        }
        self.output = Some(FrameBuffer::new(width, height));
        // Don't wait for in-flight bands of the old size; they fail the
        // freshness check and vanish
        self.dispatch_frame();
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        self.camera.update(delta);

        if self.pool.poll_complete().is_some() {
            self.frame_in_flight = false;
            if let (Some(blitter), Some(output)) = (&mut self.blitter, &self.output) {
                if let Err(e) = blitter.present(&output.pixels()) {
                    log::error!("present failed: {e}");
                }
            }
            self.update_fps(delta);
        }

        if !self.frame_in_flight {
            self.dispatch_frame();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attributes = Window::default_attributes()
                .with_title("Ray Caster")
                .with_inner_size(winit::dpi::LogicalSize::new(self.cli.width, self.cli.height));

            let window = match event_loop.create_window(attributes) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("failed to create window: {e}");
                    event_loop.exit();
                    return;
                }
            };

            let blitter = match PixelBlitter::new(window.clone()) {
                Ok(b) => b,
                Err(e) => {
                    log::error!("failed to initialize display: {e}");
                    event_loop.exit();
                    return;
                }
            };

            let (width, height) = blitter.dimensions();
            self.window = Some(window);
            self.blitter = Some(blitter);
            self.output = Some(FrameBuffer::new(width, height));
            self.dispatch_frame();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => self.camera.process_keyboard(&event),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);

    log::info!("controls: WASD + Space/Shift to move, Q/E to turn, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
