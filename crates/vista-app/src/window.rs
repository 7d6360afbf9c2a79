//! winit application handler and the per-frame loop.
//!
//! One frame per redraw: read input, tick the clock, advance the scene,
//! pick up any background assets that finished, draw, then ask for the next
//! redraw. Nothing overlaps between frames.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use vista_assets::{AssetLoader, FsSource};
use vista_config::Config;
use vista_input::{ControlMap, KeyboardState};
use vista_render::{
    GpuError, SceneRenderer, SurfaceError, WgpuDriver, init_render_context_blocking,
};
use vista_scene::{FrameClock, SceneState};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::startup::{
    PendingAssets, StartupError, build_terrain, resolve_seed, scene_settings, terrain_options,
    upload_terrain,
};

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Everything that exists once the window and GPU are up.
struct Runtime {
    window: Arc<Window>,
    driver: WgpuDriver,
    renderer: SceneRenderer,
    scene: SceneState,
    clock: FrameClock,
    pending: PendingAssets,
}

pub struct App {
    config: Config,
    controls: ControlMap,
    keyboard: KeyboardState,
    runtime: Option<Runtime>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            controls: ControlMap::default(),
            keyboard: KeyboardState::new(),
            runtime: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.runtime.is_some()
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Runtime, StartupError> {
        let attrs = window_attributes_from_config(&self.config);
        let window = Arc::new(event_loop.create_window(attrs)?);
        let context = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let mut driver = WgpuDriver::new(context);
        let mut renderer = SceneRenderer::new(&driver)?;

        let size = window.inner_size();
        renderer.set_viewport(&mut driver, size.width, size.height);

        let seed = resolve_seed(self.config.terrain.seed);
        let options = terrain_options(&self.config.terrain, seed);
        let loader = AssetLoader::new(FsSource::new(&self.config.assets.root));

        let terrain = build_terrain(&self.config.terrain, &options, loader.source())?;
        upload_terrain(&mut driver, &mut renderer, &terrain, &options)?;
        info!(seed, noise = %options.noise, "terrain ready");

        let pending = PendingAssets::spawn(&loader, &self.config.assets);
        let scene = SceneState::new(scene_settings(&self.config, seed));

        // Terrain generation is not frame time.
        let mut clock = FrameClock::new();
        clock.restart_measurement();

        Ok(Runtime {
            window,
            driver,
            renderer,
            scene,
            clock,
            pending,
        })
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(runtime) = &mut self.runtime else {
            return;
        };

        if self.controls.quit_requested(&self.keyboard) {
            info!("Escape pressed, shutting down");
            event_loop.exit();
            return;
        }
        for event in self.controls.discrete_events(&self.keyboard) {
            runtime.scene.apply_event(event);
        }
        let intents = self.controls.held_intents(&self.keyboard);
        self.keyboard.clear_transients();

        let frame = runtime.clock.tick();
        runtime.scene.update(frame, intents);
        runtime
            .pending
            .poll(&mut runtime.driver, &mut runtime.renderer, &mut runtime.scene);

        match runtime.renderer.render(&mut runtime.driver, &runtime.scene) {
            Ok(()) => {}
            Err(GpuError::Surface(SurfaceError::Timeout)) => {
                warn!("Surface timeout, skipping frame");
            }
            Err(GpuError::Surface(SurfaceError::OutOfMemory)) => {
                error!("GPU out of memory, shutting down");
                event_loop.exit();
                return;
            }
            Err(e) => error!("Frame failed: {e}"),
        }

        runtime.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.runtime.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(runtime) => {
                runtime.window.request_redraw();
                self.runtime = Some(runtime);
            }
            Err(e) => {
                error!("Startup failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(runtime) = &mut self.runtime {
                    runtime
                        .renderer
                        .set_viewport(&mut runtime.driver, size.width, size.height);
                    info!("Window resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
            }
            WindowEvent::Focused(false) => {
                self.keyboard.release_all();
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer until the window closes.
#[instrument(skip(config))]
pub fn run(config: Config) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_starts_without_runtime() {
        let app = App::new(Config::default());
        assert!(!app.is_running(), "GPU state is created on resume");
        assert_eq!(app.config().window.title, "Vista");
    }

    #[test]
    fn test_window_attributes_from_config() {
        let mut config = Config::default();
        config.window.title = "Terrain".to_string();
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Terrain");
        assert!(attrs.inner_size.is_some());
    }
}
