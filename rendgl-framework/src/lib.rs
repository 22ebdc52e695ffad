//! Window, OpenGL context and frame loop for rendgl applications.
//!
//! Implement [`App`] and hand it to [`start`]. The framework creates the window and
//! the [`Context`], runs physics at a fixed time step, and keeps a [`ConfigFile`]
//! up to date with the window's size.

use std::time::Instant;

use anyhow::Context as _;
use glam::{UVec2, Vec4};
use glutin::{config::ConfigTemplateBuilder, prelude::*};
use glutin_winit::DisplayBuilder;
use rendgl::{Context, GlowDriver};
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

mod clock;
mod config;
mod settings;

pub use clock::{FrameClock, PhysicsClock};
pub use config::{ConfigError, ConfigFile};
pub use settings::{FrameworkSettings, GlSettings};

/// Lets hooks ask the frame loop to stop.
#[derive(Debug, Default)]
pub struct Control {
    quit: Option<bool>,
}

impl Control {
    /// Asks the app to quit. A quit which isn't forced goes through [`App::on_quit`]
    /// and may be cancelled.
    pub fn quit(&mut self, force: bool) {
        self.quit = Some(self.quit.unwrap_or(false) || force);
    }

    fn take_quit(&mut self) -> Option<bool> {
        self.quit.take()
    }
}

pub trait App {
    fn register_logger(&mut self) {
        env_logger::init();
    }

    /// The builder comes with the size and maximized state from the config file.
    fn configure_window(&mut self, builder: WindowBuilder) -> WindowBuilder {
        builder
    }

    fn configure_gl(&mut self, settings: &mut GlSettings) {
        let _ = settings;
    }

    /// Called once the context exists, before the first frame.
    fn on_begin(&mut self, context: &mut Context) {
        let _ = context;
    }

    /// Every event of the main window, after the framework has handled it.
    fn on_event(&mut self, context: &mut Context, control: &mut Control, event: &WindowEvent) {
        let _ = (context, control, event);
    }

    /// Runs zero or more times per frame with a fixed `delta` in seconds.
    fn on_physics(&mut self, context: &mut Context, delta: f32) {
        let _ = (context, delta);
    }

    fn on_update(&mut self, context: &mut Context, control: &mut Control, delta: f32) {
        let _ = (context, control, delta);
    }

    /// Called right after [`App::on_update`] with the viewport covering the window.
    fn on_render(&mut self, context: &mut Context, delta: f32) {
        let _ = delta;
        context.clear_color_and_depth(Vec4::new(1.0, 0.0, 1.0, 1.0), 1.0);
    }

    /// Returning false cancels a quit which isn't forced.
    fn on_quit(&mut self, force: bool) -> bool {
        let _ = force;
        true
    }

    /// Called once the loop has stopped, while the context still exists. Textures
    /// have to be dropped here at the latest.
    fn on_end(&mut self, context: &mut Context) {
        let _ = context;
    }

    fn on_error(&mut self, error: &anyhow::Error) {
        log::error!("{error:?}");
    }
}

/// Runs `app` until it quits, then writes `config` back to its file.
///
/// Errors which stop the app are passed to [`App::on_error`] before being returned.
pub fn start<A: App>(mut app: A, mut config: ConfigFile, settings: FrameworkSettings) -> anyhow::Result<()> {
    app.register_logger();

    let result = run(&mut app, &mut config, &settings);
    if let Err(e) = &result {
        app.on_error(e);
    }

    if let Err(e) = config.write() {
        app.on_error(&anyhow::Error::from(e).context("Could not write the config file"));
    }

    result
}

fn run<A: App>(app: &mut A, config: &mut ConfigFile, settings: &FrameworkSettings) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow::anyhow!("Could not create event loop: {e}"))?;

    let window_builder = app.configure_window(
        WindowBuilder::new()
            .with_title("rendgl app")
            .with_inner_size(physical_size(config.last_window_size))
            .with_min_inner_size(physical_size(settings.min_window_size))
            .with_maximized(config.is_window_maximized)
            .with_visible(false),
    );

    let mut gl_settings = GlSettings::default();
    app.configure_gl(&mut gl_settings);

    let template = ConfigTemplateBuilder::new()
        .with_depth_size(gl_settings.depth_bits)
        .with_stencil_size(gl_settings.stencil_bits)
        .with_single_buffering(!gl_settings.double_buffering);
    let (window, gl_config) = {
        profiling::scope!("creating window");
        DisplayBuilder::new()
            .with_window_builder(Some(window_builder))
            .build(&event_loop, template, pick_config)
            .map_err(|e| anyhow::anyhow!("Could not create window: {e}"))?
    };
    let window = window.context("Window system did not create a window")?;

    let driver = GlowDriver::new(window, &gl_config, gl_settings.debug).context("OpenGL context creation failed")?;
    let mut context = Context::new(driver, gl_settings.vsync).context("OpenGL context creation failed")?;

    app.on_begin(&mut context);

    // We're ready, so lets make things visible
    context.driver().window().set_visible(true);

    let mut physics = PhysicsClock::new(settings.physics_time_step, settings.max_physics_steps_per_frame);
    let mut frames = FrameClock::new(settings.min_frame_time, Instant::now());
    let mut control = Control::default();

    let result = event_loop
        .run(|event, target| {
            match event {
                Event::WindowEvent { event, .. } => {
                    match &event {
                        WindowEvent::CloseRequested => control.quit(false),
                        WindowEvent::Resized(size) => {
                            log::debug!("resize {:?}", size);
                            enforce_min_size(&context, *size, settings.min_window_size);
                            context.driver().resize(size.width, size.height);
                        }
                        WindowEvent::RedrawRequested => {
                            if let Err(e) = frame(app, &mut context, &mut control, &mut physics, &mut frames) {
                                app.on_error(&e);
                                control.quit(true);
                            }
                        }
                        _ => {}
                    }

                    remember_window(config, &context);
                    app.on_event(&mut context, &mut control, &event);
                }
                Event::AboutToWait => match frames.wait_until(Instant::now()) {
                    Some(deadline) => target.set_control_flow(ControlFlow::WaitUntil(deadline)),
                    None => {
                        target.set_control_flow(ControlFlow::Poll);
                        context.driver().window().request_redraw();
                    }
                },
                _ => {}
            }

            if let Some(force) = control.take_quit() {
                if app.on_quit(force) || force {
                    target.exit();
                }
            }
        })
        .map_err(|e| anyhow::anyhow!("Event loop failed: {e}"));

    app.on_end(&mut context);

    result
}

fn frame<A: App>(
    app: &mut A,
    context: &mut Context,
    control: &mut Control,
    physics: &mut PhysicsClock,
    frames: &mut FrameClock,
) -> anyhow::Result<()> {
    profiling::scope!("frame");

    let size = context.driver().window().inner_size();
    if size.width == 0 || size.height == 0 {
        return Ok(());
    }

    let elapsed = frames.begin_frame(Instant::now());
    let delta = elapsed.as_secs_f32();

    let step = physics.time_step().as_secs_f32();
    for _ in 0..physics.advance(elapsed) {
        profiling::scope!("physics");
        app.on_physics(context, step);
    }

    app.on_update(context, control, delta);

    context.set_viewport_size(size.width, size.height);
    {
        profiling::scope!("render");
        app.on_render(context, delta);
    }

    context.driver().swap_buffers().context("Could not present the frame")?;
    profiling::finish_frame!();

    Ok(())
}

// glutin only hands the picker configs which match the template, and at least one.
fn pick_config(configs: Box<dyn Iterator<Item = glutin::config::Config> + '_>) -> glutin::config::Config {
    configs
        .min_by_key(|config| config.num_samples())
        .expect("glutin called the config picker without configs")
}

fn physical_size(size: UVec2) -> PhysicalSize<u32> {
    PhysicalSize::new(size.x, size.y)
}

fn enforce_min_size(context: &Context, size: PhysicalSize<u32>, min: UVec2) {
    let clamped = UVec2::new(size.width, size.height).max(min);
    // A minimized window reports a zero size, which is fine.
    if size.width != 0 && size.height != 0 && clamped != UVec2::new(size.width, size.height) {
        let _ = context.driver().window().request_inner_size(physical_size(clamped));
    }
}

fn remember_window(config: &mut ConfigFile, context: &Context) {
    let window = context.driver().window();
    config.is_window_maximized = window.is_maximized();
    if !config.is_window_maximized {
        let size = window.inner_size();
        if size.width != 0 && size.height != 0 {
            config.last_window_size = UVec2::new(size.width, size.height);
        }
    }
}
