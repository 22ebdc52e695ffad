//! A template window app built on rendgl.
//!
//! Command-line arguments:
//!     --no-write-config    don't update Config.toml on exit

use glam::{IVec2, Vec4};
use pico_args::Arguments;
use rendgl::{
    types::{BlendStateRgba, CompareFunction, FaceCullMode, MipmapCount, Rect, TextureDescriptor, TextureFormat},
    winit::window::WindowBuilder,
    Context, Texture, TextureView,
};
use rendgl_framework::{App, ConfigFile, Control, FrameworkSettings};

const CONFIG_FILE: &str = "Config.toml";

#[derive(Default)]
struct TemplateApp {
    elapsed: f32,
    physics_ticks: u64,
    checker: Option<(TextureView, Texture)>,
}

impl App for TemplateApp {
    fn configure_window(&mut self, builder: WindowBuilder) -> WindowBuilder {
        builder.with_title("rendgl app template")
    }

    fn on_begin(&mut self, context: &mut Context) {
        log::info!(
            "Running on {} ({}), OpenGL {}.{}",
            context.info().renderer,
            context.info().vendor,
            context.info().version.0,
            context.info().version.1
        );

        match create_checker(context) {
            Ok(checker) => {
                log::info!("Checker texture is bindless handle {:?}", checker.0.handle());
                self.checker = Some(checker);
            }
            Err(e) => log::warn!("Could not create the checker texture: {e:?}"),
        }
    }

    fn on_physics(&mut self, _context: &mut Context, _delta: f32) {
        self.physics_ticks += 1;
    }

    fn on_update(&mut self, _context: &mut Context, _control: &mut Control, delta: f32) {
        self.elapsed += delta;
    }

    fn on_render(&mut self, context: &mut Context, _delta: f32) {
        context.set_depth_test(Some(CompareFunction::LessOrEqual));
        context.set_cull_mode(FaceCullMode::Back);
        context.set_blending(BlendStateRgba::TRANSPARENT);

        let pulse = 0.5 + 0.5 * self.elapsed.sin();
        context.clear_color_and_depth(Vec4::new(0.1, 0.1 * pulse, 0.2, 1.0), 1.0);

        // Clear a square in the corner through the scissor test.
        let corner = Rect::from_origin_size(IVec2::new(16, 16), IVec2::splat(64));
        context.set_scissor(Some(corner));
        context.clear_color(Vec4::new(pulse, 0.4, 0.1, 1.0));
        context.disable_scissor();
    }

    fn on_quit(&mut self, force: bool) -> bool {
        log::info!(
            "Quitting after {:.1}s and {} physics ticks (forced: {force})",
            self.elapsed,
            self.physics_ticks
        );
        true
    }

    fn on_end(&mut self, _context: &mut Context) {
        self.checker = None;
    }
}

fn create_checker(context: &Context) -> anyhow::Result<(TextureView, Texture)> {
    let desc = TextureDescriptor::new_2d(TextureFormat::Rgba8Unorm, 256, 256)
        .with_mips(MipmapCount::Maximum)
        .with_label("checker");
    let texture = Texture::new(context, desc)?;
    texture.recompute_mips()?;
    let view = texture.texture_view(None)?;
    Ok((view, texture))
}

fn main() -> anyhow::Result<()> {
    let mut args = Arguments::from_env();
    let no_write_config = args.contains("--no-write-config");
    let remaining = args.finish();
    if !remaining.is_empty() {
        eprintln!("Ignoring unknown arguments: {remaining:?}");
    }

    let config = ConfigFile::load(std::env::current_dir()?.join(CONFIG_FILE), no_write_config)?;

    rendgl_framework::start(TemplateApp::default(), config, FrameworkSettings::default())
}
