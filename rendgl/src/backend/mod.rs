mod bindless;
mod conv;
mod gl;

pub use gl::GlowDriver;
