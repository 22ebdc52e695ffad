mod blending;
mod stencil;
mod texture;
mod view;
