//! Type declarations for the rendgl OpenGL crate.
//!
//! This is reexported in the rendgl crate proper and includes all the "surface"
//! api arguments: typed object handles, the values that make up the tracked
//! render state, and texture/sampler/view descriptions.

/// Reexport of the glam version rendgl is using.
pub use glam;

mod handle;
mod state;
mod texture;

pub use handle::*;
pub use state::*;
pub use texture::*;
