use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// Describes one kind of OpenGL object and the raw integer the driver uses to name it.
///
/// Not implemented outside of this crate; the set of kinds is fixed by the tag types below.
pub trait HandleKind: 'static {
    /// Raw identifier type the driver hands out for this kind of object.
    type Raw: Copy + Eq + Hash + Debug;
    /// The value the driver uses to mean "no object".
    const NULL: Self::Raw;
    /// Human readable name used in debug output.
    const NAME: &'static str;
}

/// Strongly typed wrapper around a raw OpenGL identifier.
///
/// Handles of different kinds never convert into each other, and a raw integer
/// only becomes a handle through [`Handle::new`].
pub struct Handle<K: HandleKind> {
    raw: K::Raw,
    _phantom: PhantomData<K>,
}

impl<K: HandleKind> Handle<K> {
    /// The null handle for this kind of object.
    pub const NULL: Self = Self::new(K::NULL);

    /// Wraps a raw identifier returned by the driver.
    pub const fn new(raw: K::Raw) -> Self {
        Self {
            raw,
            _phantom: PhantomData,
        }
    }

    /// Underlying value of the handle.
    pub fn raw(self) -> K::Raw {
        self.raw
    }

    pub fn is_null(self) -> bool {
        self.raw == K::NULL
    }
}

// Need Debug/Copy/Clone impls that don't require K: Trait.
impl<K: HandleKind> Debug for Handle<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "{}(NULL)", K::NAME)
        } else {
            write!(f, "{}({:?})", K::NAME, self.raw)
        }
    }
}

impl<K: HandleKind> Copy for Handle<K> {}

impl<K: HandleKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: HandleKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K: HandleKind> Eq for Handle<K> {}

impl<K: HandleKind> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K: HandleKind> Default for Handle<K> {
    fn default() -> Self {
        Self::NULL
    }
}

macro_rules! handle_kinds {
    ($($(#[$outer:meta])* $tag:ident, $alias:ident: $raw:ty = $null:expr;)*) => {
        $(
            $(#[$outer])*
            #[doc(hidden)]
            #[derive(Debug)]
            pub enum $tag {}

            impl HandleKind for $tag {
                type Raw = $raw;
                const NULL: $raw = $null;
                const NAME: &'static str = stringify!($alias);
            }

            $(#[$outer])*
            pub type $alias = Handle<$tag>;
        )*
    };
}

handle_kinds! {
    /// Handle to a texture object.
    TextureTag, TextureHandle: u32 = 0;
    /// Handle to a buffer object.
    BufferTag, BufferHandle: u32 = 0;
    /// 64-bit bindless handle to a texture or image view.
    ViewTag, ViewHandle: u64 = 0;
    /// Handle to a sampler object.
    SamplerTag, SamplerHandle: u32 = 0;
    /// Handle to a linked shader program.
    ShaderTag, ShaderHandle: u32 = 0;
    /// Location of a uniform inside a shader program. Null is -1, like the driver.
    UniformTag, UniformHandle: i32 = -1;
    /// Handle to a render target (framebuffer object).
    TargetTag, TargetHandle: u32 = 0;
    /// Handle to a render target buffer (renderbuffer object).
    TargetBufferTag, TargetBufferHandle: u32 = 0;
    /// Handle to a mesh (vertex array object).
    MeshTag, MeshHandle: u32 = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn null_per_kind() {
        assert!(TextureHandle::NULL.is_null());
        assert!(UniformHandle::NULL.is_null());
        assert_eq!(UniformHandle::NULL.raw(), -1);
        assert!(!UniformHandle::new(0).is_null());
        assert_eq!(ViewHandle::default(), ViewHandle::NULL);
    }

    #[test]
    fn equality_and_hash_follow_raw_value() {
        let mut set = HashSet::new();
        set.insert(TextureHandle::new(3));
        set.insert(TextureHandle::new(3));
        set.insert(TextureHandle::new(4));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn debug_names_the_kind() {
        assert_eq!(format!("{:?}", SamplerHandle::new(7)), "SamplerHandle(7)");
        assert_eq!(format!("{:?}", MeshHandle::NULL), "MeshHandle(NULL)");
    }
}
