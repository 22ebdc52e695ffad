//! Entry points of `GL_ARB_bindless_texture`, which glow doesn't expose.

use std::ffi::{c_void, CStr};

use crate::DriverError;

type GetTextureHandle = unsafe extern "system" fn(texture: u32) -> u64;
type GetTextureSamplerHandle = unsafe extern "system" fn(texture: u32, sampler: u32) -> u64;
type GetImageHandle = unsafe extern "system" fn(texture: u32, level: i32, layered: u8, layer: i32, format: u32) -> u64;
type MakeHandleResident = unsafe extern "system" fn(handle: u64);
type MakeImageHandleResident = unsafe extern "system" fn(handle: u64, access: u32);
type MakeHandleNonResident = unsafe extern "system" fn(handle: u64);
type IsHandleResident = unsafe extern "system" fn(handle: u64) -> u8;

pub(crate) struct BindlessFns {
    pub get_texture_handle: GetTextureHandle,
    pub get_texture_sampler_handle: GetTextureSamplerHandle,
    pub get_image_handle: GetImageHandle,
    pub make_texture_handle_resident: MakeHandleResident,
    pub make_texture_handle_non_resident: MakeHandleNonResident,
    pub make_image_handle_resident: MakeImageHandleResident,
    pub make_image_handle_non_resident: MakeHandleNonResident,
    pub is_texture_handle_resident: IsHandleResident,
    pub is_image_handle_resident: IsHandleResident,
}

impl BindlessFns {
    /// # Safety
    ///
    /// `loader` must return pointers to functions of the current OpenGL context, or null.
    pub unsafe fn load(mut loader: impl FnMut(&CStr) -> *const c_void) -> Result<Self, DriverError> {
        macro_rules! load {
            ($name:literal) => {{
                let ptr = loader(CStr::from_bytes_with_nul_unchecked(concat!($name, "\0").as_bytes()));
                if ptr.is_null() {
                    return Err(DriverError::MissingFunction($name));
                }
                std::mem::transmute_copy(&ptr)
            }};
        }

        Ok(Self {
            get_texture_handle: load!("glGetTextureHandleARB"),
            get_texture_sampler_handle: load!("glGetTextureSamplerHandleARB"),
            get_image_handle: load!("glGetImageHandleARB"),
            make_texture_handle_resident: load!("glMakeTextureHandleResidentARB"),
            make_texture_handle_non_resident: load!("glMakeTextureHandleNonResidentARB"),
            make_image_handle_resident: load!("glMakeImageHandleResidentARB"),
            make_image_handle_non_resident: load!("glMakeImageHandleNonResidentARB"),
            is_texture_handle_resident: load!("glIsTextureHandleResidentARB"),
            is_image_handle_resident: load!("glIsImageHandleResidentARB"),
        })
    }
}
