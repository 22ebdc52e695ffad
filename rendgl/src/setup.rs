use crate::{ContextCreationError, DriverInfo};

/// Lowest OpenGL version rendgl runs on.
pub const REQUIRED_VERSION: (u32, u32) = (4, 5);

/// Version directive matching [`REQUIRED_VERSION`], for prefixing shader sources.
pub const GLSL_VERSION: &str = "#version 450";

/// Extensions that must be present for the context to be created.
pub const REQUIRED_EXTENSIONS: &[&str] = &["GL_ARB_bindless_texture"];

/// Extensions rendgl can make use of if they are there, but doesn't require.
pub const OPTIONAL_EXTENSIONS: &[&str] = &["GL_ARB_texture_filter_anisotropic", "GL_KHR_debug"];

/// Check that the driver's API version is new enough.
pub fn check_version(info: &DriverInfo) -> Result<(u32, u32), ContextCreationError> {
    if info.version < REQUIRED_VERSION {
        Err(ContextCreationError::UnsupportedVersion {
            found: info.version,
            required: REQUIRED_VERSION,
        })
    } else {
        Ok(info.version)
    }
}

/// Check that all required extensions are present. Returns the optional extensions which are also available.
pub fn check_extensions(info: &DriverInfo) -> Result<Vec<&'static str>, ContextCreationError> {
    let missing: Vec<_> = REQUIRED_EXTENSIONS
        .iter()
        .copied()
        .filter(|ext| !info.supports_extension(ext))
        .collect();
    if !missing.is_empty() {
        return Err(ContextCreationError::MissingExtensions { extensions: missing });
    }

    Ok(OPTIONAL_EXTENSIONS
        .iter()
        .copied()
        .filter(|ext| info.supports_extension(ext))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::typedefs::FastHashSet;

    fn info(version: (u32, u32), extensions: &[&str]) -> DriverInfo {
        DriverInfo {
            version,
            vendor: String::from("test"),
            renderer: String::from("test"),
            extensions: extensions.iter().map(|s| s.to_string()).collect::<FastHashSet<_>>(),
        }
    }

    #[test]
    fn version_ordering() {
        assert!(check_version(&info((4, 5), &[])).is_ok());
        assert!(check_version(&info((4, 6), &[])).is_ok());
        assert!(check_version(&info((5, 0), &[])).is_ok());
        assert!(matches!(
            check_version(&info((4, 3), &[])),
            Err(ContextCreationError::UnsupportedVersion { found: (4, 3), .. })
        ));
        assert!(check_version(&info((3, 9), &[])).is_err());
    }

    #[test]
    fn extensions() {
        let optional = check_extensions(&info((4, 5), &["GL_ARB_bindless_texture", "GL_KHR_debug"])).unwrap();
        assert_eq!(optional, vec!["GL_KHR_debug"]);

        match check_extensions(&info((4, 5), &["GL_KHR_debug"])) {
            Err(ContextCreationError::MissingExtensions { extensions }) => {
                assert_eq!(extensions, vec!["GL_ARB_bindless_texture"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
