use crate::foundation::error::{StackError, StackResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fonts tried, in order, when the configuration names none.
const FALLBACK_FONTS: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Raw font file contents, shared between the evaluator and every render worker.
///
/// Equality is identity: two handles are equal when they share the same load.
#[derive(Clone)]
pub struct FontBytes(Arc<Vec<u8>>);

impl FontBytes {
    pub fn load(path: impl AsRef<Path>) -> StackResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| StackError::validation(format!("read font '{}': {e}", path.display())))?;
        Ok(Self::from_vec(bytes))
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self(Arc::new(bytes))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// First readable font from [`FALLBACK_FONTS`].
    pub fn fallback() -> Option<(PathBuf, Self)> {
        FALLBACK_FONTS.iter().map(PathBuf::from).find_map(|path| {
            let font = Self::load(&path).ok()?;
            Some((path, font))
        })
    }
}

impl PartialEq for FontBytes {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for FontBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FontBytes({} bytes)", self.0.len())
    }
}
