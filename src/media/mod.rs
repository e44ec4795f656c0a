//! Returned media and the bundled demo placeholder.

mod placeholder;
mod types;

pub use placeholder::{Placeholder, BUNDLED_PLACEHOLDER};
pub use types::{GeneratedMedia, GenerationMetadata, MediaFormat, MediaKind};
