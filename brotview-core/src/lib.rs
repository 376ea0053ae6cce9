pub mod aspect;
pub mod complex;
pub mod error;
pub mod serial;
pub mod transform;
pub mod view;
pub mod viewport;

// Re-export primary types for convenience.
pub use aspect::{compute_home_margins, fix_aspect_ratio, home_framing, Margins};
pub use complex::Complex;
pub use error::CoreError;
pub use serial::SerialAllocator;
pub use transform::{forward, inverse, resolve_destination, Destination, EntryMode};
pub use view::View;
pub use viewport::{NormPoint, PanZoom, PixelRect, ViewportState};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
