//! Path types used during extraction.
//!
//! Entry paths can only reach the filesystem as a [`SafePath`], which is
//! validated against the [`StagingArea`] it will be written into. A
//! [`TargetDir`] is the final home of an archive's content and doubles as
//! the "already extracted" marker.

pub mod safe_path;
pub mod staging;
pub mod target_dir;

pub use safe_path::SafePath;
pub use staging::StagingArea;
pub use target_dir::TargetDir;
