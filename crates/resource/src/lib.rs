//! Asset providers for the vitae rendering service.
//!
//! - [`FilesystemResourceProvider`]: serves files from a directory on disk
//!   (in practice the template directory, where fonts live next to the
//!   stylesheets that reference them).

mod filesystem;

pub use filesystem::FilesystemResourceProvider;
