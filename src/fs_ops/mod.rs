//! Filesystem operations: modularized.

mod atomic;
pub mod connection;
mod helpers;
pub mod io_copy;
mod meta;
pub mod space;
pub mod streams;
mod tree;

pub use atomic::Source;
pub use connection::{AccessMode, Connection};
pub use helpers::{describe_os_error, io_error_with_help_io};
pub use io_copy::{DEFAULT_CHUNK_SIZE, copy};
pub use meta::{PROBE_FILE_NAME, SIZE_UNKNOWN};
pub use space::{FixedSpace, Fs2Probe, SpaceProbe};
pub use streams::{InputStream, OutputStream};
