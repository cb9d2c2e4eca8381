//! fileq: Serialized Per-Path File Handles
//!
//! Every operation issued against a path runs strictly one at a time, in the
//! order it was requested, no matter how many call sites share the path.
//! Paths are deduplicated by canonical form, so `./data/a.txt`,
//! `data/b/../a.txt` and the absolute spelling all reach the same handle.
//!
//! ```no_run
//! # async fn demo() -> Result<(), fileq::FileError> {
//! let registry = fileq::Registry::current()?;
//! let file = registry.get_handle("./tmp/notes.txt")?;
//! file.create();
//! file.write("hello");
//! assert_eq!(file.read().await?, "hello");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod fs;
pub mod handle;
pub mod logging;
mod path;
pub mod queue;
pub mod registry;

pub use config::{ConfigLoader, FileqConfig, HandleConfig};
pub use encoding::{Contents, Encoding};
pub use error::{ConfigError, ErrorCode, FileError};
pub use fs::{FileSystem, TokioFileSystem};
pub use handle::FileHandle;
pub use queue::{Pending, QueueState, QueueStats};
pub use registry::{is_handle, Registry};
