//! The content tree and the pure operations on it.
//!
//! - [`value`]: the schema-less [`Value`] tree and the [`Edit`] write payload
//! - [`path`]: parsing of `a.b[2].c` addresses and non-mutating get/set
//! - [`merge`]: deep merge of persisted content over the defaults
//! - [`indirection`]: `imagePaths.*` references and asset URL normalization
//! - [`defaults`]: the bundled default tree
//!
//! Nothing in this module does I/O; the [`crate::store`] owns the live tree
//! and calls into these functions.

pub mod defaults;
pub mod indirection;
pub mod merge;
pub mod path;
pub mod value;

pub use defaults::{DEFAULT_CONTENT_VERSION, default_content};
pub use path::{PathBuf, PathError, Segment};
pub use value::{Edit, Map, Value};
