/// Shell Configuration
///
/// The data model of the live configuration pipeline: the configuration the
/// window currently shows, the fragments parsed out of changed files, and the
/// merge policy between them.

pub mod document;
pub mod fragment;
pub mod live;
pub mod merge;

pub use document::parse_document;
pub use fragment::ConfigFragment;
pub use live::{LiveConfig, WindowMode, DEFAULT_HEIGHT, DEFAULT_WIDTH, UNNAMED_PLACEHOLDER};
pub use merge::{merge_fragment, MergeReport};
