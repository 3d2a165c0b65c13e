//! Filesystem storage engine
//!
//! - `layout`: file names and the `{ "data": ... }` document envelope
//! - `partition`: per-class documents, id → type index and type list
//! - `extension`: per-type node hooks, including raw text side files
//! - `filesystem`: the `FsGraph` suite tying them together

pub mod extension;
pub mod filesystem;
pub mod layout;
pub mod partition;

pub use extension::{NodeExtension, RawTextExtension};
pub use filesystem::FsGraph;
pub use layout::Document;
pub use partition::Partition;
