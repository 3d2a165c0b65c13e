//! On-disk layout of the filesystem engine
//!
//! ```text
//! {root}/{type}.node.json            {"data": [Node, ...]}
//! {root}/{type}.relationship.json    {"data": [Relationship, ...]}
//! {root}/{class}.id2type.json        {"data": {id: type, ...}}
//! {root}/{class}.types.json          {"data": [type, ...]}   sorted
//! {root}/raw/{id}.txt                raw text split off by RawTextExtension
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::graph::{EntityClass, GraphError, GraphResult};

/// Directory for raw text files under the root
pub const RAW_DIR: &str = "raw";

/// Every JSON file is a `{ "data": ... }` envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

/// Reject type names that cannot be used as a file name component
pub fn validate_type(entity_type: &str) -> GraphResult<()> {
    if entity_type.is_empty() || entity_type.contains(['/', '\\', '\0']) {
        return Err(GraphError::InvalidType(entity_type.to_string()));
    }
    Ok(())
}

pub fn type_file(root: &Path, entity_type: &str, class: EntityClass) -> PathBuf {
    root.join(format!("{}.{}.json", entity_type, class))
}

pub fn id2type_file(root: &Path, class: EntityClass) -> PathBuf {
    root.join(format!("{}.id2type.json", class))
}

pub fn types_file(root: &Path, class: EntityClass) -> PathBuf {
    root.join(format!("{}.types.json", class))
}

pub fn raw_file_name(id: &str) -> String {
    format!("{}.txt", id)
}

/// Read a document's payload; a missing file reads as `T::default()`
pub async fn read_document<T>(path: &Path) -> GraphResult<T>
where
    T: DeserializeOwned + Default,
{
    match fs::read(path).await {
        Ok(bytes) => {
            let document: Document<T> = serde_json::from_slice(&bytes)?;
            Ok(document.data)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write a document through a temporary file and rename it into place
pub async fn write_document<T: Serialize>(path: &Path, data: &T) -> GraphResult<()> {
    let bytes = serde_json::to_vec_pretty(&Document { data })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
