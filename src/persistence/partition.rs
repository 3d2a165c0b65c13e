//! One entity class of the filesystem engine
//!
//! A `Partition<E>` owns the per-type documents of one class together with
//! its id → type index and its sorted type list. It performs no locking;
//! callers serialize mutations.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::layout::{self, id2type_file, read_document, type_file, types_file, write_document};
use crate::graph::{GraphError, GraphId, GraphResource, GraphResult};

/// Files of one entity class under the engine root
#[derive(Debug)]
pub struct Partition<E> {
    root: PathBuf,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Partition<E>
where
    E: GraphResource + Serialize + DeserializeOwned,
{
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            _entity: PhantomData,
        }
    }

    /// Every type with a document, sorted
    pub async fn types(&self) -> GraphResult<Vec<String>> {
        read_document(&types_file(&self.root, E::CLASS)).await
    }

    pub async fn id2type(&self) -> GraphResult<IndexMap<String, String>> {
        read_document(&id2type_file(&self.root, E::CLASS)).await
    }

    /// Type recorded for `id` in the index
    pub async fn type_of(&self, id: &str) -> GraphResult<Option<String>> {
        Ok(self.id2type().await?.shift_remove(id))
    }

    /// All entities of one type, in document order
    pub async fn load(&self, entity_type: &str) -> GraphResult<Vec<E>> {
        layout::validate_type(entity_type)?;
        read_document(&type_file(&self.root, entity_type, E::CLASS)).await
    }

    async fn store(&self, entity_type: &str, entities: &[E]) -> GraphResult<()> {
        write_document(&type_file(&self.root, entity_type, E::CLASS), &entities).await
    }

    /// Point lookup through the index
    pub async fn get(&self, id: &GraphId) -> GraphResult<Option<E>> {
        let key = id.expect_str()?;
        let Some(entity_type) = self.type_of(key).await? else {
            return Ok(None);
        };
        let found = self
            .load(&entity_type)
            .await?
            .into_iter()
            .find(|e| e.id() == id);
        if found.is_none() {
            warn!(
                "{} {} is indexed under type {:?} but missing from its document",
                E::CLASS,
                id,
                entity_type
            );
        }
        Ok(found)
    }

    /// Like [`get`](Self::get), failing with `NotFound`; also returns the stored type
    pub async fn locate(&self, id: &GraphId) -> GraphResult<(String, E)> {
        let key = id.expect_str()?;
        let entity_type = self
            .type_of(key)
            .await?
            .ok_or_else(|| GraphError::not_found(E::CLASS, id))?;
        let found = self
            .load(&entity_type)
            .await?
            .into_iter()
            .find(|e| e.id() == id);
        match found {
            Some(entity) => Ok((entity_type, entity)),
            None => {
                warn!(
                    "{} {} is indexed under type {:?} but missing from its document",
                    E::CLASS,
                    id,
                    entity_type
                );
                Err(GraphError::not_found(E::CLASS, id))
            }
        }
    }

    /// Append a new entity to its type document and index it
    pub async fn insert(&self, entity: E) -> GraphResult<()> {
        let entity_type = entity.resource_type().to_string();
        layout::validate_type(&entity_type)?;
        let key = entity.id().expect_str()?.to_string();

        let mut entities = self.load(&entity_type).await?;
        entities.push(entity);
        self.store(&entity_type, &entities).await?;
        self.index(key, &entity_type).await
    }

    /// Write back an edited entity previously stored under `old_type`,
    /// moving it between documents when its type changed
    pub async fn put(&self, old_type: &str, entity: E) -> GraphResult<()> {
        let new_type = entity.resource_type().to_string();
        layout::validate_type(&new_type)?;

        if new_type == old_type {
            let mut entities = self.load(old_type).await?;
            match entities.iter_mut().find(|e| e.id() == entity.id()) {
                Some(slot) => *slot = entity,
                None => entities.push(entity),
            }
            return self.store(old_type, &entities).await;
        }

        let mut old_entities = self.load(old_type).await?;
        old_entities.retain(|e| e.id() != entity.id());
        self.store(old_type, &old_entities).await?;
        self.insert(entity).await
    }

    /// Delete an entity from its document and the index
    pub async fn remove(&self, id: &GraphId) -> GraphResult<E> {
        let key = id.expect_str()?;
        let mut index = self.id2type().await?;
        let entity_type = index
            .shift_remove(key)
            .ok_or_else(|| GraphError::not_found(E::CLASS, id))?;

        let mut entities = self.load(&entity_type).await?;
        let position = entities.iter().position(|e| e.id() == id);
        let removed = position.map(|i| entities.remove(i));
        if removed.is_some() {
            self.store(&entity_type, &entities).await?;
        }
        write_document(&id2type_file(&self.root, E::CLASS), &index).await?;

        removed.ok_or_else(|| {
            warn!(
                "{} {} was indexed under type {:?} but missing from its document",
                E::CLASS,
                id,
                entity_type
            );
            GraphError::not_found(E::CLASS, id)
        })
    }

    async fn index(&self, key: String, entity_type: &str) -> GraphResult<()> {
        let mut index = self.id2type().await?;
        index.insert(key, entity_type.to_string());
        write_document(&id2type_file(&self.root, E::CLASS), &index).await?;

        let mut types = self.types().await?;
        if let Err(position) = types.binary_search_by(|t| t.as_str().cmp(entity_type)) {
            types.insert(position, entity_type.to_string());
            write_document(&types_file(&self.root, E::CLASS), &types).await?;
        }
        Ok(())
    }
}
