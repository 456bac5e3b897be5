//! Id-keyed entity arenas
//!
//! Every entity kind lives in an `EntityIndex`, ordered by id. Entities are
//! held behind `Arc` so a snapshot can share them with the live index: a
//! mutation through `get_mut` copies the entity first (`Arc::make_mut`),
//! which leaves any outstanding snapshot on the pre-mutation value.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::error::IndexError;

const DEFAULT_PARALLEL_THRESHOLD: usize = 1000;

/// An entity stored in an `EntityIndex`
pub trait Identified {
    type Id: Copy + Ord + fmt::Debug + From<u32> + Into<u32> + Send + Sync;

    fn id(&self) -> Self::Id;
}

pub struct EntityIndex<T: Identified> {
    content: BTreeMap<T::Id, Arc<T>>,
    read_only: bool,
    parallel_threshold: usize,
}

impl<T: Identified> EntityIndex<T> {
    pub fn new() -> Self {
        Self {
            content: BTreeMap::new(),
            read_only: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Insert an entity, replacing any entity with the same id
    pub fn insert(&mut self, entity: T) -> Result<(), IndexError> {
        self.insert_shared(Arc::new(entity))
    }

    pub fn insert_shared(&mut self, entity: Arc<T>) -> Result<(), IndexError> {
        if self.read_only {
            return Err(IndexError::ReadOnly);
        }
        self.content.insert(entity.id(), entity);
        Ok(())
    }

    pub fn remove(&mut self, id: T::Id) -> Result<Option<Arc<T>>, IndexError> {
        if self.read_only {
            return Err(IndexError::ReadOnly);
        }
        Ok(self.content.remove(&id))
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.content.get(&id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.content.contains_key(&id)
    }

    /// Entity with the lowest id
    pub fn first(&self) -> Option<&T> {
        self.content.values().next().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Entities in id order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.content.values().map(Arc::as_ref)
    }

    pub fn ids(&self) -> Vec<T::Id> {
        self.content.keys().copied().collect()
    }

    /// Max existing id + 1, or 1 when empty
    pub fn free_id(&self) -> T::Id {
        let next = self
            .content
            .keys()
            .next_back()
            .map(|&id| id.into() + 1)
            .unwrap_or(1);
        T::Id::from(next)
    }

    /// Read-only view sharing the same entities
    pub fn snapshot(&self) -> Self {
        Self {
            content: self.content.clone(),
            read_only: true,
            parallel_threshold: self.parallel_threshold,
        }
    }
}

impl<T: Identified + Clone> EntityIndex<T> {
    /// Mutable access; None if absent or if this index is read-only
    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        if self.read_only {
            return None;
        }
        self.content.get_mut(&id).map(Arc::make_mut)
    }
}

impl<T: Identified + Send + Sync> EntityIndex<T> {
    /// New detached index holding the entities matching `predicate`
    ///
    /// Large indices are filtered in parallel. The result is keyed by id, so
    /// membership and order match a sequential pass.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Sync + Send,
    {
        let content: BTreeMap<T::Id, Arc<T>> = if self.content.len() >= self.parallel_threshold {
            self.content
                .par_iter()
                .filter(|(_, e)| predicate(e))
                .map(|(&id, e)| (id, Arc::clone(e)))
                .collect()
        } else {
            self.content
                .iter()
                .filter(|(_, e)| predicate(e))
                .map(|(&id, e)| (id, Arc::clone(e)))
                .collect()
        };

        Self {
            content,
            read_only: false,
            parallel_threshold: self.parallel_threshold,
        }
    }

    /// Entities ordered by `compare`; equal entities stay in id order
    pub fn sorted_by<F>(&self, compare: F) -> Vec<Arc<T>>
    where
        F: Fn(&T, &T) -> Ordering + Sync,
    {
        let mut entities: Vec<Arc<T>> = self.content.values().cloned().collect();
        if entities.len() >= self.parallel_threshold {
            entities.par_sort_by(|a, b| compare(a, b));
        } else {
            entities.sort_by(|a, b| compare(a, b));
        }
        entities
    }

    /// Greatest entity by `compare`; ties resolve to the lowest id
    pub fn max_by<F>(&self, compare: F) -> Option<&T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        self.iter().fold(None, |best, e| match best {
            Some(b) if compare(e, b) != Ordering::Greater => Some(b),
            _ => Some(e),
        })
    }
}

impl<T: Identified> Default for EntityIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identified> Clone for EntityIndex<T> {
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            read_only: self.read_only,
            parallel_threshold: self.parallel_threshold,
        }
    }
}

impl<T: Identified + fmt::Debug> fmt::Debug for EntityIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityIndex")
            .field("content", &self.content)
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl<T: Identified> FromIterator<T> for EntityIndex<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let content = iter.into_iter().map(|e| (e.id(), Arc::new(e))).collect();
        Self {
            content,
            read_only: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Space-separated id list, the encoding used by save rows
pub fn to_id_list<I: Copy + Into<u32>>(ids: &[I]) -> String {
    ids.iter()
        .map(|&id| id.into().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn ids_from_list<I: From<u32>>(s: &str) -> Result<Vec<I>, std::num::ParseIntError> {
    s.split_whitespace()
        .map(|part| part.parse::<u32>().map(I::from))
        .collect()
}
