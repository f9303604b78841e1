//! Ordered collections of shared entity handles.

use std::ops::Deref;
use std::sync::Arc;

/// The result of a resolve call: entities in server-provided order.
///
/// Items are shared handles to canonical instances owned by the
/// accessor's cache, so two collections that surface the same identity
/// point at the same object. The order is exactly the order of the raw
/// envelope array; the accessor never re-sorts.
#[derive(Debug)]
pub struct Collection<E> {
  items: Vec<Arc<E>>,
}

impl<E> Collection<E> {
  pub(crate) fn new(items: Vec<Arc<E>>) -> Self {
    Self { items }
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&Arc<E>> {
    self.items.get(index)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Arc<E>> {
    self.items.iter()
  }
}

impl<E> Deref for Collection<E> {
  type Target = [Arc<E>];

  fn deref(&self) -> &Self::Target {
    &self.items
  }
}

impl<E> Clone for Collection<E> {
  fn clone(&self) -> Self {
    Self {
      items: self.items.clone(),
    }
  }
}

impl<E> IntoIterator for Collection<E> {
  type Item = Arc<E>;
  type IntoIter = std::vec::IntoIter<Arc<E>>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.into_iter()
  }
}

impl<'a, E> IntoIterator for &'a Collection<E> {
  type Item = &'a Arc<E>;
  type IntoIter = std::slice::Iter<'a, Arc<E>>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}
