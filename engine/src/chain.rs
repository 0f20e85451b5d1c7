//! In-memory view of the commit chain.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct Link {
    prev: Option<String>,
    next: Option<String>,
}

/// Doubly linked list of commit ids, oldest first.
///
/// Mirrors the `Next` edges in the store so that history walks never query
/// the store for topology. There is exactly one tip by construction.
#[derive(Debug, Clone, Default)]
pub struct CommitChain {
    links: HashMap<String, Link>,
    first: Option<String>,
    tip: Option<String>,
}

impl CommitChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent commit.
    pub fn tip(&self) -> Option<&str> {
        self.tip.as_deref()
    }

    /// The oldest commit.
    pub fn first(&self) -> Option<&str> {
        self.first.as_deref()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.links.contains_key(id)
    }

    /// The commit before `id`.
    pub fn prev(&self, id: &str) -> Option<&str> {
        self.links.get(id).and_then(|link| link.prev.as_deref())
    }

    /// The commit after `id`.
    pub fn next(&self, id: &str) -> Option<&str> {
        self.links.get(id).and_then(|link| link.next.as_deref())
    }

    /// Append `id` as the new tip. Returns false if it is already chained.
    pub fn push(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.links.contains_key(&id) {
            return false;
        }

        let prev = self.tip.take();
        if let Some(prev_id) = &prev {
            if let Some(link) = self.links.get_mut(prev_id) {
                link.next = Some(id.clone());
            }
        } else {
            self.first = Some(id.clone());
        }
        self.links.insert(id.clone(), Link { prev, next: None });
        self.tip = Some(id);
        true
    }

    /// Detach and return the tip.
    pub fn pop(&mut self) -> Option<String> {
        let tip = self.tip.take()?;
        let link = self.links.remove(&tip).unwrap_or_default();
        match &link.prev {
            Some(prev_id) => {
                if let Some(prev) = self.links.get_mut(prev_id) {
                    prev.next = None;
                }
            }
            None => self.first = None,
        }
        self.tip = link.prev;
        Some(tip)
    }

    /// Ids oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::successors(self.first(), move |id| self.next(id))
    }

    /// Ids newest first.
    pub fn iter_rev(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::successors(self.tip(), move |id| self.prev(id))
    }

    /// Ids strictly after `id`, oldest first.
    pub fn after<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        let start = self.next(id);
        std::iter::successors(start, move |id| self.next(id))
    }
}
