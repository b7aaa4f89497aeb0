#![forbid(unsafe_code)]

//! Pending content queue.
//!
//! Orders waiting content by descending priority, then by request sequence
//! number, so equal priorities are served first-come-first-served. A unit
//! pushed back after being preempted keeps its original sequence number and
//! therefore its place among equals.
//!
//! # Performance
//!
//! | Operation  | Complexity |
//! |------------|------------|
//! | `push`     | O(n)       |
//! | `pop`      | O(n)       |
//! | `remove`   | O(n)       |
//! | `peek`     | O(1)       |
//!
//! Queues hold a handful of units at most.

use std::fmt;

use crate::content::{ContentId, ContentRef};

/// A unit waiting for the sheet.
#[derive(Clone)]
pub struct QueuedContent {
    pub content: ContentRef,
    /// Request sequence number; lower was requested earlier.
    pub seq: u64,
    priority: i32,
}

impl QueuedContent {
    #[inline]
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ContentId {
        self.content.id()
    }

    fn runs_before(&self, other: &Self) -> bool {
        self.priority > other.priority || (self.priority == other.priority && self.seq < other.seq)
    }
}

impl fmt::Debug for QueuedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedContent")
            .field("id", &self.content.id())
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct ContentQueue {
    entries: Vec<QueuedContent>,
    next_seq: u64,
}

impl ContentQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the sequence number for a new request.
    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Insert a unit with a previously allocated sequence number.
    pub fn push(&mut self, content: ContentRef, seq: u64) {
        let entry = QueuedContent {
            priority: content.priority(),
            content,
            seq,
        };
        let at = self
            .entries
            .iter()
            .position(|e| entry.runs_before(e))
            .unwrap_or(self.entries.len());
        self.entries.insert(at, entry);
    }

    /// Next unit to show.
    #[must_use]
    pub fn peek(&self) -> Option<&QueuedContent> {
        self.entries.first()
    }

    pub fn pop(&mut self) -> Option<QueuedContent> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Remove a unit by id.
    pub fn remove(&mut self, id: ContentId) -> Option<QueuedContent> {
        let index = self.entries.iter().position(|e| e.content.id() == id)?;
        Some(self.entries.remove(index))
    }

    #[must_use]
    pub fn contains(&self, id: ContentId) -> bool {
        self.entries.iter().any(|e| e.content.id() == id)
    }

    /// Remove and return every queued unit, in order.
    pub fn drain(&mut self) -> Vec<ContentRef> {
        self.entries.drain(..).map(|e| e.content).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentRef> {
        self.entries.iter().map(|e| &e.content)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{SheetContent, SurfaceId};
    use std::rc::Rc;

    struct Unit {
        id: ContentId,
        priority: i32,
    }

    impl SheetContent for Unit {
        fn id(&self) -> ContentId {
            self.id
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn render_surface(&self) -> SurfaceId {
            SurfaceId(0)
        }
        fn destroy(&self) {}
    }

    fn unit(priority: i32) -> ContentRef {
        Rc::new(Unit {
            id: ContentId::new(),
            priority,
        })
    }

    fn push_new(queue: &mut ContentQueue, content: &ContentRef) {
        let seq = queue.next_seq();
        queue.push(Rc::clone(content), seq);
    }

    #[test]
    fn higher_priority_first() {
        let mut queue = ContentQueue::new();
        let low = unit(1);
        let high = unit(5);
        push_new(&mut queue, &low);
        push_new(&mut queue, &high);
        assert_eq!(queue.pop().map(|e| e.id()), Some(high.id()));
        assert_eq!(queue.pop().map(|e| e.id()), Some(low.id()));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn equal_priority_is_fifo() {
        let mut queue = ContentQueue::new();
        let units: Vec<_> = (0..4).map(|_| unit(2)).collect();
        for u in &units {
            push_new(&mut queue, u);
        }
        let order: Vec<_> = std::iter::from_fn(|| queue.pop().map(|e| e.id())).collect();
        let expected: Vec<_> = units.iter().map(|u| u.id()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn requeued_unit_keeps_its_place() {
        let mut queue = ContentQueue::new();
        let first = unit(2);
        let first_seq = queue.next_seq();
        let second = unit(2);
        push_new(&mut queue, &second);
        // `first` was displayed, then preempted and pushed back.
        queue.push(Rc::clone(&first), first_seq);
        assert_eq!(queue.peek().map(|e| e.id()), Some(first.id()));
    }

    #[test]
    fn remove_and_contains() {
        let mut queue = ContentQueue::new();
        let a = unit(0);
        let b = unit(0);
        push_new(&mut queue, &a);
        push_new(&mut queue, &b);
        assert!(queue.contains(a.id()));
        assert!(queue.remove(a.id()).is_some());
        assert!(!queue.contains(a.id()));
        assert!(queue.remove(a.id()).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }
}
