//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Host-assigned identity of a page element. The core never owns the element;
/// the id is only a key the host can resolve back to its node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ScrubberId(pub u32);

/// Monotonic allocator for the ids the core hands out itself.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_trigger: u32,
    next_subscription: u32,
    next_timeline: u32,
    next_scrubber: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_trigger(&mut self) -> TriggerId {
        let id = TriggerId(self.next_trigger);
        self.next_trigger = self.next_trigger.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_subscription(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_timeline(&mut self) -> TimelineId {
        let id = TimelineId(self.next_timeline);
        self.next_timeline = self.next_timeline.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_scrubber(&mut self) -> ScrubberId {
        let id = ScrubberId(self.next_scrubber);
        self.next_scrubber = self.next_scrubber.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_trigger(), TriggerId(0));
        assert_eq!(alloc.alloc_trigger(), TriggerId(1));
        assert_eq!(alloc.alloc_subscription(), SubscriptionId(0));
        assert_eq!(alloc.alloc_timeline(), TimelineId(0));
        assert_eq!(alloc.alloc_timeline(), TimelineId(1));
        assert_eq!(alloc.alloc_scrubber(), ScrubberId(0));
    }
}
