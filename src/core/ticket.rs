//! Admission tickets and the four priority lanes.

use std::collections::VecDeque;
use std::time::Instant;

use crate::util::serde::{Priority, TicketId};

/// A unit of admitted work waiting in a lane or undergoing execution.
#[derive(Debug)]
pub struct Ticket<P> {
    /// Unique ticket identifier returned to the caller at admission.
    pub id: TicketId,
    /// Caller-supplied payload to resolve.
    pub payload: P,
    /// Priority class the ticket was admitted under.
    pub priority: Priority,
    /// When the ticket entered its lane.
    pub enqueued_at: Instant,
    /// When the dispatcher pulled the ticket; `None` while queued.
    pub dispatched_at: Option<Instant>,
}

impl<P> Ticket<P> {
    /// Create a ticket at admission time.
    pub fn new(id: TicketId, payload: P, priority: Priority) -> Self {
        Self {
            id,
            payload,
            priority,
            enqueued_at: Instant::now(),
            dispatched_at: None,
        }
    }
}

/// Four ordered FIFO lanes, one per priority class.
///
/// Insertion order is preserved within a lane; across lanes only strict
/// precedence applies (critical > high > normal > low). A sustained stream
/// of critical tickets can starve lower lanes indefinitely.
#[derive(Debug)]
pub struct LaneSet<P> {
    lanes: [VecDeque<Ticket<P>>; 4],
}

impl<P> Default for LaneSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> LaneSet<P> {
    /// Create an empty lane set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lanes: [
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
            ],
        }
    }

    /// Append a ticket to the tail of its priority lane.
    pub fn push(&mut self, ticket: Ticket<P>) {
        self.lanes[ticket.priority.lane_index()].push_back(ticket);
    }

    /// Pop the head of the first non-empty lane in dispatch order, stamping
    /// its dispatch time.
    pub fn pop_next(&mut self) -> Option<Ticket<P>> {
        for lane in &mut self.lanes {
            if let Some(mut ticket) = lane.pop_front() {
                ticket.dispatched_at = Some(Instant::now());
                return Some(ticket);
            }
        }
        None
    }

    /// Total queued tickets across all lanes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.iter().map(VecDeque::len).sum()
    }

    /// True when every lane is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(VecDeque::is_empty)
    }

    /// Queue depth per lane in dispatch order (critical first).
    #[must_use]
    pub fn sizes(&self) -> [usize; 4] {
        [
            self.lanes[0].len(),
            self.lanes[1].len(),
            self.lanes[2].len(),
            self.lanes[3].len(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::serde::new_ticket_id;

    fn ticket(priority: Priority, tag: &str) -> Ticket<String> {
        Ticket::new(new_ticket_id(), tag.to_string(), priority)
    }

    #[test]
    fn test_fifo_within_lane() {
        let mut lanes = LaneSet::new();
        lanes.push(ticket(Priority::Normal, "a"));
        lanes.push(ticket(Priority::Normal, "b"));
        lanes.push(ticket(Priority::Normal, "c"));

        assert_eq!(lanes.pop_next().unwrap().payload, "a");
        assert_eq!(lanes.pop_next().unwrap().payload, "b");
        assert_eq!(lanes.pop_next().unwrap().payload, "c");
        assert!(lanes.pop_next().is_none());
    }

    #[test]
    fn test_strict_precedence_across_lanes() {
        let mut lanes = LaneSet::new();
        lanes.push(ticket(Priority::Low, "low"));
        lanes.push(ticket(Priority::Normal, "normal"));
        lanes.push(ticket(Priority::Critical, "critical"));
        lanes.push(ticket(Priority::High, "high"));

        assert_eq!(lanes.pop_next().unwrap().payload, "critical");
        assert_eq!(lanes.pop_next().unwrap().payload, "high");
        assert_eq!(lanes.pop_next().unwrap().payload, "normal");
        assert_eq!(lanes.pop_next().unwrap().payload, "low");
    }

    #[test]
    fn test_dispatch_stamps_ticket() {
        let mut lanes = LaneSet::new();
        lanes.push(ticket(Priority::High, "x"));
        let popped = lanes.pop_next().unwrap();
        assert!(popped.dispatched_at.is_some());
        assert!(popped.dispatched_at.unwrap() >= popped.enqueued_at);
    }

    #[test]
    fn test_sizes_and_len() {
        let mut lanes = LaneSet::new();
        assert!(lanes.is_empty());
        lanes.push(ticket(Priority::Critical, "a"));
        lanes.push(ticket(Priority::Critical, "b"));
        lanes.push(ticket(Priority::Low, "c"));
        assert_eq!(lanes.sizes(), [2, 0, 0, 1]);
        assert_eq!(lanes.len(), 3);
    }
}
