//! Undo/redo history: whole-document snapshots.
//!
//! The session pushes a snapshot of the lines *before* every mutation. The
//! undo stack therefore always ends with the state an undo should restore,
//! and its bottom entry is the baseline recorded when the document was
//! loaded. That baseline is never popped: undo is a no-op at depth one.
//!
//! ```text
//! load        undo = [S0]
//! edit → S1   undo = [S0, S0]        (push S0, then mutate)
//! undo        undo = [S0]  redo = [S1]   live = S0
//! redo        undo = [S0, S1]  redo = []  live = S1
//! ```
//!
//! Both stacks are capped; pushing past the cap evicts the oldest entry.
//! Snapshots are `Rc<[String]>` so moving one between stacks never copies
//! the lines.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::HISTORY_CAP;

pub type Snapshot = Rc<[String]>;

#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
    cap: usize,
}

impl History {
    /// History with `baseline` as its single undo entry.
    #[must_use]
    pub fn new(baseline: &[String], cap: usize) -> Self {
        let mut history = Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            cap: cap.max(1),
        };
        history.reset(baseline);
        history
    }

    /// Record the state about to be changed. Clears redo.
    pub fn push(&mut self, lines: &[String]) {
        push_capped(&mut self.undo, lines.into(), self.cap);
        self.redo.clear();
    }

    /// Drop both stacks and start over from `baseline`.
    pub fn reset(&mut self, baseline: &[String]) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push_back(baseline.into());
    }

    /// Step back. `current` goes onto the redo stack and the new top of the
    /// undo stack is returned for the caller to adopt.
    pub fn undo(&mut self, current: &[String]) -> Option<Snapshot> {
        if self.undo.len() <= 1 {
            return None;
        }
        push_capped(&mut self.redo, current.into(), self.cap);
        self.undo.pop_back();
        self.undo.back().cloned()
    }

    /// Step forward to the most recently undone state.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let next = self.redo.pop_back()?;
        push_capped(&mut self.undo, Rc::clone(&next), self.cap);
        Some(next)
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[inline]
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(&[String::new()], HISTORY_CAP)
    }
}

fn push_capped(stack: &mut VecDeque<Snapshot>, snap: Snapshot, cap: usize) {
    stack.push_back(snap);
    while stack.len() > cap {
        stack.pop_front();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    // -- Basics -------------------------------------------------------------

    #[test]
    fn baseline_cannot_be_undone() {
        let mut h = History::new(&lines(&["a"]), 100);
        assert!(!h.can_undo());
        assert!(h.undo(&lines(&["a"])).is_none());
        assert_eq!(h.undo_len(), 1);
    }

    #[test]
    fn undo_then_redo() {
        let s0 = lines(&["a"]);
        let s1 = lines(&["ab"]);
        let mut h = History::new(&s0, 100);
        h.push(&s0);

        let back = h.undo(&s1).unwrap();
        assert_eq!(&*back, s0.as_slice());
        assert!(h.can_redo());

        let fwd = h.redo().unwrap();
        assert_eq!(&*fwd, s1.as_slice());
        assert!(!h.can_redo());
        assert!(h.redo().is_none());
    }

    #[test]
    fn push_clears_redo() {
        let s0 = lines(&["x"]);
        let mut h = History::new(&s0, 100);
        h.push(&s0);
        h.undo(&lines(&["y"]));
        assert!(h.can_redo());
        h.push(&s0);
        assert!(!h.can_redo());
    }

    #[test]
    fn reset_discards_everything() {
        let mut h = History::new(&lines(&["a"]), 100);
        h.push(&lines(&["a"]));
        h.push(&lines(&["b"]));
        h.reset(&lines(&["chunk"]));
        assert_eq!(h.undo_len(), 1);
        assert_eq!(h.redo_len(), 0);
    }

    #[test]
    fn stacks_evict_oldest_at_cap() {
        let mut h = History::new(&lines(&["0"]), 3);
        for i in 1..=5 {
            h.push(&lines(&[&i.to_string()]));
        }
        assert_eq!(h.undo_len(), 3);
        // Oldest surviving entry is "3"; undo walks down to it and stops.
        let mut live = lines(&["6"]);
        while let Some(prev) = h.undo(&live) {
            live = prev.to_vec();
        }
        assert_eq!(live, lines(&["3"]));
        assert_eq!(h.redo_len(), 2);
    }

    // -- Properties ---------------------------------------------------------

    proptest! {
        #[test]
        fn undo_stack_never_exceeds_cap(pushes in 0usize..300) {
            let mut h = History::new(&lines(&[""]), 100);
            for i in 0..pushes {
                h.push(&lines(&[&i.to_string()]));
                prop_assert!(h.undo_len() <= 100);
            }
        }

        #[test]
        fn undo_n_then_redo_n_round_trips(edits in proptest::collection::vec("[a-z]{0,4}", 1..40)) {
            let mut live = lines(&[""]);
            let mut h = History::new(&live, 100);
            let mut states = vec![live.clone()];
            for e in &edits {
                h.push(&live);
                live = vec![format!("{}{e}", live[0])];
                states.push(live.clone());
            }
            let n = edits.len();
            for _ in 0..n {
                live = h.undo(&live).unwrap().to_vec();
            }
            prop_assert_eq!(&live, &states[0]);
            for _ in 0..n {
                live = h.redo().unwrap().to_vec();
            }
            prop_assert_eq!(&live, &states[n]);
        }
    }
}
