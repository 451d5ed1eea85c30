//! Cancellable one-shot deferred triggers.
//!
//! Tasks live outside the frame loop: the host (or the orchestrator at the top
//! of each frame) polls with the current session time and receives due tasks
//! earliest first. A cancelled task never fires.

use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Clone, Copy, Debug)]
struct Pending<T> {
    id: TaskId,
    due_sec: f64,
    payload: T,
}

/// A task that came due during a poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DueTask<T> {
    pub id: TaskId,
    pub due_sec: f64,
    pub payload: T,
}

pub struct Scheduler<T> {
    next_id: u64,
    pending: SmallVec<[Pending<T>; 2]>,
}

impl<T: Copy> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: SmallVec::new(),
        }
    }

    pub fn schedule(&mut self, due_sec: f64, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_sec,
            payload,
        });
        id
    }

    /// Returns `false` if the task already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Drop every pending task, returning how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the earliest task due at or before `now_sec`. Ties go
    /// to the task scheduled first.
    pub fn pop_due(&mut self, now_sec: f64) -> Option<DueTask<T>> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_sec <= now_sec)
            .min_by(|(_, a), (_, b)| a.due_sec.total_cmp(&b.due_sec))
            .map(|(i, _)| i)?;
        let p = self.pending.remove(idx);
        Some(DueTask {
            id: p.id,
            due_sec: p.due_sec,
            payload: p.payload,
        })
    }
}
