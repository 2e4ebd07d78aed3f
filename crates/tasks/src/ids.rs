//! Collision-free task id generation.

use std::sync::atomic::{AtomicU64, Ordering};

use croplens_core::types::TaskId;

/// Builds ids of the form `<owner>-<unix millis>-<sequence>`.
///
/// The sequence is a process-wide monotonic counter, so two submissions
/// from the same owner within one millisecond still differ.
#[derive(Debug, Default)]
pub struct TaskIdGenerator {
    sequence: AtomicU64,
}

impl TaskIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self, owner: &str) -> TaskId {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis();
        format!("{owner}-{millis}-{seq}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn ids_start_with_owner() {
        let ids = TaskIdGenerator::new();
        assert!(ids.next_id("alice").starts_with("alice-"));
    }

    #[test]
    fn same_owner_burst_is_unique() {
        let ids = TaskIdGenerator::new();
        let burst: HashSet<_> = (0..1000).map(|_| ids.next_id("bob")).collect();
        assert_eq!(burst.len(), 1000);
    }

    #[test]
    fn concurrent_generation_is_unique() {
        let ids = Arc::new(TaskIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || {
                    (0..250).map(|_| ids.next_id("carol")).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            all.extend(handle.join().unwrap());
        }
        assert_eq!(all.len(), 1000);
    }
}
