use crate::types::TransferTask;

/// Pending transfers, drained in LIFO order.
///
/// `push` never checks a capacity. The cap is enforced by the enumerator, which stops
/// fetching while the queue is at or above it, so a single fetch may overshoot by one page.
#[derive(Debug, Default)]
pub struct WorkQueue {
    tasks: Vec<TransferTask>,
    high_water_mark: usize,
    total_pushed: u64,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: TransferTask) {
        self.tasks.push(task);
        self.total_pushed += 1;
        self.high_water_mark = self.high_water_mark.max(self.tasks.len());
    }

    pub fn extend<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = TransferTask>,
    {
        for task in tasks {
            self.push(task);
        }
    }

    pub fn pop(&mut self) -> Option<TransferTask> {
        self.tasks.pop()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }
}
