//! Single-use countdown barrier for one frame.

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
pub struct FrameLatch {
    remaining: Mutex<usize>,
    done: Condvar,
}

impl FrameLatch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            done: Condvar::new(),
        }
    }

    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        if *remaining > 0 {
            *remaining -= 1;
            if *remaining == 0 {
                self.done.notify_all();
            }
        }
    }

    /// Block until the count reaches zero.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.done.wait(&mut remaining);
        }
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.lock()
    }
}

/// Counts the latch down when dropped, so a pass that panics still releases
/// the waiting UI thread.
pub(crate) struct CountDownOnDrop<'a>(pub(crate) &'a FrameLatch);

impl Drop for CountDownOnDrop<'_> {
    fn drop(&mut self) {
        self.0.count_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_returns_after_all_parties() {
        let latch = Arc::new(FrameLatch::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let latch = latch.clone();
                thread::spawn(move || latch.count_down())
            })
            .collect();
        latch.wait();
        assert_eq!(latch.remaining(), 0);
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_extra_count_down_is_ignored() {
        let latch = FrameLatch::new(1);
        latch.count_down();
        latch.count_down();
        assert_eq!(latch.remaining(), 0);
        latch.wait();
    }

    #[test]
    fn test_guard_counts_down() {
        let latch = FrameLatch::new(1);
        {
            let _guard = CountDownOnDrop(&latch);
        }
        assert_eq!(latch.remaining(), 0);
    }
}
