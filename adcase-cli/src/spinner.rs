//! Spinner pool for concurrent progress display.
//!
//! One spinner slot per worker, claimed when a record starts and released
//! when it finishes, plus a summary line showing overall progress.

use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);

/// A pool of reusable spinner slots keyed by dataset index.
pub struct SpinnerPool {
    mp: MultiProgress,
    total: ProgressBar,
    spinners: Vec<ProgressBar>,
    slot_assignments: HashMap<usize, usize>,
    free_slots: Vec<usize>,
}

impl SpinnerPool {
    /// Create a pool with `n` slots under a progress bar of length `len`.
    /// When `quiet` is true nothing is drawn.
    pub fn new(n: usize, len: usize, quiet: bool) -> Self {
        let mp = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };

        let total = mp.add(ProgressBar::new(len as u64));
        total.set_style(
            ProgressStyle::with_template("  [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("static pattern")
                .progress_chars("=> "),
        );

        let spinner_style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|");

        let spinners: Vec<ProgressBar> = (0..n)
            .map(|_| {
                let pb = mp.add(ProgressBar::new_spinner());
                pb.set_style(spinner_style.clone());
                pb
            })
            .collect();

        let free_slots = (0..n).rev().collect();

        Self {
            mp,
            total,
            spinners,
            slot_assignments: HashMap::new(),
            free_slots,
        }
    }

    /// Claim a spinner slot for the given key and set its message.
    pub fn claim(&mut self, key: usize, msg: String) {
        if let Some(slot) = self.free_slots.pop() {
            self.spinners[slot].reset();
            self.spinners[slot].enable_steady_tick(TICK);
            self.spinners[slot].set_message(msg);
            self.slot_assignments.insert(key, slot);
        }
    }

    /// Release a spinner slot and advance the progress bar.
    pub fn release(&mut self, key: usize) {
        if let Some(slot) = self.slot_assignments.remove(&key) {
            self.spinners[slot].disable_steady_tick();
            self.spinners[slot].set_message("");
            self.spinners[slot].finish_and_clear();
            self.free_slots.push(slot);
        }
        self.total.inc(1);
    }

    /// Set the message next to the progress bar.
    pub fn set_status(&self, msg: String) {
        self.total.set_message(msg);
    }

    /// Print a line above the spinners without tearing them.
    pub fn println(&self, line: &str) {
        let _ = self.mp.println(line);
    }

    /// Clear all spinners and the progress bar.
    pub fn clear_all(&mut self) {
        for spinner in &self.spinners {
            spinner.disable_steady_tick();
            spinner.set_message("");
            spinner.finish_and_clear();
        }
        self.total.finish_and_clear();
        self.slot_assignments.clear();
        self.free_slots = (0..self.spinners.len()).rev().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_reused() {
        let mut pool = SpinnerPool::new(2, 5, true);
        pool.claim(10, "a".into());
        pool.claim(11, "b".into());
        // No free slot: ignored, release still counts progress
        pool.claim(12, "c".into());
        assert_eq!(pool.free_slots.len(), 0);
        pool.release(12);
        pool.release(10);
        assert_eq!(pool.free_slots.len(), 1);
        pool.claim(13, "d".into());
        assert_eq!(pool.slot_assignments.len(), 2);
        assert_eq!(pool.total.position(), 2);
        pool.clear_all();
        assert_eq!(pool.free_slots.len(), 2);
    }
}
