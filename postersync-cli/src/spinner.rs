//! Spinner slots for in-flight targets, keyed by target title.

use std::collections::HashMap;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub(crate) struct SpinnerPool {
    #[allow(dead_code)]
    mp: MultiProgress,
    spinners: Vec<ProgressBar>,
    assignments: HashMap<String, usize>,
    free_slots: Vec<usize>,
}

impl SpinnerPool {
    /// A pool with `n` slots; all spinners hidden when `quiet` is true.
    pub(crate) fn new(n: usize, quiet: bool) -> Self {
        let mp = if quiet {
            MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };

        let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|");

        let spinners: Vec<ProgressBar> = (0..n)
            .map(|_| {
                let pb = mp.add(ProgressBar::new_spinner());
                pb.set_style(style.clone());
                pb
            })
            .collect();

        let free_slots = (0..n).rev().collect();

        Self {
            mp,
            spinners,
            assignments: HashMap::new(),
            free_slots,
        }
    }

    pub(crate) fn claim(&mut self, key: &str, msg: String) {
        if let Some(slot) = self.free_slots.pop() {
            self.spinners[slot].reset();
            self.spinners[slot].enable_steady_tick(std::time::Duration::from_millis(100));
            self.spinners[slot].set_message(msg);
            self.assignments.insert(key.to_owned(), slot);
        }
    }

    /// No-op if the key never claimed a slot.
    pub(crate) fn update(&self, key: &str, msg: String) {
        if let Some(&slot) = self.assignments.get(key) {
            self.spinners[slot].set_message(msg);
        }
    }

    pub(crate) fn release(&mut self, key: &str) {
        if let Some(slot) = self.assignments.remove(key) {
            self.spinners[slot].disable_steady_tick();
            self.spinners[slot].set_message("");
            self.spinners[slot].finish_and_clear();
            self.free_slots.push(slot);
        }
    }
}
