//! Per-import progress state and the registry of active imports.
//!
//! Every running import owns a [`ProgressRecord`] registered with
//! [`GlobalProgress`] for its lifetime. A progress UI (or test harness)
//! watches the registry to compute an overall percentage and to detect
//! whether any import is still active. Records are removed when their import
//! ends, on success and on error alike.

use std::{cell::RefCell, rc::Rc};

/// Shared handle to one import's progress record.
pub type ProgressHandle = Rc<RefCell<ProgressRecord>>;

/// Progress state of a single import.
///
/// The percentage is monotonically non-decreasing and clamped to `[0, 100]`;
/// it reaches exactly 100 only at successful completion.
#[derive(Clone, Debug)]
pub struct ProgressRecord {
    file_name: String,
    percentage: f32,
    status: String,
    error: bool,
}

impl ProgressRecord {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            percentage: 0.0,
            status: String::new(),
            error: false,
        }
    }

    pub fn shared(file_name: &str) -> ProgressHandle {
        Rc::new(RefCell::new(Self::new(file_name)))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn percentage(&self) -> f32 {
        self.percentage
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Advance the percentage. Values below the current one or above 100 are
    /// clamped so progress never moves backwards and never overshoots.
    pub fn set_percentage(&mut self, percentage: f32) {
        self.percentage = self.percentage.max(percentage.min(100.0));
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Mark the import failed. The percentage freezes at whatever it reached.
    pub fn fail(&mut self, message: &str) {
        self.error = true;
        self.status = message.to_string();
    }
}

/// The set of all currently active progress records. No ordering guarantee.
#[derive(Default)]
pub struct GlobalProgress {
    records: Vec<ProgressHandle>,
}

impl GlobalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, record: ProgressHandle) {
        self.records.push(record);
    }

    pub fn unregister(&mut self, record: &ProgressHandle) {
        self.records.retain(|r| !Rc::ptr_eq(r, record));
    }

    pub fn records(&self) -> &[ProgressHandle] {
        &self.records
    }

    /// Mean percentage over all active imports, or `None` when idle.
    pub fn overall(&self) -> Option<f32> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f32 = self.records.iter().map(|r| r.borrow().percentage()).sum();
        Some(sum / self.records.len() as f32)
    }

    pub fn is_busy(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_monotonic_and_bounded() {
        let mut record = ProgressRecord::new("cube");
        record.set_percentage(40.0);
        record.set_percentage(20.0);
        assert_eq!(record.percentage(), 40.0);
        record.set_percentage(150.0);
        assert_eq!(record.percentage(), 100.0);
    }

    #[test]
    fn fail_freezes_percentage_and_sets_flag() {
        let mut record = ProgressRecord::new("cube");
        record.set_percentage(8.0);
        record.fail("malformed file");
        assert!(record.has_error());
        assert_eq!(record.status(), "malformed file");
        assert_eq!(record.percentage(), 8.0);
    }

    #[test]
    fn overall_averages_active_records() {
        let mut global = GlobalProgress::new();
        assert_eq!(global.overall(), None);
        assert!(!global.is_busy());

        let a = ProgressRecord::shared("a");
        let b = ProgressRecord::shared("b");
        a.borrow_mut().set_percentage(30.0);
        b.borrow_mut().set_percentage(70.0);
        global.register(a.clone());
        global.register(b.clone());
        assert_eq!(global.overall(), Some(50.0));
        assert!(global.is_busy());

        global.unregister(&a);
        assert_eq!(global.overall(), Some(70.0));
        global.unregister(&b);
        assert!(!global.is_busy());
    }
}
