//! Section progress ("Section 2 of 4").

use strum::Display;

/// Where a section stands relative to the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

/// Position of the active section within the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 0-based index of the active section.
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    /// Human readable position, 1-based.
    pub fn label(&self) -> String {
        format!("Section {} of {}", self.current + 1, self.total)
    }

    /// Share of the form reached so far, counting the active section.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        ((self.current + 1) as f64 / self.total as f64).min(1.0)
    }

    pub fn percent(&self) -> u16 {
        (self.fraction() * 100.0).round() as u16
    }

    pub fn step(&self, index: usize) -> StepStatus {
        match index.cmp(&self.current) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Current,
            std::cmp::Ordering::Greater => StepStatus::Upcoming,
        }
    }

    pub fn steps(&self) -> impl Iterator<Item = StepStatus> + '_ {
        (0..self.total).map(move |i| self.step(i))
    }
}
