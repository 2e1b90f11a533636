//! Mains presence monitor.
//!
//! Watches the dimmer's accepted zero-cross counter from the application
//! task.  The counter stalling for `loss_after` consecutive checks means the
//! lamps have gone dark; any advance means the zero-cross signal is back.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainsTransition {
    Lost,
    Restored,
}

#[derive(Debug)]
pub struct MainsMonitor {
    last_edges: u32,
    silent_checks: u32,
    loss_after: u32,
    present: bool,
}

impl MainsMonitor {
    /// Assumes mains is present at boot; a dead input is reported after
    /// `loss_after` checks.
    pub fn new(loss_after: u32) -> Self {
        Self {
            last_edges: 0,
            silent_checks: 0,
            loss_after: loss_after.max(1),
            present: true,
        }
    }

    /// Feed the current accepted-edge counter.
    pub fn observe(&mut self, edges: u32) -> Option<MainsTransition> {
        if edges != self.last_edges {
            self.last_edges = edges;
            self.silent_checks = 0;
            if !self.present {
                self.present = true;
                return Some(MainsTransition::Restored);
            }
            return None;
        }

        self.silent_checks = self.silent_checks.saturating_add(1);
        if self.present && self.silent_checks >= self.loss_after {
            self.present = false;
            return Some(MainsTransition::Lost);
        }
        None
    }

    pub fn is_present(&self) -> bool {
        self.present
    }
}
