use crate::wire::{Alert, AlertStatus, Severity};

/// Latest generated alert batch. Local resolutions last until the next batch.
#[derive(Debug, Default, Clone)]
pub struct AlertBoard {
    alerts: Vec<Alert>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new batch as generated. Ids are only unique within a batch,
    /// so nothing carries over. An empty batch keeps the current one.
    pub fn replace(&mut self, batch: Vec<Alert>) {
        if batch.is_empty() {
            return;
        }
        self.alerts = batch;
    }

    /// Active -> Resolved. Returns false for unknown ids.
    pub fn resolve(&mut self, id: &str) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.status = AlertStatus::Resolved;
                true
            }
            None => false,
        }
    }

    pub fn all(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn active_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.status == AlertStatus::Active).count()
    }

    /// Filtered view: Active before Resolved, then Critical, Warning, Info.
    pub fn view(&self, status: Option<AlertStatus>, severity: Option<Severity>) -> Vec<&Alert> {
        let mut out: Vec<&Alert> = self
            .alerts
            .iter()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .filter(|a| severity.map_or(true, |s| a.severity == s))
            .collect();
        out.sort_by_key(|a| (a.status != AlertStatus::Active, a.severity));
        out
    }
}
