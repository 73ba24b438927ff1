use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded { reason: String },
    Failed { reason: String },
}

#[derive(Clone)]
pub struct HealthMonitor {
    components: Arc<RwLock<HashMap<String, (HealthStatus, Instant)>>>,
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn report(&self, component: impl Into<String>, status: HealthStatus) {
        self.components
            .write()
            .insert(component.into(), (status, Instant::now()));
    }

    pub fn status_of(&self, component: &str) -> Option<HealthStatus> {
        self.components.read().get(component).map(|(s, _)| s.clone())
    }

    pub fn is_healthy(&self) -> bool {
        self.components
            .read()
            .values()
            .all(|(status, _)| matches!(status, HealthStatus::Healthy))
    }

    pub fn failed_components(&self) -> Vec<String> {
        self.components
            .read()
            .iter()
            .filter(|(_, (status, _))| matches!(status, HealthStatus::Failed { .. }))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_until_a_component_reports_otherwise() {
        let monitor = HealthMonitor::new();
        assert!(monitor.is_healthy());
        monitor.report("sink", HealthStatus::Healthy);
        assert!(monitor.is_healthy());
        monitor.report(
            "translator",
            HealthStatus::Degraded {
                reason: "retrying".into(),
            },
        );
        assert!(!monitor.is_healthy());
    }

    #[test]
    fn tracks_failed_components_by_name() {
        let monitor = HealthMonitor::new();
        monitor.report(
            "sink",
            HealthStatus::Failed {
                reason: "device gone".into(),
            },
        );
        assert_eq!(monitor.failed_components(), vec!["sink".to_string()]);
    }
}
