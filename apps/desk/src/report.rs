use tracing::{error, info};

/// Where command outcomes go. The CLI logs them; tests record them.
pub trait Reporter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn success(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}
