use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// Drives one pipeline through extract → transform → load.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let name = self.pipeline.name();
        let started = Instant::now();
        tracing::info!("🚀 Starting {} pipeline", name);

        let input = self.pipeline.extract().await?;
        tracing::debug!("📥 {}: extract done", name);
        self.monitor.log_stats(&format!("{} extract", name));

        let output = self.pipeline.transform(input).await?;
        tracing::debug!("🔄 {}: transform done", name);
        self.monitor.log_stats(&format!("{} transform", name));

        let location = self.pipeline.load(output).await?;
        tracing::debug!("💾 {}: load done", name);
        self.monitor.log_stats(&format!("{} load", name));

        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }
        tracing::info!(
            "✅ {} pipeline finished in {:?}: {}",
            name,
            started.elapsed(),
            location
        );
        Ok(location)
    }
}
