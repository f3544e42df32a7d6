#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Resource usage of this process after one pipeline stage.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct StageStats {
    pub stage: String,
    pub cpu_percent: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
struct Sampler {
    system: System,
    peak_memory_mb: u64,
    stages: usize,
}

/// Logs CPU and memory after each extract/transform/load stage when `--monitor` is on.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    sampler: Option<Mutex<Sampler>>,
    pid: Option<Pid>,
    started: Instant,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = sysinfo::get_current_pid().ok();
        let sampler = enabled.then(|| {
            let mut system = System::new();
            if let Some(pid) = pid {
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            }
            Mutex::new(Sampler {
                system,
                peak_memory_mb: 0,
                stages: 0,
            })
        });

        Self {
            sampler,
            pid,
            started: Instant::now(),
        }
    }

    pub fn sample(&self, stage: &str) -> Option<StageStats> {
        let pid = self.pid?;
        let mut sampler = self.sampler.as_ref()?.lock().ok()?;

        sampler
            .system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let (cpu_percent, memory_mb) = {
            let process = sampler.system.process(pid)?;
            (process.cpu_usage(), process.memory() / 1024 / 1024)
        };
        sampler.peak_memory_mb = sampler.peak_memory_mb.max(memory_mb);
        sampler.stages += 1;

        Some(StageStats {
            stage: stage.to_string(),
            cpu_percent,
            memory_mb,
            peak_memory_mb: sampler.peak_memory_mb,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn log_stats(&self, stage: &str) {
        if let Some(stats) = self.sample(stage) {
            tracing::info!(
                stage = %stats.stage,
                "📊 CPU {:.1}%, memory {}MB (peak {}MB) after {:?}",
                stats.cpu_percent,
                stats.memory_mb,
                stats.peak_memory_mb,
                stats.elapsed
            );
        }
    }

    pub fn log_final_stats(&self) {
        let Some(sampler) = self.sampler.as_ref().and_then(|s| s.lock().ok()) else {
            return;
        };
        tracing::info!(
            "📊 {} stages in {:?}, peak memory {}MB",
            sampler.stages,
            self.started.elapsed(),
            sampler.peak_memory_mb
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.sampler.is_some()
    }
}

// Without the cli feature there is no sysinfo; monitoring is a no-op.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _stage: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_samples_nothing() {
        let monitor = SystemMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.sample("scrape extract").is_none());
    }

    #[test]
    fn test_enabled_monitor_tracks_peak() {
        let monitor = SystemMonitor::new(true);
        assert!(monitor.is_enabled());
        if let Some(stats) = monitor.sample("site load") {
            assert_eq!(stats.stage, "site load");
            assert!(stats.peak_memory_mb >= stats.memory_mb);
        }
    }
}
