use std::thread;
use std::time::Duration;
use sysinfo::System;

/// CPU 使用率監控，避免同時啟動太多 ffmpeg 造成主機過載
pub struct CpuMonitor {
    pub system: System,
    usage_threshold: f32,
}

impl CpuMonitor {
    #[must_use]
    pub fn new(usage_threshold: f32) -> Self {
        let mut system = System::new_all();
        system.refresh_cpu_all();
        thread::sleep(Duration::from_millis(200));
        system.refresh_cpu_all();
        Self {
            system,
            usage_threshold,
        }
    }

    pub fn refresh(&mut self) {
        self.system.refresh_cpu_all();
    }

    pub fn current_usage(&mut self) -> f32 {
        self.refresh();
        self.system.global_cpu_usage()
    }

    pub fn can_spawn_new_task(&mut self) -> bool {
        self.current_usage() < self.usage_threshold
    }
}

impl Default for CpuMonitor {
    fn default() -> Self {
        Self::new(90.0)
    }
}
