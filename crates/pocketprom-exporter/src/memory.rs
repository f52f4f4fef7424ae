//! Process memory probe backed by `sysinfo`.
//!
//! Refreshes only this process and only its memory figures, so a sample is
//! cheap enough to take on every metrics refresh.

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

use pocketprom_core::host::{MemoryProbe, MemorySample};

pub struct SysinfoMemoryProbe {
    system: System,
    pid: Option<Pid>,
    peak_resident: u64,
}

impl SysinfoMemoryProbe {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing().with_memory()),
        );
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!(error = %e, "cannot resolve own pid, memory metrics will read zero");
                None
            }
        };
        Self { system, pid, peak_resident: 0 }
    }
}

impl Default for SysinfoMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SysinfoMemoryProbe {
    fn sample(&mut self) -> MemorySample {
        let Some(pid) = self.pid else {
            return MemorySample::default();
        };

        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );

        let Some(process) = self.system.process(pid) else {
            return MemorySample { peak_bytes: self.peak_resident, ..MemorySample::default() };
        };

        let resident = process.memory();
        self.peak_resident = self.peak_resident.max(resident);

        MemorySample {
            usage_bytes: resident,
            real_bytes: process.virtual_memory(),
            peak_bytes: self.peak_resident,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_never_drops() {
        let mut probe = SysinfoMemoryProbe::new();
        let a = probe.sample();
        let b = probe.sample();
        assert!(b.peak_bytes >= a.peak_bytes);
        assert!(b.peak_bytes >= b.usage_bytes);
    }
}
