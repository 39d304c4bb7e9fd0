//! Host metrics sampling.

use parking_lot::Mutex;
use sysinfo::{Networks, System};

use xpanel_core::types::{HostSample, Traffic, Usage};

const TCP_TABLES: [&str; 2] = ["/proc/net/tcp", "/proc/net/tcp6"];
const UDP_TABLES: [&str; 2] = ["/proc/net/udp", "/proc/net/udp6"];

/// Reads CPU, memory, load, uptime and network counters of the host.
///
/// CPU usage is computed between consecutive refreshes, so the first sample
/// after construction may report zero.
pub struct HostSampler {
    state: Mutex<SamplerState>,
}

struct SamplerState {
    system: System,
    networks: Networks,
}

impl HostSampler {
    /// Creates a sampler with an initial refresh of every counter.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SamplerState {
                system: System::new_all(),
                networks: Networks::new_with_refreshed_list(),
            }),
        }
    }

    /// Takes one sample. Blocking; call it off the async workers.
    pub fn sample(&self) -> HostSample {
        let mut state = self.state.lock();
        let SamplerState { system, networks } = &mut *state;

        system.refresh_cpu();
        system.refresh_memory();
        networks.refresh();

        let net_traffic = networks.iter().fold(Traffic::default(), |acc, (_, data)| Traffic {
            sent: acc.sent.saturating_add(data.total_transmitted()),
            recv: acc.recv.saturating_add(data.total_received()),
        });
        let load = System::load_average();

        HostSample {
            cpu_percent: system.global_cpu_info().cpu_usage(),
            cpu_cores: system.cpus().len(),
            mem: Usage {
                current: system.used_memory(),
                total: system.total_memory(),
            },
            swap: Usage {
                current: system.used_swap(),
                total: system.total_swap(),
            },
            load: [load.one, load.five, load.fifteen],
            uptime_secs: System::uptime(),
            tcp_count: count_sockets(&TCP_TABLES),
            udp_count: count_sockets(&UDP_TABLES),
            net_traffic,
        }
    }
}

impl Default for HostSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Sums socket entries over procfs tables. Missing tables count as zero.
fn count_sockets(tables: &[&str]) -> usize {
    tables
        .iter()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .map(|contents| table_entries(&contents))
        .sum()
}

/// Number of socket rows in a `/proc/net/{tcp,udp}` table, header excluded.
fn table_entries(contents: &str) -> usize {
    contents
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_entries_skip_header() {
        let table = "  sl  local_address rem_address   st tx_queue rx_queue\n   \
                     0: 0100007F:0277 00000000:0000 0A 00000000:00000000\n   \
                     1: 00000000:0016 00000000:0000 0A 00000000:00000000\n";
        assert_eq!(table_entries(table), 2);
        assert_eq!(table_entries(""), 0);
    }

    #[test]
    fn test_missing_tables_count_zero() {
        assert_eq!(count_sockets(&["/nonexistent/tcp"]), 0);
    }

    #[test]
    fn test_sample_reads_host() {
        let sampler = HostSampler::new();
        let sample = sampler.sample();

        assert!(sample.cpu_cores > 0);
        assert!(sample.mem.total > 0);
        assert!(sample.mem.current <= sample.mem.total);
        assert!((0.0..=100.0 * sample.cpu_cores as f32).contains(&sample.cpu_percent));
    }
}
