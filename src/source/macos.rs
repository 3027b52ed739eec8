//! macOS snapshot source.
//!
//! There is no `/proc`, so figures come from command output:
//! `sysctl -n hw.memsize`, `vm_stat`, `sysctl -n vm.swapusage`,
//! `sysctl -n kern.memorystatus_vm_pressure_level` and
//! `ps -axo pid=,rss=,comm=`. Parsing is kept separate from execution so the
//! parsers can be tested on any host.

use super::subprocess::run_with_timeout;
use super::SnapshotSource;
use crate::error::{MemwatchError, Result};
use crate::types::{PressureLevel, ProcessSample, SystemStats};
use std::time::Duration;

const SOURCE_ID: &str = "macos";

const FAST_TIMEOUT: Duration = Duration::from_secs(1);
const SLOW_TIMEOUT: Duration = Duration::from_secs(2);

/// Page counters reported by `vm_stat`, converted to bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmStat {
    /// Page size reported in the header line.
    pub page_size: u64,
    /// Free pages.
    pub free: u64,
    /// Active pages.
    pub active: u64,
    /// Inactive pages.
    pub inactive: u64,
    /// Speculative pages.
    pub speculative: u64,
    /// Wired pages.
    pub wired: u64,
    /// Pages held by the compressor.
    pub compressed: u64,
    /// Purgeable pages.
    pub purgeable: u64,
}

/// Parses `vm_stat` output. Counters are returned in bytes.
pub fn parse_vm_stat(content: &str) -> VmStat {
    // "Mach Virtual Memory Statistics: (page size of 16384 bytes)"
    let page_size = content
        .lines()
        .next()
        .and_then(|l| l.split("page size of ").nth(1))
        .and_then(|s| s.split_whitespace().next())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(4096);

    let mut vm = VmStat { page_size, ..VmStat::default() };
    for line in content.lines().skip(1) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let Ok(pages) = value.trim().trim_end_matches('.').parse::<u64>() else {
            continue;
        };
        let bytes = pages.saturating_mul(page_size);
        match key.trim() {
            "Pages free" => vm.free = bytes,
            "Pages active" => vm.active = bytes,
            "Pages inactive" => vm.inactive = bytes,
            "Pages speculative" => vm.speculative = bytes,
            "Pages wired down" => vm.wired = bytes,
            "Pages occupied by compressor" => vm.compressed = bytes,
            "Pages purgeable" => vm.purgeable = bytes,
            _ => {}
        }
    }
    vm
}

fn parse_size_token(token: &str) -> Option<u64> {
    let (number, scale) = match token.chars().last()? {
        'K' => (&token[..token.len() - 1], 1024.0),
        'M' => (&token[..token.len() - 1], 1024.0 * 1024.0),
        'G' => (&token[..token.len() - 1], 1024.0 * 1024.0 * 1024.0),
        _ => (token, 1.0),
    };
    number.parse::<f64>().ok().map(|v| (v * scale) as u64)
}

/// Parses `sysctl -n vm.swapusage` into `(used, total)` bytes.
///
/// Input looks like `total = 2048.00M  used = 1024.00M  free = 1024.00M  (encrypted)`.
pub fn parse_swapusage(content: &str) -> (u64, u64) {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    let mut used = 0;
    let mut total = 0;
    for window in tokens.windows(3) {
        if window[1] != "=" {
            continue;
        }
        let Some(bytes) = parse_size_token(window[2]) else {
            continue;
        };
        match window[0] {
            "total" => total = bytes,
            "used" => used = bytes,
            _ => {}
        }
    }
    (used, total)
}

/// Maps `kern.memorystatus_vm_pressure_level` (1, 2, 4) to a level.
pub fn parse_pressure(content: &str) -> PressureLevel {
    match content.trim().parse::<u32>() {
        Ok(2) => PressureLevel::Warn,
        Ok(4) => PressureLevel::Critical,
        _ => PressureLevel::Normal,
    }
}

/// Parses one `ps -axo pid=,rss=,comm=` line. RSS is in kB; `comm` is a path.
pub fn parse_ps_line(line: &str) -> Option<ProcessSample> {
    let mut parts = line.trim_start().splitn(2, char::is_whitespace);
    let pid = parts.next()?.parse::<u32>().ok()?;
    let rest = parts.next()?.trim_start();
    let (rss, comm) = rest.split_once(char::is_whitespace)?;
    let rss = rss.parse::<u64>().ok()?;
    let comm = comm.trim();
    let name = comm.rsplit('/').next().unwrap_or(comm);
    Some(ProcessSample::new(pid, rss.saturating_mul(1024), name))
}

/// Combines the command outputs into host figures.
pub fn system_stats(total: u64, vm: &VmStat, swap: (u64, u64), pressure: PressureLevel) -> SystemStats {
    let free = vm.free + vm.speculative;
    let available = free + vm.inactive + vm.purgeable;
    SystemStats {
        total,
        used: total.saturating_sub(available),
        free,
        cached: vm.purgeable,
        active: vm.active,
        wired: vm.wired,
        inactive: vm.inactive,
        speculative: vm.speculative,
        compressed: vm.compressed,
        swap_used: swap.0,
        swap_total: swap.1,
        pressure,
    }
}

/// Snapshot source driving the macOS command-line tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacSource;

impl MacSource {
    /// Creates the source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotSource for MacSource {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn read_system_stats(&mut self) -> Result<SystemStats> {
        let total = run_with_timeout("sysctl", &["-n", "hw.memsize"], FAST_TIMEOUT)?
            .trim()
            .parse::<u64>()
            .map_err(|e| MemwatchError::provider(SOURCE_ID, format!("bad hw.memsize: {e}")))?;
        let vm = parse_vm_stat(&run_with_timeout("vm_stat", &[], SLOW_TIMEOUT)?);

        // Swap and pressure are optional extras.
        let swap = run_with_timeout("sysctl", &["-n", "vm.swapusage"], FAST_TIMEOUT)
            .map(|s| parse_swapusage(&s))
            .unwrap_or((0, 0));
        let pressure =
            run_with_timeout("sysctl", &["-n", "kern.memorystatus_vm_pressure_level"], FAST_TIMEOUT)
                .map(|s| parse_pressure(&s))
                .unwrap_or_default();

        Ok(system_stats(total, &vm, swap, pressure))
    }

    fn read_process_list(&mut self, capacity: usize) -> Result<Vec<ProcessSample>> {
        let output = run_with_timeout("ps", &["-axo", "pid=,rss=,comm="], SLOW_TIMEOUT)?;
        Ok(output.lines().filter_map(parse_ps_line).take(capacity).collect())
    }
}
