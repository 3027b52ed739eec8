//! Single-shot reports over a fixture `/proc` tree.

#![allow(clippy::unwrap_used)]

use memwatch::config::{Config, Options, Overrides};
use memwatch::report::{Report, ReportFormat};
use memwatch::source::ProcSource;
use memwatch::types::{PressureLevel, SortMode};
use std::fs;
use std::path::Path;

fn write_proc(root: &Path, pid: u32, name: &str, rss_kb: Option<u64>) {
    let dir = root.join(pid.to_string());
    fs::create_dir_all(&dir).unwrap();
    let mut status = format!("Name:\t{name}\nState:\tS (sleeping)\n");
    if let Some(kb) = rss_kb {
        status.push_str(&format!("VmRSS:\t{kb} kB\n"));
    }
    fs::write(dir.join("status"), status).unwrap();
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(
        root.join("meminfo"),
        "MemTotal: 8388608 kB\nMemFree: 1048576 kB\nMemAvailable: 2097152 kB\nCached: 524288 kB\n\
         SwapTotal: 0 kB\nSwapFree: 0 kB\n",
    )
    .unwrap();
    fs::create_dir(root.join("pressure")).unwrap();
    fs::write(root.join("pressure/memory"), "some avg10=2.00 avg60=1.00 avg300=0.50 total=99\n").unwrap();

    write_proc(root, 1, "systemd", Some(12_288));
    write_proc(root, 512, "postgres", Some(524_288));
    write_proc(root, 900, "my,app", Some(65_536));
    write_proc(root, 2, "kthreadd", None);
    dir
}

#[test]
fn test_text_report_from_proc_fixture() {
    let dir = fixture();
    let mut source = ProcSource::with_root(dir.path());
    let report = Report::collect(&mut source, SortMode::Memory, 100).unwrap();

    assert_eq!(report.system.pressure, PressureLevel::Normal);
    assert_eq!(report.processes.len(), 3);

    let text = report.render(ReportFormat::Text).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "memwatch  Memory: 6.00GiB / 8.00GiB (75.0%)  Pressure: NORMAL");
    assert!(lines[4].starts_with("    1     512  postgres"), "{}", lines[4]);
    assert!(lines[4].ends_with("512.00MiB"));
    assert!(lines[6].contains("systemd"));
}

#[test]
fn test_csv_and_top_from_proc_fixture() {
    let dir = fixture();
    let mut source = ProcSource::with_root(dir.path());
    let report = Report::collect(&mut source, SortMode::Pid, 100).unwrap().top(Some(2));

    let csv = report.render(ReportFormat::Csv).unwrap();
    assert_eq!(csv, format!("pid,name,resident_bytes\n1,systemd,{}\n512,postgres,{}\n", 12_288 * 1024, 524_288 * 1024));
}

#[test]
fn test_config_file_drives_report_order() {
    let dir = fixture();
    let config_path = dir.path().join("memwatch.yaml");
    fs::write(&config_path, "sort: name\ncapacity: 50\n").unwrap();

    let config = Config::resolve(Some(&config_path)).unwrap();
    let options = Options::from_config(&config, &Overrides::default()).unwrap();
    assert_eq!(options.initial_sort, SortMode::Name);

    let mut source = ProcSource::with_root(dir.path());
    let report = Report::collect(&mut source, options.initial_sort, options.process_capacity).unwrap();
    let names: Vec<&str> = report.processes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["my,app", "postgres", "systemd"]);

    let csv = report.render(ReportFormat::Csv).unwrap();
    assert!(csv.contains("900,\"my,app\","));
}
