//! Process supervisor for the `auth`/`world`/`armory` services (§4.8).

use crate::{Error, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

const SELF_RESTART_DELAY: Duration = Duration::from_millis(500);

/// One managed service's launch configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub name: String,
    pub binary_path: PathBuf,
    /// Substring matched against each candidate process's full command
    /// line. Defaults to the service name.
    pub match_pattern: String,
    pub log_dir: PathBuf,
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>, binary_path: impl Into<PathBuf>, log_dir: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let match_pattern = name.clone();
        Self {
            name,
            binary_path: binary_path.into(),
            match_pattern,
            log_dir: log_dir.into(),
        }
    }
}

/// `{running, pids}` for one service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub pids: Vec<i32>,
}

/// Supervises a fixed roster of services by name.
pub struct Supervisor {
    services: Vec<ServiceConfig>,
}

impl Supervisor {
    pub fn new(services: Vec<ServiceConfig>) -> Self {
        Self { services }
    }

    fn find(&self, name: &str) -> Result<&ServiceConfig> {
        self.services
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::UnknownService(name.to_string()))
    }

    /// Running PIDs for every managed service, by name.
    pub fn status_all(&self) -> Vec<(String, ServiceStatus)> {
        self.services
            .iter()
            .map(|s| (s.name.clone(), self.status_of(s)))
            .collect()
    }

    pub fn status(&self, name: &str) -> Result<ServiceStatus> {
        Ok(self.status_of(self.find(name)?))
    }

    fn status_of(&self, service: &ServiceConfig) -> ServiceStatus {
        let pids = matching_pids(&service.match_pattern);
        ServiceStatus {
            running: !pids.is_empty(),
            pids,
        }
    }

    /// Spawn `name`'s binary detached, with stdin null and stdout/stderr
    /// appended to its log file. Returns the child PID.
    pub fn start(&self, name: &str) -> Result<u32> {
        let service = self.find(name)?;
        let pid = spawn_detached(&service.binary_path, &[], &dated_log_path(&service.log_dir, &service.name))?;
        log::info!("started {name} as pid {pid}");
        Ok(pid)
    }

    /// Send `SIGTERM` to every process matching `name`'s pattern.
    pub fn stop(&self, name: &str) -> Result<()> {
        let service = self.find(name)?;
        for pid in matching_pids(&service.match_pattern) {
            signal_terminate(pid);
        }
        log::info!("stopped {name}");
        Ok(())
    }

    /// Stop, then start once the signal returns.
    pub fn restart(&self, name: &str) -> Result<u32> {
        self.stop(name)?;
        let pid = self.start(name)?;
        log::info!("restarted {name} as pid {pid}");
        Ok(pid)
    }

    /// Spawn a fresh copy of the supervisor itself, then exit this process
    /// after a short delay so the new copy has time to bind its ports.
    /// Uses a second, distinctly-dated log file so the new process doesn't
    /// truncate the one still being written by this one.
    pub fn self_restart(&self, supervisor_binary: &Path, log_dir: &Path, args: &[String]) -> Result<()> {
        let log_path = dated_log_path(log_dir, "supervisor-restart");
        spawn_detached(supervisor_binary, args, &log_path)?;
        log::warn!("self-restart requested, exiting in {SELF_RESTART_DELAY:?}");
        thread::sleep(SELF_RESTART_DELAY);
        std::process::exit(0);
    }
}

fn dated_log_path(log_dir: &Path, name: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%m-%d-%Y");
    log_dir.join(format!("{name}-{stamp}.log"))
}

fn spawn_detached(binary: &Path, args: &[String], log_path: &Path) -> Result<u32> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new().create(true).append(true).open(log_path)?;
    let stderr_file = log_file.try_clone()?;

    let child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(log_file)
        .stderr(stderr_file)
        .spawn()?;
    Ok(child.id())
}

fn signal_terminate(pid: i32) {
    let _ = Command::new("kill").arg("-TERM").arg(pid.to_string()).status();
}

/// Full-command-line PID lookup via `/proc`, avoiding a dependency on a
/// process-enumeration crate for a single substring match.
fn matching_pids(pattern: &str) -> Vec<i32> {
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };
    let mut pids = Vec::new();
    for entry in entries.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<i32>() else {
            continue;
        };
        let cmdline_path = entry.path().join("cmdline");
        let Ok(raw) = std::fs::read(&cmdline_path) else {
            continue;
        };
        let cmdline = String::from_utf8_lossy(&raw).replace('\0', " ");
        if cmdline.contains(pattern) {
            pids.push(pid);
        }
    }
    pids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_service_name_is_rejected() {
        let supervisor = Supervisor::new(vec![ServiceConfig::new("auth", "/bin/auth", "/tmp")]);
        assert!(matches!(supervisor.status("world"), Err(Error::UnknownService(_))));
    }

    #[test]
    fn status_reports_not_running_for_a_pattern_nothing_matches() {
        let supervisor = Supervisor::new(vec![ServiceConfig::new(
            "definitely-not-a-real-process-pattern-xyz",
            "/bin/true",
            "/tmp",
        )]);
        let status = supervisor.status("definitely-not-a-real-process-pattern-xyz").unwrap();
        assert!(!status.running);
        assert!(status.pids.is_empty());
    }

    #[test]
    fn dated_log_path_is_scoped_under_the_log_dir() {
        let path = dated_log_path(Path::new("/var/log/sdb"), "auth");
        assert!(path.starts_with("/var/log/sdb"));
        assert!(path.to_string_lossy().contains("auth-"));
    }
}
