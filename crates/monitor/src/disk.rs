//! Filesystem usage check.
//!
//! Usage is computed the way `df` reports `Use%`: space used by files
//! divided by the space available to unprivileged users plus that used,
//! rounded up.

use std::path::Path;

use crate::error::MonitorError;

/// Above this percentage usage is a warning.
pub const DISK_WARNING_PERCENT: u8 = 80;

/// Above this percentage usage is critical.
pub const DISK_CRITICAL_PERCENT: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskLevel {
    Ok,
    Warning,
    Critical,
}

/// `df`-style usage percentage, rounded up.
pub fn usage_percent(used_bytes: u64, available_bytes: u64) -> u8 {
    let denominator = used_bytes as u128 + available_bytes as u128;
    if denominator == 0 {
        return 0;
    }
    let percent = (used_bytes as u128 * 100).div_ceil(denominator);
    percent.min(100) as u8
}

pub fn classify(percent: u8) -> DiskLevel {
    if percent > DISK_CRITICAL_PERCENT {
        DiskLevel::Critical
    } else if percent > DISK_WARNING_PERCENT {
        DiskLevel::Warning
    } else {
        DiskLevel::Ok
    }
}

/// Read usage for the filesystem containing `path` via `statvfs(3)`.
#[cfg(unix)]
pub fn read_disk_usage(path: &Path) -> Result<DiskUsage, MonitorError> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let disk_error = |source: std::io::Error| MonitorError::Disk {
        path: path.to_path_buf(),
        source,
    };

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| disk_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();

    // Safety: `c_path` is a valid NUL-terminated string and `stat` points to
    // writable memory of the right size.
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return Err(disk_error(std::io::Error::last_os_error()));
    }
    // Safety: statvfs returned 0, so the struct is initialised.
    let stat = unsafe { stat.assume_init() };

    let block_size = stat.f_frsize as u64;
    let total_bytes = stat.f_blocks as u64 * block_size;
    let used_bytes = (stat.f_blocks as u64).saturating_sub(stat.f_bfree as u64) * block_size;
    let available_bytes = stat.f_bavail as u64 * block_size;

    Ok(DiskUsage {
        total_bytes,
        used_bytes,
        available_bytes,
        percent: usage_percent(used_bytes, available_bytes),
    })
}

#[cfg(not(unix))]
pub fn read_disk_usage(path: &Path) -> Result<DiskUsage, MonitorError> {
    Err(MonitorError::Disk {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::Unsupported, "statvfs unavailable"),
    })
}

/// Read, classify and log usage for `path`.
pub fn check_disk(path: &Path) -> Result<(DiskUsage, DiskLevel), MonitorError> {
    let usage = read_disk_usage(path)?;
    let level = classify(usage.percent);

    match level {
        DiskLevel::Critical => tracing::warn!(
            path = %path.display(),
            percent = usage.percent,
            "[CRITICAL] disk usage {}%",
            usage.percent,
        ),
        DiskLevel::Warning => tracing::warn!(
            path = %path.display(),
            percent = usage.percent,
            "[WARNING] disk usage {}%",
            usage.percent,
        ),
        DiskLevel::Ok => tracing::info!(
            path = %path.display(),
            percent = usage.percent,
            "[OK] disk usage {}%",
            usage.percent,
        ),
    }

    Ok((usage, level))
}
