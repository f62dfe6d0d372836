//! Mounted volumes from `/proc/mounts` and `statvfs`.

use super::read_i64;
use crate::platform::{StorageSource, Volume};
use crate::{Error, Result};
use std::collections::HashSet;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage source listing block-device mounts.
#[derive(Debug, Clone)]
pub struct MountedVolumes {
    mounts: PathBuf,
    sys_block: PathBuf,
}

impl MountedVolumes {
    pub fn new(procfs_root: &Path, sysfs_root: &Path) -> Self {
        Self {
            mounts: procfs_root.join("mounts"),
            sys_block: sysfs_root.join("block"),
        }
    }

    fn is_removable(&self, device: &str) -> bool {
        let Some(name) = device.strip_prefix("/dev/") else {
            return false;
        };
        read_i64(&self.sys_block.join(parent_disk(name)).join("removable")) == Some(1)
    }
}

/// A parsed `/proc/mounts` line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MountEntry {
    device: String,
    mount_point: String,
    fs_type: String,
    read_only: bool,
}

fn parse_mounts(content: &str) -> Vec<MountEntry> {
    let mut seen = HashSet::new();
    content
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return None;
            }
            let device = unescape(fields[0]);
            if !device.starts_with("/dev/") || device.starts_with("/dev/loop") {
                return None;
            }
            if !seen.insert(device.clone()) {
                return None;
            }
            Some(MountEntry {
                device,
                mount_point: unescape(fields[1]),
                fs_type: fields[2].to_string(),
                read_only: fields[3].split(',').any(|o| o == "ro"),
            })
        })
        .collect()
}

/// Decodes the octal escapes (`\040` for space) used in `/proc/mounts`.
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let octal = bytes.get(i + 1..i + 4).filter(|d| d.iter().all(|b| (b'0'..=b'7').contains(b)));
        if let (b'\\', Some(digits)) = (bytes[i], octal) {
            let code = digits
                .iter()
                .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
            out.push(code as u8);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).to_string()
}

/// Maps a partition name to its disk: sda1 -> sda, nvme0n1p2 -> nvme0n1.
fn parent_disk(name: &str) -> &str {
    let trimmed = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.len() == name.len() {
        return name;
    }
    if (name.starts_with("nvme") || name.starts_with("mmcblk")) && trimmed.ends_with('p') {
        return &trimmed[..trimmed.len() - 1];
    }
    if name.starts_with("nvme") || name.starts_with("mmcblk") {
        // Whole device such as nvme0n1 or mmcblk0.
        return name;
    }
    trimmed
}

/// Returns (capacity, available) in bytes for a mount point.
fn filesystem_size(mount_point: &str) -> Option<(u64, u64)> {
    let path = CString::new(mount_point).ok()?;
    // SAFETY: statvfs only writes into the zeroed struct we pass and reads the
    // NUL-terminated path we own for the duration of the call.
    unsafe {
        let mut stat: libc::statvfs = std::mem::zeroed();
        if libc::statvfs(path.as_ptr(), &mut stat) != 0 {
            return None;
        }
        let block = stat.f_frsize as u64;
        Some((
            stat.f_blocks as u64 * block,
            stat.f_bavail as u64 * block,
        ))
    }
}

impl StorageSource for MountedVolumes {
    fn volumes(&self) -> Result<Vec<Volume>> {
        let content = std::fs::read_to_string(&self.mounts).map_err(|e| {
            Error::unavailable("storage", format!("{}: {}", self.mounts.display(), e))
        })?;

        let volumes = parse_mounts(&content)
            .into_iter()
            .filter_map(|entry| {
                let Some((capacity, available)) = filesystem_size(&entry.mount_point) else {
                    debug!("Skipping {}: statvfs failed", entry.mount_point);
                    return None;
                };
                Some(Volume {
                    removable: self.is_removable(&entry.device),
                    device: entry.device,
                    mount_point: entry.mount_point,
                    fs_type: entry.fs_type,
                    read_only: entry.read_only,
                    capacity,
                    available,
                })
            })
            .collect();
        Ok(volumes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
/dev/nvme0n1p2 / ext4 rw,relatime 0 0
/dev/nvme0n1p2 /var/lib/docker ext4 rw,relatime 0 0
/dev/loop3 /snap/core/1 squashfs ro,nodev 0 0
/dev/sdb1 /media/usb\\040stick vfat ro,nosuid 0 0
";

    #[test]
    fn test_parse_mounts() {
        let entries = parse_mounts(MOUNTS);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].device, "/dev/nvme0n1p2");
        assert_eq!(entries[0].mount_point, "/");
        assert!(!entries[0].read_only);
        assert_eq!(entries[1].mount_point, "/media/usb stick");
        assert!(entries[1].read_only);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a\\040b"), "a b");
        assert_eq!(unescape("plain"), "plain");
        assert_eq!(unescape("trailing\\04"), "trailing\\04");
    }

    #[test]
    fn test_parent_disk() {
        assert_eq!(parent_disk("sda1"), "sda");
        assert_eq!(parent_disk("sda"), "sda");
        assert_eq!(parent_disk("nvme0n1p2"), "nvme0n1");
        assert_eq!(parent_disk("nvme0n1"), "nvme0n1");
        assert_eq!(parent_disk("mmcblk0p1"), "mmcblk0");
        assert_eq!(parent_disk("mmcblk0"), "mmcblk0");
    }

    #[test]
    fn test_removable_flag() {
        let root = tempfile::tempdir().unwrap();
        let disk = root.path().join("sys/block/sdb");
        std::fs::create_dir_all(&disk).unwrap();
        std::fs::write(disk.join("removable"), "1\n").unwrap();

        let source = MountedVolumes::new(&root.path().join("proc"), &root.path().join("sys"));
        assert!(source.is_removable("/dev/sdb1"));
        assert!(!source.is_removable("/dev/sda1"));
        assert!(!source.is_removable("tmpfs"));
    }

    #[test]
    fn test_volumes_from_fixture() {
        let root = tempfile::tempdir().unwrap();
        let mount_point = root.path().join("mnt");
        std::fs::create_dir_all(&mount_point).unwrap();
        std::fs::create_dir_all(root.path().join("proc")).unwrap();
        std::fs::write(
            root.path().join("proc/mounts"),
            format!("/dev/sda1 {} ext4 rw 0 0\n", mount_point.display()),
        )
        .unwrap();

        let source = MountedVolumes::new(&root.path().join("proc"), &root.path().join("sys"));
        let volumes = source.volumes().unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].fs_type, "ext4");
        assert!(volumes[0].capacity >= volumes[0].available);
    }
}
