//! SD card preparation: formatting and writing boot images.
//!
//! Destructive operations on a user-supplied block device, so the
//! device path is sanity-checked and every step is printed before it
//! runs. Only `cheribsd`-kind targets boot from an SD card in this
//! demo.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::command::{self, Invocation};
use crate::config::Config;
use crate::error::SdError;
use crate::models::TargetSpec;

/// FAT label given to the freshly formatted boot partition.
const BOOT_PARTITION_LABEL: &str = "CHERIBSD";

/// First-partition path for a device, honoring the `p` suffix scheme
/// of nvme/mmcblk device names.
pub fn partition_device(device: &str) -> String {
    if device.chars().last().is_some_and(|c| c.is_ascii_digit()) {
        format!("{}p1", device)
    } else {
        format!("{}1", device)
    }
}

fn require_block_device(device: &str) -> Result<(), SdError> {
    if device.starts_with("/dev/") {
        Ok(())
    } else {
        Err(SdError::NotBlockDevice(device.to_string()))
    }
}

/// The formatting sequence: wipe signatures, write an MSDOS label with
/// one FAT32 partition spanning the device, then mkfs the partition.
pub fn plan_format(device: &str) -> Vec<Invocation> {
    let partition = partition_device(device);
    vec![
        Invocation::new("sudo", ["wipefs", "-a", device]),
        Invocation::new(
            "sudo",
            [
                "parted", "-s", device, "mklabel", "msdos", "mkpart", "primary", "fat32",
                "1MiB", "100%",
            ],
        ),
        Invocation::new(
            "sudo",
            ["mkfs.vfat", "-F", "32", "-n", BOOT_PARTITION_LABEL, partition.as_str()],
        ),
    ]
}

/// Partition and format an SD card (`format-sd`).
pub fn format_card(device: &str) -> Result<(), SdError> {
    require_block_device(device)?;

    println!("{} {}", "Formatting SD card".bold(), device.red());
    println!("  {}", "this will erase the whole device!".red().bold());

    command::run_all(&plan_format(device))?;
    println!("{}", "✔ SD card formatted".green());
    Ok(())
}

/// The dd invocation writing a rootfs image to a device.
pub fn plan_write(image: &Path, device: &str) -> Invocation {
    Invocation::new(
        "sudo",
        [
            "dd".to_string(),
            format!("if={}", image.display()),
            format!("of={}", device),
            "bs=4M".to_string(),
            "status=progress".to_string(),
            "conv=fsync".to_string(),
        ],
    )
}

/// cheribuild's default image output directory (`~/cheri/output`).
pub fn cheribuild_output_dir() -> Result<PathBuf, SdError> {
    let home = dirs::home_dir().ok_or(SdError::HomeDirUnavailable)?;
    Ok(home.join("cheri").join("output"))
}

/// Write a CheriBSD rootfs image to a physical SD card (`flash-sd`).
pub fn write_rootfs(
    config: &Config,
    target: Option<&str>,
    device: &str,
) -> Result<(), SdError> {
    require_block_device(device)?;

    let (name, spec) = config.target(target)?;
    let target = match spec {
        TargetSpec::Cheribsd(target) => target,
        other => {
            return Err(SdError::WrongTargetKind {
                name: name.to_string(),
                kind: other.kind().to_string(),
            })
        }
    };

    let image = cheribuild_output_dir()?.join(&target.rootfs_img);
    if !image.exists() {
        return Err(SdError::ImageMissing {
            image,
            target: name.to_string(),
        });
    }

    println!("{} {}", "Preparing SD card for target".bold(), name.cyan());
    println!("  using rootfs image: {}", image.display().to_string().magenta());
    println!(
        "  writing to device: {} {}",
        device.red(),
        "(this will erase it!)".red()
    );

    command::run(&plan_write(&image, device))?;
    println!("{}", "✔ SD card prepared".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_device_plain() {
        assert_eq!(partition_device("/dev/sdb"), "/dev/sdb1");
    }

    #[test]
    fn test_partition_device_p_suffix() {
        assert_eq!(partition_device("/dev/mmcblk0"), "/dev/mmcblk0p1");
        assert_eq!(partition_device("/dev/nvme0n1"), "/dev/nvme0n1p1");
    }

    #[test]
    fn test_plan_format_sequence() {
        let plan = plan_format("/dev/sdb");
        let rendered: Vec<_> = plan.iter().map(|inv| inv.rendered()).collect();
        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered[0], "sudo wipefs -a /dev/sdb");
        assert!(rendered[1].starts_with("sudo parted -s /dev/sdb mklabel msdos"));
        assert!(rendered[2].ends_with("/dev/sdb1"));
    }

    #[test]
    fn test_plan_write_substitutes_paths() {
        let inv = plan_write(&PathBuf::from("/out/rootfs.img"), "/dev/sdb");
        assert_eq!(
            inv.rendered(),
            "sudo dd if=/out/rootfs.img of=/dev/sdb bs=4M status=progress conv=fsync"
        );
    }

    #[test]
    fn test_rejects_non_device_paths() {
        assert!(matches!(
            format_card("rootfs.img"),
            Err(SdError::NotBlockDevice(_))
        ));
    }
}
