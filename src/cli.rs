//! Command-line interface definitions.

use clap::{Parser, Subcommand};

/// CheriBSD / Bao baremetal demo on CVA6-CHERI (Genesys2 FPGA).
#[derive(Debug, Parser)]
#[command(name = "cheridemo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CheriBSD / Bao baremetal demo on CVA6-CHERI (Genesys2 FPGA)")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clone all upstream repositories (cheribuild, cheri-cva6, opensbi,
    /// u-boot, bao, baremetal demo)
    Clone,

    /// List available CVA6 FPGA configurations
    ListConfigs,

    /// List available software targets (CheriBSD, Bao+baremetal, baremetal)
    ListSw,

    /// Build the CHERI SDK with cheribuild (for CheriBSD)
    BuildSdk {
        /// Number of parallel jobs
        #[arg(short, long, default_value_t = 8)]
        jobs: u32,
    },

    /// Build a software stack (CheriBSD, Bao+baremetal bundle, or
    /// baremetal bundle)
    BuildSw {
        /// Software target name (see 'cheridemo list-sw')
        #[arg(short, long)]
        target: Option<String>,

        /// Number of parallel jobs
        #[arg(short, long, default_value_t = 8)]
        jobs: u32,
    },

    /// Build the FPGA bitstream for CVA6-CHERI on Genesys2
    BuildFpga {
        /// CVA6 FPGA config name (see 'cheridemo list-configs')
        #[arg(short, long)]
        config: Option<String>,

        /// Number of parallel jobs
        #[arg(short, long, default_value_t = 8)]
        jobs: u32,
    },

    /// Flash the Genesys2 board with the built bitstream
    FlashFpga {
        /// CVA6 FPGA config name (see 'cheridemo list-configs')
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Partition an SD card and create a FAT32 boot partition
    FormatSd {
        /// /dev/sdX (BE VERY CAREFUL)
        #[arg(long)]
        device: String,
    },

    /// Write a CheriBSD rootfs image to a physical SD card
    FlashSd {
        /// /dev/sdX (BE VERY CAREFUL)
        #[arg(long)]
        device: String,

        /// Software target that boots from SD (currently only 'cheribsd')
        #[arg(short, long)]
        target: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommand_names() {
        let cli = Cli::try_parse_from(["cheridemo", "build-sw", "-t", "baremetal", "-j", "4"])
            .expect("parse failed");
        match cli.command {
            Command::BuildSw { target, jobs } => {
                assert_eq!(target.as_deref(), Some("baremetal"));
                assert_eq!(jobs, 4);
            }
            other => panic!("expected build-sw, got {:?}", other),
        }
    }

    #[test]
    fn test_jobs_default() {
        let cli = Cli::try_parse_from(["cheridemo", "build-sdk"]).expect("parse failed");
        match cli.command {
            Command::BuildSdk { jobs } => assert_eq!(jobs, 8),
            other => panic!("expected build-sdk, got {:?}", other),
        }
    }

    #[test]
    fn test_flash_sd_requires_device() {
        assert!(Cli::try_parse_from(["cheridemo", "flash-sd"]).is_err());
    }
}
