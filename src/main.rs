use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cheridemo::cli::{Cli, Command};
use cheridemo::config::Config;
use cheridemo::models::TargetSpec;
use cheridemo::workspace::Workspace;
use cheridemo::{fpga, git, sdcard, sdk, software};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let workspace = Workspace::discover()?;
    let config = Config::load(&workspace)?;

    match cli.command {
        Command::Clone => git::sync_all(&config, &workspace)?,
        Command::ListConfigs => list_configs(&config),
        Command::ListSw => list_targets(&config),
        Command::BuildSdk { jobs } => sdk::build_sdk(&workspace, jobs)?,
        Command::BuildSw { target, jobs } => {
            software::build_software(&workspace, &config, target.as_deref(), jobs)?
        }
        Command::BuildFpga { config: name, jobs } => {
            fpga::build_bitstream(&workspace, &config, name.as_deref(), jobs)?
        }
        Command::FlashFpga { config: name } => {
            fpga::flash_bitstream(&workspace, &config, name.as_deref())?
        }
        Command::FormatSd { device } => sdcard::format_card(&device)?,
        Command::FlashSd { device, target } => {
            sdcard::write_rootfs(&config, target.as_deref(), &device)?
        }
    }

    Ok(())
}

fn list_configs(config: &Config) {
    println!("{}", "Available CVA6 FPGA configs:".bold());
    for (name, cfg) in config.fpga_configs() {
        let marker = if name == config.fpga_default() {
            " (default)".green().to_string()
        } else {
            String::new()
        };
        println!("  - {}{}", name.cyan(), marker);
        println!("      board: {}", cfg.board);
        println!("      target: {}", cfg.target);
        println!("      desc: {}", cfg.description);
    }
}

fn list_targets(config: &Config) {
    println!("{}", "Available software targets:".bold());
    for (name, spec) in config.targets() {
        let marker = if name == config.target_default() {
            " (default)".green().to_string()
        } else {
            String::new()
        };
        println!("  - {}{}", name.cyan(), marker);
        println!("      kind: {}", spec.kind());
        match spec {
            TargetSpec::Cheribsd(t) => {
                println!("      cheribuild target: {}", t.cheribuild_target)
            }
            TargetSpec::BaoBundle(t) => println!("      bao config: {}", t.bao_config),
            TargetSpec::Baremetal(t) => println!("      repo: {}", t.app_repo),
        }
    }
}
