//! Automation toggle command.

use anyhow::Result;
use std::path::Path;

use crate::cli::{AutomationArgs, AutomationState};

use super::build_stack;

pub async fn run(args: AutomationArgs, config_path: &Path) -> Result<()> {
    let stack = build_stack(config_path)?;

    match args.state {
        AutomationState::On => {
            stack.scheduler.enable(&args.portfolio).await?;
            println!("Automated trading enabled for {}.", args.portfolio);
        }
        AutomationState::Off => {
            stack.scheduler.disable(&args.portfolio).await?;
            println!("Automated trading disabled for {}.", args.portfolio);
        }
    }

    Ok(())
}
