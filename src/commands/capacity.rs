//! Capacity command - how much a carrier can hold.

use anyhow::Result;
use clap::Args;

use stegkit::{capacity_bytes, Carrier};

use super::{load_config, CarrierArgs, CommandExecutor};

/// Show how large a message a carrier can hide.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    #[command(flatten)]
    pub carrier: CarrierArgs,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self) -> Result<()> {
        let config = load_config()?;
        let carrier = self.carrier.load()?;
        let framing = self.carrier.framing(&config);

        println!("Carrier: {}", carrier.describe());

        match (carrier.capacity_bits(), capacity_bytes(&carrier, framing)) {
            (Some(bits), Some(bytes)) => {
                println!("Capacity: {} bits", bits);
                println!("Max message: {} bytes", bytes);
            }
            _ => {
                println!("Capacity: unlimited");
                println!("Each message byte adds 8 invisible characters.");
            }
        }

        Ok(())
    }
}
