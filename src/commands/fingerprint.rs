//! Fingerprint command - display key fingerprints for verification.

use anyhow::Result;
use clap::Args;

use stegkit::crypto::format_fingerprint;

use super::{CommandExecutor, KeyArgs};

/// Display a key's fingerprint for out-of-band verification.
///
/// Both parties run this and compare the output over a phone call or in
/// person, without revealing the key itself.
#[derive(Args, Debug)]
pub struct FingerprintCommand {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Output format: hex, short, art, or all (default: all)
    #[arg(short, long, default_value = "all")]
    pub format: String,
}

impl CommandExecutor for FingerprintCommand {
    fn execute(&self) -> Result<()> {
        let key = self.key.require()?;
        let hash = key.fingerprint();

        match self.format.to_lowercase().as_str() {
            "hex" => self.print_hex(&hash),
            "short" => println!("{}", key.short_fingerprint()),
            "art" => self.print_art(&hash),
            _ => {
                self.print_hex(&hash);
                println!();
                self.print_art(&hash);
            }
        }

        Ok(())
    }
}

impl FingerprintCommand {
    /// Print fingerprint in hex format, split over two lines.
    fn print_hex(&self, hash: &[u8; 32]) {
        let formatted = format_fingerprint(hash);
        let groups: Vec<&str> = formatted.split(':').collect();

        println!("Hex Fingerprint:");
        println!("  {}", groups[..8].join(":"));
        println!("  {}", groups[8..].join(":"));
    }

    /// Print fingerprint as visual ASCII art (similar to SSH randomart).
    fn print_art(&self, hash: &[u8; 32]) {
        const HEIGHT: usize = 9;
        const WIDTH: usize = 17;
        let mut grid = [[0u8; WIDTH]; HEIGHT];

        // Start in the middle
        let mut x = WIDTH / 2;
        let mut y = HEIGHT / 2;

        // Walk the grid two bits at a time
        for byte in hash.iter() {
            for i in 0..4 {
                let step = (byte >> (i * 2)) & 0b11;

                if step & 0b10 == 0 {
                    y = y.saturating_sub(1);
                } else if y < HEIGHT - 1 {
                    y += 1;
                }
                if step & 0b01 == 0 {
                    x = x.saturating_sub(1);
                } else if x < WIDTH - 1 {
                    x += 1;
                }

                if grid[y][x] < 14 {
                    grid[y][x] += 1;
                }
            }
        }

        let start = (HEIGHT / 2, WIDTH / 2);
        let chars = [' ', '.', 'o', '+', '=', '*', 'B', 'O', 'X', '@', '%', '&', '#', '/', '^'];

        println!("Visual Fingerprint:");
        println!("  +{:-<width$}+", "", width = WIDTH);

        for (row_idx, row) in grid.iter().enumerate() {
            let line: String = row
                .iter()
                .enumerate()
                .map(|(col_idx, &cell)| {
                    if (row_idx, col_idx) == start {
                        'S'
                    } else if row_idx == y && col_idx == x {
                        'E'
                    } else {
                        chars[cell as usize]
                    }
                })
                .collect();
            println!("  |{}|", line);
        }

        println!("  +{:-<width$}+", "", width = WIDTH);
    }
}
