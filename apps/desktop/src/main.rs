use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{SelectedFile, StarPlotClient};
use shared::{domain::StarRecord, protocol::ManualPlotRequest};

const SEPARATOR: &str = "*****************************";

#[derive(Parser, Debug)]
#[command(about = "Plot star charts from the command line")]
struct Args {
    /// Base URL of the star plot server.
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit hand-entered star records.
    Manual {
        /// Star record as "name,x,y,z". Repeat the flag for each star.
        #[arg(long = "star", value_name = "NAME,X,Y,Z")]
        stars: Vec<String>,
        #[arg(long, default_value = "1")]
        line_width: String,
        #[arg(long, default_value = "5")]
        star_size: String,
    },
    /// Upload an image and let the server find the stars.
    Auto {
        /// Path to the image file to scan.
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "1")]
        line_width: String,
        #[arg(long, default_value = "5")]
        star_size: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let client = StarPlotClient::new(args.server_url);
    let response = match args.command {
        Command::Manual {
            stars,
            line_width,
            star_size,
        } => {
            let records = stars
                .iter()
                .map(|raw| parse_star(raw))
                .collect::<Result<Vec<_>>>()?;
            print_entry_listing(&records);
            let request = ManualPlotRequest {
                stars: records,
                line_width,
                star_size,
            };
            client.submit_manual(&request).await?
        }
        Command::Auto {
            file,
            line_width,
            star_size,
        } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            let selected = SelectedFile { file_name, bytes };
            client
                .submit_auto(Some(selected), &line_width, &star_size)
                .await?
        }
    };

    match &response.message {
        Some(message) => println!("{message}"),
        None => println!("Stars plotted successfully!"),
    }
    for star in &response.stars {
        println!("{}: ({}, {}, {})", star.name, star.x, star.y, star.z);
    }
    Ok(())
}

fn parse_star(raw: &str) -> Result<StarRecord> {
    let mut parts = raw.splitn(4, ',');
    let (Some(name), Some(x), Some(y), Some(z)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        anyhow::bail!("star '{raw}' must look like name,x,y,z");
    };
    Ok(StarRecord {
        name: name.trim().to_string(),
        x: x.trim().to_string(),
        y: y.trim().to_string(),
        z: z.trim().to_string(),
    })
}

/// Echo the entered records before submission, a starred block per star.
fn print_entry_listing(stars: &[StarRecord]) {
    println!("{}", stars.len());
    for star in stars {
        println!("{SEPARATOR}");
        println!("Star Name:     {}", star.name);
        println!("Star X-Cords:  {}", star.x);
        println!("Star Y-Cords:  {}", star.y);
        println!("Star Z-Cords:  {}", star.z);
        println!("{SEPARATOR}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_star_splits_name_and_coordinates() {
        let record = parse_star("Sirius, 1, 2.5, 3").expect("parse");
        assert_eq!(record.name, "Sirius");
        assert_eq!(record.x, "1");
        assert_eq!(record.y, "2.5");
        assert_eq!(record.z, "3");
    }

    #[test]
    fn parse_star_rejects_missing_fields() {
        assert!(parse_star("Sirius,1,2").is_err());
    }
}
