use clap::{Parser, Subcommand};
use frameprep::config::{self, ProcessingOptions};
use frameprep::geocode::NominatimGeocoder;
use frameprep::pipeline::Pipeline;
use frameprep::progress::ConsoleProgress;
use frameprep::scan;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

/// Crate version on release tags, `dev@<short-hash>` on anything else.
fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GIT_HASH") {
        "" => "dev@unknown",
        // Leaked once, at startup, for clap's 'static version string
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "frameprep")]
#[command(about = "Prepare photo collections for a digital photo frame")]
#[command(long_about = "\
Prepare photo collections for a digital photo frame

Walks a photo directory, resizes each image to the frame's resolution,
overlays a caption with the capture date and place, and writes output images
that respect a hard per-image size budget (JPEG sources are re-encoded at a
fixed quality; other formats keep their encoder defaults).

Directory rules:

  photos/
  ├── config.toml            # Options (optional; 'frameprep gen-config' prints a stock one)
  ├── 2024-summer/           # Subdirectories are walked recursively
  │   ├── beach.jpg
  │   └── sunset.png
  └── private/
      ├── .noframe           # Marker: this subtree never reaches the frame
      └── secret.jpg

Caption resolution (first available wins):
  Date:   EXIF DateTimeOriginal → file modification time
  Place:  GPS tags → reverse geocoding → coordinate string on lookup failure

When more photos are found than max_photos, a uniform random subset is
prepared instead (pass --seed for a reproducible subset).")]
#[command(version = version_string())]
struct Cli {
    /// Source photo directory
    #[arg(long, default_value = "photos", global = true)]
    source: PathBuf,

    /// Output directory for prepared images
    #[arg(long, default_value = "prepared", global = true)]
    output: PathBuf,

    /// Config file path
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → select → resize, caption and write
    Prepare {
        /// Seed for the random subset selection (reproducible runs)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the candidate photos a run would consider
    Scan,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = ProcessingOptions::load_or_default(&cli.config)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&options.log_level),
    )
    .init();

    match cli.command {
        Command::Prepare { seed } => {
            let candidates = scan::scan(&cli.source)?;
            let geocoder = NominatimGeocoder::new()?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut progress = ConsoleProgress::default();
            let summary = Pipeline::new(&options, &geocoder, &mut progress)
                .prepare(candidates, &cli.output, &mut rng)?;
            println!(
                "{} photos prepared in {}, {} skipped",
                summary.prepared.len(),
                cli.output.display(),
                summary.skipped
            );
        }
        Command::Scan => {
            let candidates = scan::scan(&cli.source)?;
            for path in &candidates {
                println!("{}", path.display());
            }
            println!("{} candidate photos", candidates.len());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
