// =============================================================================
// check-dataset — sanity check a try-on data directory
// =============================================================================
//
// Loads the pair list, builds the first sample and pulls the first batch,
// printing the dataset size, batches per pass and every tensor shape.
//
// Usage:
//   cargo run -p check-dataset -- --dataroot data --stage GMM
//   cargo run -p check-dataset -- --stage TOM --shuffle -b 8 -j 4
//   cargo run -p check-dataset -- --config pipeline.json
//
// Log verbosity follows RUST_LOG (default: info).

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use tryon_core::{Error, Result};
use tryon_data::{BatchSequencer, PipelineConfig, SampleBuilder, FIELDS};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    Registry::default().with(filter).with(fmt_layer).init();
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| Error::config(format!("{flag} needs a value")))
}

fn number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T> {
    let raw = value(args, i, flag)?;
    raw.parse()
        .map_err(|_| Error::config(format!("invalid {flag}: '{raw}'")))
}

/// Command-line flags override the JSON config (if any), which overrides
/// the defaults.
fn parse_args(args: &[String]) -> Result<PipelineConfig> {
    let mut cfg = PipelineConfig::default();
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        cfg = PipelineConfig::from_json_file(value(args, pos + 1, "--config")?)?;
    }

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" => i += 1,
            "--dataroot" => {
                i += 1;
                cfg.dataset.dataroot = value(args, i, flag)?.into();
            }
            "--datamode" | "--subset" => {
                i += 1;
                cfg.dataset.subset = value(args, i, flag)?.to_string();
            }
            "--stage" => {
                i += 1;
                cfg.dataset.stage = value(args, i, flag)?.parse()?;
            }
            "--data_list" | "--data-list" => {
                i += 1;
                cfg.dataset.data_list = value(args, i, flag)?.to_string();
            }
            "--fine_width" | "--fine-width" => {
                i += 1;
                cfg.dataset.fine_width = number(args, i, flag)?;
            }
            "--fine_height" | "--fine-height" => {
                i += 1;
                cfg.dataset.fine_height = number(args, i, flag)?;
            }
            "--radius" => {
                i += 1;
                cfg.dataset.radius = number(args, i, flag)?;
            }
            "--grid" => {
                i += 1;
                cfg.dataset.grid_path = value(args, i, flag)?.into();
            }
            "--shuffle" => cfg.loader.shuffle = true,
            "--seed" => {
                i += 1;
                cfg.loader.seed = Some(number(args, i, flag)?);
            }
            "-b" | "--batch-size" => {
                i += 1;
                cfg.loader.batch_size = number(args, i, flag)?;
            }
            "-j" | "--workers" => {
                i += 1;
                cfg.loader.num_workers = number(args, i, flag)?;
            }
            other => return Err(Error::config(format!("unknown argument '{other}'"))),
        }
        i += 1;
    }

    cfg.dataset.validate()?;
    cfg.loader.validate()?;
    Ok(cfg)
}

fn main() -> Result<()> {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    let cfg = parse_args(&args)?;
    info!(stage = %cfg.dataset.stage, root = %cfg.dataset.dataroot.display(), "checking dataset");

    let builder = SampleBuilder::new(cfg.dataset)?;
    let first_item = builder.build(0)?;
    let mut sequencer = BatchSequencer::new(builder, cfg.loader)?;

    println!(
        "Size of the dataset: {:05}, batches per pass: {:04}",
        sequencer.len(),
        sequencer.num_batches()
    );

    println!("first item: {} / {}", first_item.person_name, first_item.garment_name);
    for name in FIELDS {
        match first_item.tensor(name) {
            Some(t) => println!(
                "  {name:<13} {} range [{:.3}, {:.3}]",
                t.shape(),
                t.min_value().unwrap_or(0.0),
                t.max_value().unwrap_or(0.0)
            ),
            None => println!("  {name:<13} -"),
        }
    }

    let first_batch = sequencer.next_batch()?;
    println!("first batch: {} samples", first_batch.len());
    for name in FIELDS {
        match first_batch.get(name) {
            Some(t) => println!("  {name:<13} {}", t.shape()),
            None => println!("  {name:<13} -"),
        }
    }
    Ok(())
}
