use std::env;
use std::path::PathBuf;

use cell_packer::assembly::{assemble, initial_target};
use cell_packer::config::{CliOverrides, PackerConfig};
use cell_packer::errors::{ConfigError, PackerResult};
use cell_packer::{report, simulator, source, telemetry};

const USAGE: &str = "\
Usage: cell-packer --csv-file <capacities> --series-count <S> \
--max-cell-difference-mah <mAh> --max-pack-difference-mah <mAh> [options]

Options:
  -f, --csv-file <path>                 capacity list, one mAh value per line
  -s, --series-count <n>                packs wired in series
  -c, --max-cell-difference-mah <mAh>   max spread between parallel cells
  -p, --max-pack-difference-mah <mAh>   max spread between series packs
  -t, --capacity-target <mAh>           initial pack target (default: largest pack)
      --max-reported-packs <n>          packs kept in the report (default: series count)
      --max-retries <n>                 give up after this many rejected attempts
      --config <path>                   TOML config file (default: ./cell-packer.toml)
  -v, --verbose                         detailed report and debug logging
      --simulate                        run the randomized self-check instead
      --seed <n> --max-samples <n> --batch-size <n>
  -h, --help

Example: cell-packer -f capacities.txt -s 14 -c 100 -p 2200";

fn main() {
    let args: Vec<String> = env::args().collect();

    if has_flag(&args, &["-h", "--help"]) {
        println!("{}", USAGE);
        std::process::exit(2);
    }

    let verbose = has_flag(&args, &["-v", "--verbose"]);
    telemetry::init_tracing(verbose);

    let outcome = if has_flag(&args, &["--simulate"]) {
        simulate(&args)
    } else {
        run(&args).map(|()| 0)
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {}", err);
            if err.exit_code() == 2 {
                eprintln!("\n{}", USAGE);
            }
            std::process::exit(err.exit_code());
        }
    }
}

fn run(args: &[String]) -> PackerResult<()> {
    let cli = CliOverrides {
        config_file: parse_flag(args, &["--config"], "config")?,
        csv_file: parse_flag(args, &["-f", "--csv-file"], "csv_file")?,
        series_count: parse_flag(args, &["-s", "--series-count"], "series_count")?,
        max_cell_difference_mah: parse_flag(
            args,
            &["-c", "--max-cell-difference-mah"],
            "max_cell_difference_mah",
        )?,
        max_pack_difference_mah: parse_flag(
            args,
            &["-p", "--max-pack-difference-mah"],
            "max_pack_difference_mah",
        )?,
        capacity_target: parse_flag(args, &["-t", "--capacity-target"], "capacity_target")?,
        max_reported_packs: parse_flag(args, &["--max-reported-packs"], "max_reported_packs")?,
        max_retries: parse_flag(args, &["--max-retries"], "max_retries")?,
        verbose: has_flag(args, &["-v", "--verbose"]),
    };

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let resolved = PackerConfig::load(&cwd, Some(&cli))?.resolve()?;
    let capacities = source::load_capacities(&resolved.csv_file)?;

    if resolved.verbose {
        println!("Loaded {} capacities from CSV:", capacities.len());
        println!("{:?}", capacities.as_slice());
    }

    let mut params = resolved.params;
    let target = params
        .capacity_target
        .unwrap_or_else(|| initial_target(&capacities, params.max_pack_differential));
    params.capacity_target = Some(target);
    println!("{}", report::describe_run(&params, target));

    let assembly = assemble(&capacities, &params)?;
    if resolved.verbose {
        println!("{:#}", assembly);
    } else {
        println!("{}", assembly);
    }
    Ok(())
}

/// Seed, sample count and batch size for `--simulate`.
#[derive(Debug, PartialEq, Eq)]
struct SimulationOptions {
    seed: u64,
    max_samples: usize,
    batch_size: usize,
}

fn simulation_options(args: &[String]) -> Result<SimulationOptions, ConfigError> {
    let seed = parse_flag(args, &["--seed"], "seed")?.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    Ok(SimulationOptions {
        seed,
        max_samples: parse_flag(args, &["--max-samples"], "max_samples")?.unwrap_or(1000),
        batch_size: parse_flag(args, &["--batch-size"], "batch_size")?.unwrap_or(64),
    })
}

fn simulate(args: &[String]) -> PackerResult<i32> {
    let SimulationOptions {
        seed,
        max_samples,
        batch_size,
    } = simulation_options(args)?;

    println!("Cell Packer Self-Check");
    println!("======================");
    println!(
        "Packing {} random batches of {} cells (seed: {})",
        max_samples, batch_size, seed
    );
    println!("Checking invariants:");
    for (name, _) in cell_packer::invariants::ALL_INVARIANTS {
        println!("  - {}", name);
    }

    let result = simulator::run_simulation(max_samples, batch_size, seed);
    println!("{}", result);
    Ok(if result.violation.is_some() { 1 } else { 0 })
}

fn has_flag(args: &[String], names: &[&str]) -> bool {
    args.iter().any(|a| names.contains(&a.as_str()))
}

/// Value of the first matching flag, given as `--flag value` or `--flag=value`.
fn parse_flag<T: std::str::FromStr>(
    args: &[String],
    names: &[&str],
    field: &'static str,
) -> Result<Option<T>, ConfigError> {
    for i in 0..args.len() {
        for name in names {
            let raw = if let Some(value) = args[i].strip_prefix(&format!("{}=", name)) {
                Some(value)
            } else if args[i] == *name {
                args.get(i + 1).map(String::as_str)
            } else {
                None
            };
            if let Some(raw) = raw {
                return raw
                    .parse()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidValue {
                        field,
                        message: format!("cannot parse `{}`", raw),
                    });
            }
            if args[i] == *name {
                return Err(ConfigError::Missing { field });
            }
        }
    }
    Ok(None)
}
