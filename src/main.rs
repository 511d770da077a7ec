use pokemoneus_battle::roster::SelectionPolicy;
use pokemoneus_battle::{run, Command, DuelOptions, MatrixCommand};
use std::env;
use std::path::PathBuf;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- [duel] [--config config.json] [--roster roster.json] [--matches N] \
[--seed SEED] [--policy arbitrary|greedy|constrained] [--bot-policy P] [--log-json out.json] [--realtime]\n       \
cargo run --release -- matrix [--config config.json] [--sims-per-cell N] [--roster-size N] [--seed SEED] \
[--output matrix.csv]"
    );
    std::process::exit(1);
}

fn parse_policy(val: Option<String>, flag: &str) -> anyhow::Result<SelectionPolicy> {
    let val = val.ok_or_else(|| {
        anyhow::anyhow!("{flag} requires arbitrary, greedy or constrained")
    })?;
    Ok(val.parse()?)
}

fn parse_duel(mut args: impl Iterator<Item = String>) -> anyhow::Result<DuelOptions> {
    let mut opts = DuelOptions::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                opts.config_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--config requires a path (e.g. --config config.json)")
                })?);
            }
            "--roster" => {
                opts.roster_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--roster requires a path (e.g. --roster roster.json)")
                })?);
            }
            "--matches" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--matches requires a number"))?;
                opts.matches = val.parse()?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                opts.seed = val.parse()?;
            }
            "--policy" => opts.policy = Some(parse_policy(args.next(), "--policy")?),
            "--bot-policy" => opts.bot_policy = parse_policy(args.next(), "--bot-policy")?,
            "--log-json" => {
                opts.log_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--log-json requires a path (e.g. --log-json battles.json)")
                })?);
            }
            "--realtime" => opts.realtime = true,
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }
    Ok(opts)
}

fn parse_matrix(mut args: impl Iterator<Item = String>) -> anyhow::Result<MatrixCommand> {
    let mut opts = MatrixCommand::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                opts.config_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--config requires a path (e.g. --config config.json)")
                })?);
            }
            "--sims-per-cell" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--sims-per-cell requires a number"))?;
                opts.sims_per_cell = val.parse()?;
            }
            "--roster-size" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--roster-size requires a number"))?;
                opts.roster_size = Some(val.parse()?);
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                opts.seed = val.parse()?;
            }
            "--output" => {
                opts.output_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output matrix.csv)")
                })?;
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }
    Ok(opts)
}

fn parse_args() -> anyhow::Result<Command> {
    let mut args = env::args().skip(1).peekable();
    match args.peek().map(String::as_str) {
        Some("matrix") => {
            args.next();
            Ok(Command::Matrix(parse_matrix(args)?))
        }
        Some("duel") => {
            args.next();
            Ok(Command::Duel(parse_duel(args)?))
        }
        _ => Ok(Command::Duel(parse_duel(args)?)),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let command = parse_args()?;
    run(command)
}
