// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use std::path::PathBuf;

mod cli;
mod database;
mod error;
mod store;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Parser, Debug)]
struct Args {
    /// Path of the SQLite database, created if missing
    #[arg(long, global = true, env = "COCTAIL_MANAGER_DATABASE")]
    database: Option<PathBuf>,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    commands: cli::Commands,
}

/// This is where the database lives on-disk unless `--database` says otherwise.
/// On Linux it should be like: `~/.local/share/coctail_manager/`
fn data_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or("failed to get user home directory")?;
    let path = dirs.data_dir().join("coctail_manager");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()?;
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let database_path = match args.database {
        Some(path) => path,
        None => data_path()?.join("data.sqlite"),
    };
    let mut conn = database::establish_connection(database_path)?;
    cli::run(&mut conn, args.commands)
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_logging(args.verbose) {
        eprintln!("failed to set up logging: {e}");
    }

    if let Err(e) = run(args) {
        log::debug!("command failed: {e:?}");
        eprintln!("error: {e}");
        std::process::exit(cli::exit_code(&*e));
    }
}

#[test]
fn args() {
    use clap::CommandFactory as _;
    Args::command().debug_assert();

    let args = Args::parse_from([
        "coctail-manager",
        "recipes",
        "set-ingredient",
        "1",
        "2",
        "-1.5",
        "--database",
        "/tmp/x.sqlite",
    ]);
    assert_eq!(args.database, Some(PathBuf::from("/tmp/x.sqlite")));
    assert!(matches!(
        args.commands,
        cli::Commands::Recipes(cli::RecipeCommand::SetIngredient {
            recipe_id: 1,
            ingredient_id: 2,
            amount
        }) if amount == -1.5
    ));
}
