use std::process::ExitCode;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kima_showresults::cli::{self, ParseOutcome, Stream};
use kima_showresults::config::Settings;
use kima_showresults::interaction::ConsoleInteraction;
use kima_showresults::postprocess::CommandPostprocessor;
use kima_showresults::showresults;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = cli::failure_report(&e);
            match report.stream {
                Stream::Stdout => print!("{}", report.message),
                Stream::Stderr => eprint!("{}", report.message),
            }
            ExitCode::from(report.exit_code)
        }
    }
}

fn run() -> Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let tokens = cli::tokens_from_options("", &argv);

    let args = match cli::parse_args(&tokens)? {
        ParseOutcome::Help => {
            print!("{}", cli::usage(true));
            return Ok(());
        }
        ParseOutcome::Version => {
            println!("{}", cli::version_text());
            return Ok(());
        }
        ParseOutcome::Run(args) => args,
    };

    let settings = Settings::from_env()?;
    log::debug!("Settings: {settings:?}");

    let mut postprocessor =
        CommandPostprocessor::from_command_line(&settings.postprocess, settings.run_dir.clone())?;
    let mut interaction = ConsoleInteraction {
        star_mass: settings.star_mass,
        seed: settings.seed,
    };
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    showresults(
        &args,
        &settings.run_dir,
        &mut postprocessor,
        &mut interaction,
        &mut rng,
    )?;
    Ok(())
}
