//! The `kima-showresults` command grammar.
//!
//! ```text
//! kima-showresults [rv] [planets] [orbital] [gp] [extra] [1, ..., 7]
//!                  [all] [pickle] [diagnostic] [--save-plots] [-h/--help] [--version]
//! ```

use std::collections::BTreeSet;

use crate::error::KimaError;
use crate::plots::PlotId;

/// Program name as installed; also used to recognise our own argv.
pub const PROGRAM: &str = "kima-showresults";

/// Flags and plot numbers requested on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArguments {
    pub rv: bool,
    pub planets: bool,
    pub orbital: bool,
    pub gp: bool,
    pub extra: bool,
    pub diagnostic: bool,
    pub pickle: bool,
    pub plot_number: BTreeSet<PlotId>,
    pub save_plots: bool,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Run(ParsedArguments),
    Help,
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Rv,
    Planets,
    Orbital,
    Gp,
    Extra,
    All,
    Pickle,
    Diagnostic,
    SavePlots,
    Help,
    Version,
    Plot(PlotId),
}

fn classify(token: &str) -> Option<Token> {
    let t = match token {
        "rv" => Token::Rv,
        "planets" => Token::Planets,
        "orbital" => Token::Orbital,
        "gp" => Token::Gp,
        "extra" => Token::Extra,
        "all" => Token::All,
        "pickle" => Token::Pickle,
        "diagnostic" => Token::Diagnostic,
        "--save-plots" => Token::SavePlots,
        "-h" | "--help" => Token::Help,
        "--version" => Token::Version,
        other => Token::Plot(PlotId::from_token(other)?),
    };
    Some(t)
}

/// Classify every token in one pass.
///
/// Help and version win over everything else, including unknown tokens.
/// `all` turns on every plot group, leaves `plot_number` empty and does not
/// look at the remaining tokens. Otherwise an unknown token is an error naming
/// the first one.
pub fn parse_args<S: AsRef<str>>(tokens: &[S]) -> Result<ParseOutcome, KimaError> {
    let classified: Vec<(&str, Option<Token>)> = tokens
        .iter()
        .map(|t| (t.as_ref(), classify(t.as_ref())))
        .collect();
    let has = |wanted: Token| classified.iter().any(|(_, t)| *t == Some(wanted));

    if has(Token::Help) {
        return Ok(ParseOutcome::Help);
    }
    if has(Token::Version) {
        return Ok(ParseOutcome::Version);
    }

    let save_plots = has(Token::SavePlots);
    let pickle = has(Token::Pickle);
    let diagnostic = has(Token::Diagnostic);

    if has(Token::All) {
        return Ok(ParseOutcome::Run(ParsedArguments {
            rv: true,
            planets: true,
            orbital: true,
            gp: true,
            extra: true,
            diagnostic,
            pickle,
            plot_number: BTreeSet::new(),
            save_plots,
        }));
    }

    if let Some((token, _)) = classified.iter().find(|(_, t)| t.is_none()) {
        return Err(KimaError::UnrecognizedArgument {
            token: (*token).to_string(),
        });
    }

    let plot_number = classified
        .iter()
        .filter_map(|(_, t)| match t {
            Some(Token::Plot(id)) => Some(*id),
            _ => None,
        })
        .collect();

    Ok(ParseOutcome::Run(ParsedArguments {
        rv: has(Token::Rv),
        planets: has(Token::Planets),
        orbital: has(Token::Orbital),
        gp: has(Token::Gp),
        extra: has(Token::Extra),
        diagnostic,
        pickle,
        plot_number,
        save_plots,
    }))
}

/// Tokens for an options string. An empty string means "the process's own
/// arguments" when `argv[0]` is this program, and no arguments otherwise.
pub fn tokens_from_options(options: &str, argv: &[String]) -> Vec<String> {
    if options.trim().is_empty() {
        match argv.split_first() {
            Some((program, rest)) if program.contains(PROGRAM) => rest.to_vec(),
            _ => Vec::new(),
        }
    } else {
        options.split_whitespace().map(str::to_owned).collect()
    }
}

/// `kima <version>`
pub fn version_text() -> String {
    format!("kima {}", env!("CARGO_PKG_VERSION"))
}

const NUMBERED_ARGS_HELP: &str = "\
optional numbered arguments:
  1    - plot the posterior for Np;
  2    - plot the posterior for the orbital periods;
  3    - plot the joint posterior for semi-amplitudes, eccentricities and orbital periods;
  4, 5 - plot the posteriors for the GP hyperparameters (marginal and joint);
  6    - plot random posterior samples in data-space, together with the RV data;
  7    - plot posteriors for the HARPS fiber offset and systematic velocity;
";

const POSITIONAL: [(&str, &str); 9] = [
    ("rv", "Plot posterior realizations of the model over the RV measurements"),
    ("planets", "Plot posterior for number of planets"),
    ("orbital", "Plot posteriors for some of the orbital parameters"),
    ("gp", "Plot posteriors for GP hyperparameters"),
    ("extra", "Plot posteriors for fiber offset, systematic velocity, and extra white noise"),
    ("all", "Show all plots"),
    ("pickle", "Save the results into a file (filename will be prompted)"),
    ("diagnostic", "Show the diagnostic plot of the sampler run"),
    ("--save-plots", "Instead of showing, save the plots as .png files"),
];

/// Usage text; `full` adds the argument descriptions.
pub fn usage(full: bool) -> String {
    let mut u = format!(
        "usage: {PROGRAM} [rv] [planets] [orbital] [gp] [extra] [1, ..., 7]\n\
         {:24}[all] [pickle] [diagnostic] [--save-plots] [-h/--help] [--version]\n\n",
        ""
    );
    if !full {
        return u;
    }
    u.push_str("positional arguments:\n");
    for (name, description) in POSITIONAL {
        u.push_str(&format!("  {name:<12}\t{description}\n"));
    }
    u.push_str(NUMBERED_ARGS_HELP);
    u
}

// ---------------------------------------------------------------------------
// Failures as the user sees them
// ---------------------------------------------------------------------------

/// Output stream of a failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// What the binary prints for a failed run, and its exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub exit_code: u8,
    pub stream: Stream,
    pub message: String,
}

/// Map a failed run onto its message and exit code.
///
/// Usage errors, a missing setup file and post-processing failures are
/// reported on standard output without a chain; anything else goes to
/// standard error with its context.
pub fn failure_report(err: &anyhow::Error) -> FailureReport {
    let (stream, message) = match err.downcast_ref::<KimaError>() {
        Some(e @ KimaError::UnrecognizedArgument { .. }) => {
            (Stream::Stdout, format!("{}error: {e}\n", usage(false)))
        }
        Some(e @ KimaError::MissingSetup { .. }) => (Stream::Stdout, format!("[FATAL] {e}\n")),
        Some(e @ KimaError::Postprocess(_)) => (Stream::Stdout, format!("{e}\n")),
        _ => (Stream::Stderr, format!("Error: {err:#}\n")),
    };
    FailureReport {
        exit_code: 1,
        stream,
        message,
    }
}
