//! `showresults`: from parsed arguments to rendered plots.

use std::path::Path;

use anyhow::{Result, bail};
use rand::Rng;

use crate::cli::ParsedArguments;
use crate::error::KimaError;
use crate::interaction::UserInteraction;
use crate::plots::plot_selection;
use crate::postprocess::Postprocessor;
use crate::results::KimaResults;
use crate::tips::maybe_tip;

/// Prompt shown when the results should be saved.
pub const SAVE_PROMPT: &str = "Filename to save pickle model: ";

/// Post-process the run in `run_dir`, load its results, optionally save
/// them, and show (or save) the requested plots.
///
/// The results are returned once every plot window has been closed.
pub fn showresults<P, U, R>(
    args: &ParsedArguments,
    run_dir: &Path,
    postprocessor: &mut P,
    interaction: &mut U,
    rng: &mut R,
) -> Result<KimaResults>
where
    P: Postprocessor + ?Sized,
    U: UserInteraction + ?Sized,
    R: Rng + ?Sized,
{
    let plots = plot_selection(args);
    log::debug!("Selected plots: {plots:?}");

    let output = postprocessor
        .run(args.diagnostic)
        .map_err(KimaError::Postprocess)?;

    if let Some(tip) = maybe_tip(rng) {
        interaction.notify(&format!("[kima TIP] {tip}"));
    }

    let mut res = KimaResults::load(run_dir, plots, args.save_plots)?;
    res.evidence = Some(output.evidence);
    res.information = Some(output.information);
    res.ess = res.posterior.len();
    res.diagnostic = args.diagnostic;
    res.logx_samples = output.logx_samples;
    log::info!(
        "log(Z) = {:.2}, H = {:.2} nats, ESS = {}",
        output.evidence,
        output.information,
        res.ess
    );

    if args.pickle {
        let name = interaction.prompt_filename(SAVE_PROMPT)?;
        if name.is_empty() {
            bail!("no filename given to save the results");
        }
        res.save(Path::new(&name))?;
    }

    let has_diagnostic = res.diagnostic && !res.logx_samples.is_empty();
    if res.plots.is_empty() && !has_diagnostic {
        return Ok(res);
    }

    if args.save_plots {
        interaction.save_plots(&res)?;
    } else {
        interaction.show_plots(&res)?;
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::plots::PlotId;
    use crate::postprocess::PostprocessOutput;

    struct FailingPostprocessor;

    impl Postprocessor for FailingPostprocessor {
        fn run(&mut self, _diagnostic: bool) -> io::Result<PostprocessOutput> {
            Err(io::Error::new(io::ErrorKind::NotFound, "levels.txt not found"))
        }
    }

    struct Silent;

    impl UserInteraction for Silent {
        fn notify(&mut self, _message: &str) {}
        fn prompt_filename(&mut self, _prompt: &str) -> io::Result<String> {
            Ok(String::new())
        }
        fn show_plots(&mut self, _results: &KimaResults) -> Result<()> {
            panic!("no plots expected");
        }
        fn save_plots(&mut self, _results: &KimaResults) -> Result<()> {
            panic!("no plots expected");
        }
    }

    #[test]
    fn postprocess_failure_is_typed() {
        let args = ParsedArguments {
            plot_number: [PlotId::Np].into_iter().collect(),
            ..ParsedArguments::default()
        };
        let err = showresults(
            &args,
            Path::new("."),
            &mut FailingPostprocessor,
            &mut Silent,
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();
        let kima = err.downcast_ref::<KimaError>().unwrap();
        assert!(matches!(kima, KimaError::Postprocess(_)));
        assert_eq!(kima.to_string(), "levels.txt not found");
    }
}
