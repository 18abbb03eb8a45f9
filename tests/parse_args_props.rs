use std::collections::BTreeSet;

use kima_showresults::plots::{plot_selection, PlotId};
use kima_showresults::{parse_args, KimaError, ParseOutcome, ParsedArguments};
use proptest::prelude::*;

const KNOWN: [&str; 16] = [
    "rv", "planets", "orbital", "gp", "extra", "pickle", "diagnostic", "--save-plots", "1", "2",
    "3", "4", "5", "6", "7", "all",
];

fn run(tokens: &[String]) -> ParsedArguments {
    match parse_args(tokens).unwrap() {
        ParseOutcome::Run(args) => args,
        other => panic!("expected a run, got {other:?}"),
    }
}

fn known_tokens() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(KNOWN.to_vec()), 0..12)
        .prop_map(|v| v.into_iter().map(str::to_owned).collect())
}

proptest! {
    #[test]
    fn all_sets_every_group_and_no_numbers(
        mut tokens in known_tokens(),
        at in 0usize..12,
        junk in prop::collection::vec("[a-z]{1,6}x", 0..3),
    ) {
        tokens.insert(at.min(tokens.len()), "all".to_string());
        tokens.extend(junk);
        let args = run(&tokens);
        prop_assert!(args.rv && args.planets && args.orbital && args.gp && args.extra);
        prop_assert!(args.plot_number.is_empty());
        prop_assert_eq!(plot_selection(&args), PlotId::ALL.into_iter().collect::<BTreeSet<_>>());
        prop_assert_eq!(args.pickle, tokens.iter().any(|t| t == "pickle"));
        prop_assert_eq!(args.diagnostic, tokens.iter().any(|t| t == "diagnostic"));
    }

    #[test]
    fn repeated_tokens_collapse(tokens in known_tokens()) {
        let doubled: Vec<String> = tokens.iter().chain(tokens.iter()).cloned().collect();
        prop_assert_eq!(run(&doubled), run(&tokens));
    }

    #[test]
    fn order_does_not_matter(tokens in known_tokens()) {
        let mut reversed = tokens.clone();
        reversed.reverse();
        prop_assert_eq!(run(&reversed), run(&tokens));
    }

    #[test]
    fn first_unknown_token_is_reported(
        prefix in known_tokens(),
        unknown in "[a-z]{3,8}x[0-9]?",
        suffix in known_tokens(),
    ) {
        let mut tokens = prefix;
        tokens.push(unknown.clone());
        tokens.push("zzz-later".to_string());
        tokens.extend(suffix);
        match parse_args(&tokens) {
            Err(KimaError::UnrecognizedArgument { token }) => prop_assert_eq!(token, unknown),
            other => prop_assert!(false, "expected an error, got {:?}", other),
        }
    }

    #[test]
    fn help_wins_over_anything(tokens in known_tokens(), junk in "[a-z]{1,6}x") {
        let mut with_help = tokens;
        with_help.push(junk);
        with_help.push("--help".to_string());
        prop_assert_eq!(parse_args(&with_help).unwrap(), ParseOutcome::Help);
    }
}

#[test]
fn numbered_plots_are_selected_individually() {
    let args = run(&["3".to_string(), "6".to_string()]);
    assert_eq!(
        plot_selection(&args),
        [PlotId::Orbital, PlotId::DataSpace].into_iter().collect()
    );
}

#[test]
fn empty_command_line_selects_nothing() {
    let args = run(&Vec::<String>::new());
    assert_eq!(args, ParsedArguments::default());
    assert!(plot_selection(&args).is_empty());
}
