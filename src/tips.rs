use rand::seq::SliceRandom;
use rand::Rng;

/// Usage tips shown now and then.
pub const TIPS: [&str; 3] = [
    "Use File → Save results… in the plot window to keep the results.",
    "Run 'kima-showresults all' to plot every figure.",
    "Use 'kima-make-full' to combine per-instrument data files into one.",
];

/// Probability of showing a tip on a given run.
const TIP_PROBABILITY: f64 = 0.2;

/// A random tip, one time in five.
pub fn maybe_tip<R: Rng + ?Sized>(rng: &mut R) -> Option<&'static str> {
    if rng.gen::<f64>() < TIP_PROBABILITY {
        TIPS.choose(rng).copied()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tips_appear_about_one_time_in_five() {
        let mut rng = StdRng::seed_from_u64(3);
        let shown = (0..10_000).filter(|_| maybe_tip(&mut rng).is_some()).count();
        assert!((1_700..2_300).contains(&shown), "shown {shown}");
    }

    #[test]
    fn tips_come_from_the_list() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            if let Some(tip) = maybe_tip(&mut rng) {
                assert!(TIPS.contains(&tip));
            }
        }
    }
}
