use rand::{seq::SliceRandom, Rng};

/// Asserts that a numerical value is in the provided interval `[a,b]` and panics
/// with a helpful message if not
///
/// ### Example
/// ```should_panic
/// # use rl_sweep::assert_interval;
/// let value = 2.0;
/// assert_interval!(value, 0.0, 1.0);
/// ```
/// This will panic with the message "Invalid value for \`value\`. Must be in the interval \[0, 1\]."
#[macro_export]
macro_rules! assert_interval {
    ($var:expr, $a:expr, $b:expr) => {
        assert!(
            $var >= $a && $var <= $b,
            "Invalid value for `{}`. Must be in the interval [{}, {}].",
            stringify!($var),
            $a,
            $b,
        );
    };
}

/// Index of the maximal value, with ties broken uniformly at random among all maximizers
///
/// **Panics** if `values` is empty
pub fn argmax<R: Rng + ?Sized>(values: &[f32], rng: &mut R) -> usize {
    let best = max(values);
    let maximizers = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == best)
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    *maximizers
        .choose(rng)
        .expect("`values` is not empty and contains no NaN")
}

/// Largest value in the slice, or negative infinity if empty
pub fn max(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

/// Check that a stored dense `n_states × n_actions` table holds exactly one entry per pair
pub(crate) fn check_table_len(
    what: &'static str,
    n_states: usize,
    n_actions: usize,
    len: usize,
) -> crate::Result<()> {
    match n_states.checked_mul(n_actions) {
        Some(expected) if expected == len => Ok(()),
        _ => Err(crate::Error::Inconsistent {
            what,
            message: format!("{len} entries for shape ({n_states}, {n_actions})"),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    /// Tolerance used for floating point comparisons in tests
    pub const EPS: f32 = 1e-5;

    pub fn assert_close(a: f32, b: f32, msg: &str) {
        assert!((a - b).abs() < EPS, "{msg}: {a} != {b}");
    }

    #[test]
    fn argmax_single_maximum() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            assert_eq!(argmax(&[0.1, 3.0, -2.0], &mut rng), 1, "unique max always chosen");
        }
    }

    #[test]
    fn argmax_breaks_ties_randomly() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = [1.0, 0.0, 1.0, 1.0];
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[argmax(&values, &mut rng)] = true;
        }
        assert_eq!(seen, [true, false, true, true], "every maximizer and only maximizers chosen");
    }

    #[test]
    #[should_panic]
    fn argmax_empty_panics() {
        argmax(&[], &mut StdRng::seed_from_u64(0));
    }

    #[test]
    #[should_panic(expected = "Must be in the interval")]
    fn assert_interval_rejects() {
        let alpha = 1.5;
        assert_interval!(alpha, 0.0, 1.0);
    }
}
