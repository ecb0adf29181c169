//! The Tolerance/Sufficiency Principle.

/// Whether a rule with scope `n` and `e` exceptions is productive:
/// `m > 1`, `m >= n / 2` and `e <= n / ln(n)`, where `m = n - e`.
///
/// Undefined for `n <= 1` and for `e > n`; both report `false`.
pub fn tsp(n: usize, e: usize) -> bool {
    if n <= 1 || e > n {
        return false;
    }
    let m = n - e;
    let n_f = n as f64;
    m > 1 && (m as f64) >= n_f / 2.0 && (e as f64) <= n_f / n_f.ln()
}

/// [`tsp`] stated in terms of the number of correct items `m`.
pub fn tsp_correct(n: usize, m: usize) -> bool {
    m <= n && tsp(n, n - m)
}

#[cfg(test)]
mod tests {
    use super::{tsp, tsp_correct};

    #[test]
    fn threshold_boundaries() {
        assert!(tsp(10, 4));
        assert!(!tsp(10, 5));
        assert!(!tsp(1, 0));
        assert!(tsp(2, 0));
        assert!(!tsp(0, 0));
        assert!(!tsp(3, 4));
    }

    #[test]
    fn exceptionless_rules_are_productive() {
        for n in 2..200 {
            assert!(tsp(n, 0), "n = {}", n);
            assert!(!tsp(n, n), "n = {}", n);
        }
        assert!(!tsp(1, 1));
    }

    #[test]
    fn correct_count_form_agrees() {
        assert!(tsp_correct(9, 8));
        assert!(!tsp_correct(9, 2));
        assert!(!tsp_correct(9, 1));
        assert!(!tsp_correct(3, 5));
    }
}
