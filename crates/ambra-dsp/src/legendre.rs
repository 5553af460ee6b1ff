//! Associated Legendre polynomial generator.
//!
//! Produces the table P_l^m(x) for 0 <= l <= max_degree via the standard
//! recurrences, optionally including the Condon-Shortley phase and
//! negative-order entries. Values are computed in f64; the spherical-harmonic
//! layer rounds once at the end.

/// Generates associated Legendre polynomials (ALP).
pub struct AssociatedLegendrePolynomialsGenerator {
    max_degree: usize,
    condon_shortley_phase: bool,
    compute_negative_order: bool,
}

impl AssociatedLegendrePolynomialsGenerator {
    /// Creates a generator up to `max_degree`. `condon_shortley_phase`
    /// selects whether the (-1)^order phase is kept in the output;
    /// `compute_negative_order` additionally produces negative-order entries.
    pub fn new(max_degree: usize, condon_shortley_phase: bool, compute_negative_order: bool) -> Self {
        Self {
            max_degree,
            condon_shortley_phase,
            compute_negative_order,
        }
    }

    /// Number of polynomials this generator produces.
    pub fn num_values(&self) -> usize {
        let l = self.max_degree;
        if self.compute_negative_order {
            (l + 1) * (l + 1)
        } else {
            (l + 1) * (l + 2) / 2
        }
    }

    /// Index into the output table for (degree, order).
    pub fn index(&self, degree: i32, order: i32) -> usize {
        debug_assert!(degree >= 0 && degree as usize <= self.max_degree);
        if self.compute_negative_order {
            debug_assert!(order.abs() <= degree);
            (degree * degree + degree + order) as usize
        } else {
            debug_assert!((0..=degree).contains(&order));
            (degree * (degree + 1) / 2 + order) as usize
        }
    }

    /// Generates the table of polynomial values at `x`. Requires |x| <= 1.
    pub fn generate(&self, x: f64) -> Vec<f64> {
        assert!(x.abs() <= 1.0);
        let mut values = vec![0.0f64; self.num_values()];
        // The recurrences below carry the Condon-Shortley phase inherently.
        for degree in 0..=self.max_degree as i32 {
            for order in 0..=degree {
                values[self.index(degree, order)] = self.compute_value(degree, order, x, &values);
            }
        }
        if !self.condon_shortley_phase {
            for degree in 0..=self.max_degree as i32 {
                for order in (1..=degree).step_by(2) {
                    values[self.index(degree, order)] = -values[self.index(degree, order)];
                }
            }
        }
        if self.compute_negative_order {
            for degree in 1..=self.max_degree as i32 {
                for order in 1..=degree {
                    // P_l^{-m} = (-1)^m (l - m)! / (l + m)! P_l^m.
                    let mut ratio = 1.0f64;
                    for k in (degree - order + 1)..=(degree + order) {
                        ratio /= k as f64;
                    }
                    let sign = if order % 2 == 0 { 1.0 } else { -1.0 };
                    values[self.index(degree, -order)] =
                        sign * ratio * values[self.index(degree, order)];
                }
            }
        }
        values
    }

    /// Computes one polynomial from already computed lower-degree entries.
    fn compute_value(&self, degree: i32, order: i32, x: f64, values: &[f64]) -> f64 {
        debug_assert!((0..=degree).contains(&order));
        if degree == 0 && order == 0 {
            1.0
        } else if degree == 1 && order == 0 {
            x
        } else if degree == order {
            // P_l^l(x) = (1 - 2l) sqrt(1 - x^2) P_{l-1}^{l-1}(x).
            (1.0 - 2.0 * degree as f64)
                * (1.0 - x * x).sqrt()
                * values[self.index(degree - 1, degree - 1)]
        } else if order == degree - 1 {
            // P_l^{l-1}(x) = (2l - 1) x P_{l-1}^{l-1}(x).
            (2.0 * degree as f64 - 1.0) * x * values[self.index(degree - 1, degree - 1)]
        } else {
            // (l - m) P_l^m(x) = (2l - 1) x P_{l-1}^m(x) - (l + m - 1) P_{l-2}^m(x).
            ((2.0 * degree as f64 - 1.0) * x * values[self.index(degree - 1, order)]
                - (degree + order - 1) as f64 * values[self.index(degree - 2, order)])
                / (degree - order) as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X_VALUES: [f64; 5] = [-1.0, -0.5, 0.0, 0.3, 1.0];

    // Closed forms up to degree 3, with the Condon-Shortley phase.
    fn analytic(degree: i32, order: i32, x: f64) -> f64 {
        let s = (1.0 - x * x).sqrt();
        match (degree, order) {
            (0, 0) => 1.0,
            (1, 0) => x,
            (1, 1) => -s,
            (2, 0) => 0.5 * (3.0 * x * x - 1.0),
            (2, 1) => -3.0 * x * s,
            (2, 2) => 3.0 * (1.0 - x * x),
            (3, 0) => 0.5 * (5.0 * x * x * x - 3.0 * x),
            (3, 1) => -1.5 * (5.0 * x * x - 1.0) * s,
            (3, 2) => 15.0 * x * (1.0 - x * x),
            (3, 3) => -15.0 * s * s * s,
            _ => unreachable!(),
        }
    }

    #[test]
    fn matches_closed_forms_with_phase() {
        let generator = AssociatedLegendrePolynomialsGenerator::new(3, true, false);
        for &x in &X_VALUES {
            let values = generator.generate(x);
            for degree in 0..=3 {
                for order in 0..=degree {
                    let got = values[generator.index(degree, order)];
                    let want = analytic(degree, order, x);
                    assert!(
                        (got - want).abs() < 1e-12,
                        "P_{degree}^{order}({x}): {got} vs {want}"
                    );
                }
            }
        }
    }

    #[test]
    fn phase_removal_flips_odd_orders() {
        let with_phase = AssociatedLegendrePolynomialsGenerator::new(3, true, false);
        let without_phase = AssociatedLegendrePolynomialsGenerator::new(3, false, false);
        let x = 0.3;
        let a = with_phase.generate(x);
        let b = without_phase.generate(x);
        for degree in 0..=3 {
            for order in 0..=degree {
                let sign = if order % 2 == 0 { 1.0 } else { -1.0 };
                let i = with_phase.index(degree, order);
                assert!((a[i] * sign - b[i]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn negative_orders() {
        let generator = AssociatedLegendrePolynomialsGenerator::new(2, true, true);
        let x = 0.25;
        let values = generator.generate(x);
        // P_2^{-1} = -(1/6) P_2^1, P_2^{-2} = (1/24) P_2^2.
        let p21 = values[generator.index(2, 1)];
        let p22 = values[generator.index(2, 2)];
        assert!((values[generator.index(2, -1)] + p21 / 6.0).abs() < 1e-12);
        assert!((values[generator.index(2, -2)] - p22 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn table_size() {
        assert_eq!(
            AssociatedLegendrePolynomialsGenerator::new(3, false, false).num_values(),
            10
        );
        assert_eq!(
            AssociatedLegendrePolynomialsGenerator::new(3, false, true).num_values(),
            16
        );
    }
}
