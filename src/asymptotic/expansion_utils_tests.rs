#[cfg(test)]
mod tests {
    use crate::asymptotic::errors::AsymptoticError;
    use crate::asymptotic::expansion::Expansion;
    use crate::asymptotic::expansion_utils::{
        UpperBound, expansion_upper_bound, round_bterm_coefficients, set_bterm_valid_from,
        simplify_expansion, taylor_with_explicit_error,
    };
    use crate::asymptotic::ring::{AsymptoticRing, RingOptions, asymptotic_ring_with_dependent_variable};
    use crate::asymptotic::terms::{Summand, Term, ValidFrom};
    use crate::symbolic::symbolic_engine::Expr;
    use crate::symbolic::symbolic_simplify::Assumptions;
    use approx::assert_relative_eq;
    use num::{BigInt, BigRational, ToPrimitive};
    use std::collections::BTreeMap;

    fn r(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn bounded_ring(lower: BigRational, upper: BigRational, options: RingOptions) -> AsymptoticRing {
        let (ring, _, _) =
            asymptotic_ring_with_dependent_variable("n^QQ", "k", lower, upper, options).unwrap();
        ring
    }

    fn half_ring() -> AsymptoticRing {
        bounded_ring(r(-1, 2), r(1, 2), RingOptions::default().with_default_prec(4))
    }

    fn plain_ring() -> AsymptoticRing {
        AsymptoticRing::new("n^QQ", RingOptions::default()).unwrap()
    }

    fn parse(ring: &AsymptoticRing, input: &str) -> Expansion {
        ring.parse(input).unwrap()
    }

    fn inverse_geometric(t: Expr) -> Expr {
        Expr::one() / (Expr::one() - t)
    }

    fn only_b_coefficient(expansion: &Expansion) -> Expr {
        let b_terms: Vec<&Term> = expansion
            .terms()
            .filter(|term| matches!(term, Term::B(_)))
            .collect();
        assert_eq!(b_terms.len(), 1, "{}", expansion);
        b_terms[0].coefficient().cloned().unwrap()
    }

    //___________________________________SIMPLIFY____________________________________

    #[test]
    fn test_simplify_splits_dependent_coefficients() {
        let ring = half_ring();
        let o_n = ring.o(&ring.generator()).unwrap();
        let expansion = (&parse(&ring, "(k + 1)*n") + &o_n).unwrap();
        assert_eq!(expansion.len(), 2);
        let simplified = simplify_expansion(&expansion, false).unwrap();
        assert_eq!(simplified.to_string(), "k*n + O(n)");
    }

    #[test]
    fn test_simplify_moves_dependent_variable_into_b_growth() {
        let ring = half_ring();
        let error = ring.b(&parse(&ring, "k/n^2"), 10).unwrap();
        let simplified = simplify_expansion(&error, true).unwrap();
        assert_eq!(simplified.to_string(), "B(n^(-3/2), n >= 10)");
        let kept = simplify_expansion(&error, false).unwrap();
        assert_eq!(kept, error);
    }

    #[test]
    fn test_simplify_without_bounds_is_identity() {
        let ring = plain_ring();
        let expansion = parse(&ring, "3*n + 1/n");
        assert_eq!(simplify_expansion(&expansion, true).unwrap(), expansion);
    }

    //___________________________________ROUNDING____________________________________

    #[test]
    fn test_round_bterm_coefficients() {
        let ring = plain_ring();
        let error = ring.b(&parse(&ring, "27/23*n^(-2)"), 10).unwrap();
        let expansion = (&ring.generator() + &error).unwrap();
        let rounded = round_bterm_coefficients(&expansion, 3).unwrap();
        assert_eq!(rounded.to_string(), "n + B(587/500*n^(-2), n >= 10)");
        assert_eq!(round_bterm_coefficients(&rounded, 3).unwrap(), rounded);
        // the input stays as it was
        assert_eq!(expansion.to_string(), "n + B(27/23*n^(-2), n >= 10)");
    }

    #[test]
    fn test_round_per_power_of_dependent_variable() {
        let ring = half_ring();
        let error = ring.b(&parse(&ring, "1/3*k^2/n + 1/(7*n)"), 10).unwrap();
        let rounded = round_bterm_coefficients(&error, 1).unwrap();
        let expected = Expr::parse_expression("2/5*k^2 + 1/5")
            .unwrap()
            .simplify_with(&Assumptions::positive("k"))
            .unwrap();
        assert_eq!(only_b_coefficient(&rounded), expected);
        assert_eq!(round_bterm_coefficients(&rounded, 1).unwrap(), rounded);
    }

    //___________________________________THRESHOLDS____________________________________

    #[test]
    fn test_set_bterm_valid_from() {
        let ring = plain_ring();
        let n = ring.generator();
        let mut t = (&parse(&ring, "1/n") - &ring.b(&parse(&ring, "n^(-3)"), 5).unwrap()).unwrap();
        assert_eq!(t.to_string(), "n^(-1) + B(n^(-3), n >= 5)");

        let bound = expansion_upper_bound(&t, true, None).unwrap().numeric().unwrap();
        assert_eq!(bound.to_rational().unwrap(), Some(r(26, 125)));

        let unrelated = BTreeMap::from([("z".to_string(), 42u64)]);
        set_bterm_valid_from(&mut t, unrelated);
        assert_eq!(t.to_string(), "n^(-1) + B(n^(-3), n >= 5)");

        let by_name = BTreeMap::from([("n".to_string(), 42u64)]);
        set_bterm_valid_from(&mut t, by_name);
        assert_eq!(t.to_string(), "n^(-1) + B(n^(-3), n >= 42)");

        set_bterm_valid_from(&mut t, ValidFrom::per_variable([(&n, 43)]).unwrap());
        assert_eq!(t.to_string(), "n^(-1) + B(n^(-3), n >= 43)");

        set_bterm_valid_from(&mut t, 10);
        assert_eq!(t.to_string(), "n^(-1) + B(n^(-3), n >= 43)");
    }

    #[test]
    fn test_set_bterm_valid_from_is_order_independent() {
        let ring = plain_ring();
        let error = ring.b(&parse(&ring, "n^(-2)"), 7).unwrap();
        let mut first = error.clone();
        set_bterm_valid_from(&mut first, 20);
        set_bterm_valid_from(&mut first, 12);
        let mut second = error.clone();
        set_bterm_valid_from(&mut second, 12);
        set_bterm_valid_from(&mut second, 20);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "B(n^(-2), n >= 20)");
        let mut lowered = error.clone();
        set_bterm_valid_from(&mut lowered, 3);
        assert_eq!(lowered, error);
    }

    #[test]
    fn test_upper_bound_of_lone_b_term_is_sound() {
        let ring = plain_ring();
        let error = ring.b(&parse(&ring, "3/n^2"), 10).unwrap();
        let bound = expansion_upper_bound(&error, true, None).unwrap().numeric().unwrap();
        assert_eq!(bound.to_rational().unwrap(), Some(r(3, 100)));
        let symbolic = expansion_upper_bound(&error, false, None).unwrap().symbolic().unwrap();
        assert_eq!(symbolic.to_string(), "3*n^(-2)");
        // the bound holds from the threshold on
        for n in [10, 11, 50, 1000] {
            let values = BTreeMap::from([("n".to_string(), r(n, 1))]);
            let value = symbolic.subs(&values).unwrap().to_rational().unwrap().unwrap();
            assert!(value <= r(3, 100));
        }
    }

    #[test]
    fn test_set_bterm_valid_from_multivariate() {
        let ring = AsymptoticRing::new("k^QQ * m^QQ", RingOptions::default()).unwrap();
        let first = ring.b(&ring.parse("1/k").unwrap(), 3).unwrap();
        let second = ring.b(&ring.parse("1/m").unwrap(), 10).unwrap();
        let mut sum = (&first + &second).unwrap();
        set_bterm_valid_from(&mut sum, 5);
        assert_eq!(
            sum.to_string(),
            "B(k^(-1), k >= 5, m >= 5) + B(m^(-1), k >= 10, m >= 10)"
        );
    }

    //___________________________________UPPER BOUNDS____________________________________

    #[test]
    fn test_upper_bound_plain_ring() {
        let ring = plain_ring();
        let expansion = (&parse(&ring, "1/n") - &ring.b(&parse(&ring, "n^(-2)"), 10).unwrap()).unwrap();
        let symbolic = expansion_upper_bound(&expansion, false, None)
            .unwrap()
            .symbolic()
            .unwrap();
        assert_eq!(symbolic.to_string(), "n^(-1) + n^(-2)");
        assert!(symbolic.is_exact());
        let numeric = expansion_upper_bound(&expansion, true, None).unwrap();
        assert!(matches!(numeric, UpperBound::Numeric(_)));
        let value = numeric.numeric().unwrap().to_rational().unwrap();
        assert_eq!(value, Some(r(11, 100)));
    }

    #[test]
    fn test_upper_bound_with_dependent_variable() {
        let ring = half_ring();
        let expansion = parse(&ring, "-k/n");
        let symbolic = expansion_upper_bound(&expansion, false, None)
            .unwrap()
            .symbolic()
            .unwrap();
        assert_eq!(symbolic.to_string(), "abs(k)*n^(-1)");

        let numeric = expansion_upper_bound(&expansion, true, Some(10))
            .unwrap()
            .numeric()
            .unwrap();
        assert_eq!(numeric.to_string(), "1/10*10^(1/2)");
        let value = numeric.to_interval().unwrap();
        assert_relative_eq!(value.upper(), 10f64.sqrt() / 10.0, epsilon = 1e-12);

        let error = ring.b(&parse(&ring, "k/n"), 10).unwrap();
        let from_b = expansion_upper_bound(&error, true, None).unwrap().numeric().unwrap();
        assert_eq!(from_b, numeric);
    }

    #[test]
    fn test_upper_bound_errors() {
        let ring = plain_ring();
        let with_o = (&ring.one() + &ring.o(&parse(&ring, "1/n")).unwrap()).unwrap();
        assert!(matches!(
            expansion_upper_bound(&with_o, false, None),
            Err(AsymptoticError::NoSameOrderBound(_))
        ));
        assert!(matches!(
            expansion_upper_bound(&ring.generator(), true, None),
            Err(AsymptoticError::NotBounded(_))
        ));
        assert!(expansion_upper_bound(&ring.generator(), false, None).is_ok());
    }

    //___________________________________TAYLOR____________________________________

    #[test]
    fn test_taylor_geometric_in_dependent_variable() {
        let ring = bounded_ring(r(0, 1), r(1, 2), RingOptions::default());
        let term = parse(&ring, "k/n");
        let expansion =
            taylor_with_explicit_error(inverse_geometric, &term, Some(3), Some(10), true).unwrap();
        assert_eq!(
            expansion.to_string(),
            "1 + k*n^(-1) + k^2*n^(-2) + B(5*k^3*n^(-3), n >= 10)"
        );
    }

    #[test]
    fn test_unrounded_taylor_constant_covers_supremum() {
        // sup of (1 - z)^(-4) over |z| <= 10^(-1/2)
        let ring = bounded_ring(r(0, 1), r(1, 2), RingOptions::default());
        let expansion =
            taylor_with_explicit_error(inverse_geometric, &parse(&ring, "k/n"), Some(3), Some(10), false)
                .unwrap();
        let constant = only_b_coefficient(&expansion)
            .set_variable("k", r(1, 1))
            .simplify()
            .unwrap()
            .as_rational()
            .cloned()
            .unwrap();
        let scale = BigInt::from(10).pow(30u32);
        let root_below = BigRational::new(BigInt::from(10).pow(59u32).sqrt(), scale);
        assert!(&root_below * &root_below <= r(1, 10));
        let supremum_below = (r(1, 1) - root_below).pow(-4);
        assert!(constant >= supremum_below, "{} < {}", constant, supremum_below);
        assert!(constant <= r(5, 1));
        assert!(constant.to_f64().unwrap() - supremum_below.to_f64().unwrap() < 1e-9);
    }

    #[test]
    fn test_taylor_at_expansion_with_b_term() {
        let ring = bounded_ring(r(0, 1), r(1, 2), RingOptions::default());
        let some_expansion = (&parse(&ring, "2/n + 3/n^2")
            + &ring.b(&parse(&ring, "4/n^3"), 10).unwrap())
            .unwrap();
        let expansion =
            taylor_with_explicit_error(inverse_geometric, &some_expansion, Some(3), None, false)
                .unwrap();
        assert_eq!(
            expansion.exact_part().unwrap().to_string(),
            "1 + 2*n^(-1) + 7*n^(-2)"
        );
        let Some(Term::B(b)) = expansion.error_part().unwrap().single_term().cloned() else {
            panic!("expected one B-term in {}", expansion);
        };
        assert_eq!(b.threshold_for("n"), Some(10));
        let coefficient = b.coefficient().and_then(Expr::as_rational).cloned().unwrap();
        assert!(coefficient > r(16, 1));

        let rounded = round_bterm_coefficients(&expansion, 0).unwrap();
        let rounded_coefficient = only_b_coefficient(&rounded).as_rational().cloned().unwrap();
        assert!(rounded_coefficient.is_integer());
        assert!(rounded_coefficient >= coefficient);
        assert!(rounded_coefficient.to_f64().unwrap() - coefficient.to_f64().unwrap() < 1.0);
    }

    #[test]
    fn test_taylor_exponential_and_ring_rounding() {
        let term_input = "k/(10*n)";
        let exp = |t: Expr| t.exp();

        let ring = bounded_ring(r(0, 1), r(1, 2), RingOptions::default());
        let expansion =
            taylor_with_explicit_error(exp, &parse(&ring, term_input), Some(3), Some(1000), true)
                .unwrap();
        assert_eq!(
            expansion.to_string(),
            "1 + 1/10*k*n^(-1) + 1/200*k^2*n^(-2) + B(1/1000*k^3*n^(-3), n >= 1000)"
        );

        let rounding = bounded_ring(r(0, 1), r(1, 2), RingOptions::default().with_bterm_round_to(1));
        let expansion = taylor_with_explicit_error(
            exp,
            &parse(&rounding, term_input),
            Some(3),
            Some(1000),
            true,
        )
        .unwrap();
        let expected = Expr::parse_expression("1/10*k^3").unwrap().simplify().unwrap();
        assert_eq!(only_b_coefficient(&expansion), expected);
    }

    #[test]
    fn test_taylor_order_defaults_to_precision() {
        let ring = AsymptoticRing::new("n^QQ", RingOptions::default().with_default_prec(2)).unwrap();
        let expansion =
            taylor_with_explicit_error(inverse_geometric, &parse(&ring, "1/n"), None, Some(3), true)
                .unwrap();
        assert_eq!(expansion.to_string(), "1 + n^(-1) + B(4*n^(-2), n >= 3)");
    }

    #[test]
    fn test_taylor_needs_term_tending_to_zero() {
        let ring = plain_ring();
        assert!(matches!(
            taylor_with_explicit_error(inverse_geometric, &ring.generator(), Some(3), Some(10), true),
            Err(AsymptoticError::NotTendingToZero(_))
        ));
        assert!(matches!(
            taylor_with_explicit_error(inverse_geometric, &ring.one(), Some(3), Some(10), true),
            Err(AsymptoticError::NotTendingToZero(_))
        ));
    }
}
