#[cfg(test)]
mod tests {
    use crate::asymptotic::errors::AsymptoticError;
    use crate::asymptotic::expansion::Expansion;
    use crate::asymptotic::growth::Growth;
    use crate::asymptotic::poset::element_key;
    use crate::asymptotic::ring::{AsymptoticRing, RingOptions, asymptotic_ring_with_dependent_variable};
    use crate::asymptotic::term_monoid::TermKind;
    use crate::asymptotic::terms::{Summand, Term, ValidFrom};
    use crate::symbolic::symbolic_engine::Expr;
    use crate::symbolic::symbolic_simplify::Assumptions;
    use num::{BigInt, BigRational};
    use std::collections::BTreeMap;
    use strum::IntoEnumIterator;

    fn r(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    /// n^QQ with -1/2 <= log_n(k) <= 1/2
    fn half_ring(prec: usize) -> AsymptoticRing {
        let options = RingOptions::default().with_default_prec(prec);
        let (ring, _, _) =
            asymptotic_ring_with_dependent_variable("n^QQ", "k", r(-1, 2), r(1, 2), options).unwrap();
        ring
    }

    fn plain_ring() -> AsymptoticRing {
        AsymptoticRing::new("n^QQ", RingOptions::default()).unwrap()
    }

    fn parse(ring: &AsymptoticRing, input: &str) -> Expansion {
        ring.parse(input).unwrap()
    }

    fn big_o(ring: &AsymptoticRing, input: &str) -> String {
        ring.o(&parse(ring, input)).unwrap().to_string()
    }

    //___________________________________RINGS____________________________________

    #[test]
    fn test_factory_returns_ring_generator_and_variable() {
        let (ring, n, k) = asymptotic_ring_with_dependent_variable(
            "n^QQ",
            "k",
            r(-1, 2),
            r(1, 2),
            RingOptions::default(),
        )
        .unwrap();
        assert_eq!(n.as_generator(), Some("n"));
        assert_eq!(k, Expr::var("k"));
        assert_eq!(ring.dependent_variable(), Some("k"));
        assert_eq!(
            ring.to_string(),
            "Asymptotic Ring <n^QQ> over Symbolic Ring with n^(-1/2) <= k <= n^(1/2)"
        );
        let (variable, lower, upper) = ring.variable_bounds().unwrap();
        assert_eq!(variable, k);
        assert_eq!(lower.to_string(), "n^(-1/2)");
        assert_eq!(upper.to_string(), "n^(1/2)");
    }

    #[test]
    fn test_term_monoids_share_the_bounds() {
        let ring = half_ring(4);
        for kind in TermKind::iter() {
            let monoid = ring.term_monoid(kind);
            assert_eq!(monoid.kind(), kind);
            assert_eq!(monoid.dependent_variable(), Some("k"));
        }
        assert_eq!(
            ring.term_monoid(TermKind::B).to_string(),
            "B-term monoid with n^(-1/2) <= k <= n^(1/2)"
        );
        let plain = plain_ring();
        assert_eq!(plain.term_monoid(TermKind::O).to_string(), "O-term monoid");
        assert!(plain.bounds().is_none());
        assert!(plain.variable_bounds().is_none());
    }

    #[test]
    fn test_factory_errors() {
        let options = RingOptions::default();
        assert!(matches!(
            asymptotic_ring_with_dependent_variable("n^QQ", "n", r(0, 1), r(1, 2), options.clone()),
            Err(AsymptoticError::InvalidDependentVariable(_))
        ));
        assert!(matches!(
            asymptotic_ring_with_dependent_variable("n^QQ", "k + 1", r(0, 1), r(1, 2), options.clone()),
            Err(AsymptoticError::InvalidDependentVariable(_))
        ));
        assert_eq!(
            asymptotic_ring_with_dependent_variable(
                "n^QQ",
                "k",
                None::<BigRational>,
                r(1, 2),
                options.clone()
            )
            .unwrap_err(),
            AsymptoticError::MissingBound("lower".to_string())
        );
        assert_eq!(
            asymptotic_ring_with_dependent_variable(
                "n^QQ",
                "k",
                r(0, 1),
                None::<BigRational>,
                options.clone()
            )
            .unwrap_err(),
            AsymptoticError::MissingBound("upper".to_string())
        );
        assert!(matches!(
            asymptotic_ring_with_dependent_variable("k^QQ * m^QQ", "j", r(0, 1), r(1, 2), options),
            Err(AsymptoticError::Unsupported(_))
        ));
    }

    #[test]
    fn test_rings_compare_by_content() {
        assert_eq!(plain_ring(), plain_ring());
        assert_eq!(half_ring(4), half_ring(4));
        assert_ne!(half_ring(4), half_ring(5));
        assert_ne!(plain_ring(), half_ring(20));
        let x = plain_ring().generator();
        let y = half_ring(4).generator();
        assert_eq!((&x + &y).unwrap_err(), AsymptoticError::IncompatibleRings);
        assert_eq!(
            half_ring(4).o(&x).unwrap_err(),
            AsymptoticError::IncompatibleRings
        );
    }

    #[test]
    fn test_ring_options_from_toml() {
        let options = RingOptions::from_toml_str("[ring]\ndefault_prec = 4\nbterm_round_to = 3\n").unwrap();
        assert_eq!(options, RingOptions::default().with_default_prec(4).with_bterm_round_to(3));
        assert_eq!(RingOptions::from_toml_str("").unwrap(), RingOptions::default());
        assert!(matches!(
            RingOptions::from_toml_str("[ring]\nprecision = 4\n"),
            Err(AsymptoticError::Config(_))
        ));
        assert!(matches!(
            RingOptions::from_toml_str("[ring]\ndefault_prec = 0\n"),
            Err(AsymptoticError::Config(_))
        ));
        assert!(matches!(
            RingOptions::from_toml_str("[ring]\nbterm_round_to = -1\n"),
            Err(AsymptoticError::Config(_))
        ));
        assert!(RingOptions::from_toml_str("[ring\n").is_err());
    }

    //___________________________________O-TERMS____________________________________

    #[test]
    fn test_o_terms_inflate_by_the_bounds() {
        let ring = half_ring(4);
        assert_eq!(big_o(&ring, "k*n"), "O(n^(3/2))");
        assert_eq!(big_o(&ring, "k^6"), "O(n^3)");
        assert_eq!(big_o(&ring, "n/k^2"), "O(n^2)");
        assert_eq!(big_o(&ring, "n/(1 + k^2)"), "O(n)");
        assert_eq!(big_o(&ring, "n"), "O(n)");
    }

    #[test]
    fn test_o_terms_absorb_dependent_summands() {
        let ring = half_ring(4);
        let error = ring.o(&parse(&ring, "k^10/n^4")).unwrap();
        assert_eq!(error.to_string(), "O(n)");
        let sum = (&parse(&ring, "42*n") + &error).unwrap();
        assert_eq!(sum.to_string(), "O(n)");

        let coefficient = parse(&ring, "1 + k + k^2");
        let o_n = ring.o(&ring.generator()).unwrap();
        assert_eq!((&coefficient * &o_n).unwrap().to_string(), "O(n^2)");
    }

    #[test]
    fn test_dependent_summands_stay_apart_from_smaller_o_terms() {
        let ring = half_ring(4);
        let o_n = ring.o(&ring.generator()).unwrap();
        let sum = (&parse(&ring, "k*n") + &o_n).unwrap();
        assert_eq!(sum.to_string(), "k*n + O(n)");
        assert_eq!(sum.len(), 2);

        let o_n2 = ring.o(&parse(&ring, "n^2")).unwrap();
        let sum = (&parse(&ring, "k^3*n") + &o_n2).unwrap();
        assert_eq!(sum.to_string(), "k^3*n + O(n^2)");
    }

    #[test]
    fn test_series_in_dependent_variable() {
        let ring = half_ring(4);
        assert_eq!(
            parse(&ring, "1/(1 - k/n)").to_string(),
            "1 + k*n^(-1) + k^2*n^(-2) + k^3*n^(-3) + O(n^(-2))"
        );
        assert_eq!(
            parse(&ring, "exp(k/n)").to_string(),
            "1 + k*n^(-1) + 1/2*k^2*n^(-2) + 1/6*k^3*n^(-3) + O(n^(-2))"
        );
    }

    #[test]
    fn test_o_term_with_lower_bound_one() {
        let options = RingOptions::default();
        let (ring, _, _) =
            asymptotic_ring_with_dependent_variable("n^QQ", "k", r(0, 1), r(1, 2), options).unwrap();
        assert_eq!(big_o(&ring, "k*n"), "O(n^(3/2))");
    }

    #[test]
    fn test_sort_key_of_coefficient_vanishing_at_a_bound() {
        let (ring, _, _) = asymptotic_ring_with_dependent_variable(
            "n^QQ",
            "k",
            r(0, 1),
            r(1, 2),
            RingOptions::default(),
        )
        .unwrap();
        let expansion = parse(&ring, "(k - 1)*n");
        let term = expansion.single_term().unwrap();
        let n = Growth::monomial("n", r(1, 1));
        let n_three_halves = Growth::monomial("n", r(3, 2));

        // k - 1 vanishes at k = 1 and counts as growth 1 there
        let key = element_key(term, &ring).unwrap();
        assert_eq!(key.bound, n_three_halves);
        assert_eq!(key.raw, n);
        let entry = &expansion.summands().entries()[0];
        assert_eq!(entry.key, key);
        assert_eq!(entry.range, (n.clone(), n_three_halves.clone()));
        assert_eq!(term.dependent_growth_range(&ring).unwrap(), (n, n_three_halves));
    }

    #[test]
    fn test_o_term_absorption_is_growth_monotone() {
        let ring = half_ring(4);
        let o_n = ring.o(&ring.generator()).unwrap();
        let error = o_n.single_term().unwrap();
        for smaller in ["42*n", "n^(1/2)", "k*n^(1/2)", "1/n"] {
            let candidate = parse(&ring, smaller);
            assert!(error.can_absorb(candidate.single_term().unwrap(), &ring).unwrap(), "{}", smaller);
        }
        for larger in ["n^2", "k*n", "k^3"] {
            let candidate = parse(&ring, larger);
            assert!(!error.can_absorb(candidate.single_term().unwrap(), &ring).unwrap(), "{}", larger);
        }
    }

    //___________________________________B-TERMS____________________________________

    #[test]
    fn test_b_terms_merge_in_plain_ring() {
        let ring = plain_ring();
        let first = ring.b(&parse(&ring, "1/n"), 5).unwrap();
        let second = ring.b(&parse(&ring, "n^(-2)"), 10).unwrap();
        let sum = (&first + &second).unwrap();
        assert_eq!(sum.to_string(), "B(11/10*n^(-1), n >= 10)");

        let absorbed = (&ring.b(&parse(&ring, "1/n"), 10).unwrap() + &parse(&ring, "n^(-2)")).unwrap();
        assert_eq!(absorbed.to_string(), "B(11/10*n^(-1), n >= 10)");

        let larger = (&ring.generator() + &ring.b(&parse(&ring, "1/n"), 10).unwrap()).unwrap();
        assert_eq!(larger.to_string(), "n + B(n^(-1), n >= 10)");
    }

    #[test]
    fn test_b_term_coefficients_are_nonnegative() {
        let (ring, _, k) = asymptotic_ring_with_dependent_variable(
            "n^QQ",
            "k",
            r(0, 1),
            r(1, 1),
            RingOptions::default(),
        )
        .unwrap();
        let error = ring.b(&parse(&ring, "k - 1"), 10).unwrap();
        let term = error.single_term().unwrap();
        assert_eq!(term.kind(), TermKind::B);
        let expected = (k + Expr::one()).simplify_with(&Assumptions::positive("k")).unwrap();
        assert_eq!(term.coefficient(), Some(&expected));

        let plain = plain_ring();
        let negative = plain.b(&parse(&plain, "-3/n"), 2).unwrap();
        assert_eq!(negative.to_string(), "B(3*n^(-1), n >= 2)");
    }

    #[test]
    fn test_b_terms_with_different_swing_stay_apart() {
        let ring = half_ring(4);
        let swinging = ring.b(&parse(&ring, "k/n"), 10).unwrap();
        let fixed = ring.b(&parse(&ring, "n^(-2)"), 10).unwrap();
        let sum = (&swinging + &fixed).unwrap();
        assert_eq!(sum.len(), 2);
        let same_swing = ring.b(&parse(&ring, "k/n^2"), 10).unwrap();
        let merged = (&swinging + &same_swing).unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_b_from_o_term_is_rejected() {
        let ring = plain_ring();
        let error = ring.o(&ring.generator()).unwrap();
        assert!(matches!(ring.b(&error, 10), Err(AsymptoticError::Unsupported(_))));
    }

    #[test]
    fn test_b_raises_thresholds_of_b_terms() {
        let ring = plain_ring();
        let error = ring.b(&parse(&ring, "1/n"), 5).unwrap();
        let raised = ring.b(&error, 12).unwrap();
        assert_eq!(raised.to_string(), "B(n^(-1), n >= 12)");
        let kept = ring.b(&raised, 3).unwrap();
        assert_eq!(kept.to_string(), "B(n^(-1), n >= 12)");
    }

    #[test]
    fn test_term_products_follow_kinds() {
        let ring = plain_ring();
        let n = ring.generator();
        let o = ring.o(&parse(&ring, "n^(-2)")).unwrap();
        assert_eq!((&n * &o).unwrap().to_string(), "O(n^(-1))");

        let b = ring.b(&parse(&ring, "n^(-2)"), 10).unwrap();
        let scaled = (&parse(&ring, "-2*n") * &b).unwrap();
        assert_eq!(scaled.to_string(), "B(2*n^(-1), n >= 10)");

        let other = ring.b(&parse(&ring, "1/n"), 5).unwrap();
        assert_eq!((&b * &other).unwrap().to_string(), "B(n^(-3), n >= 10)");
        assert_eq!((&b * &o).unwrap().to_string(), "O(n^(-4))");

        assert_eq!((-&b).unwrap(), b);
    }

    #[test]
    fn test_b_term_without_threshold() {
        let ring = plain_ring();
        let missing = ring.b_term(
            Expr::one(),
            Growth::monomial("n", r(-1, 1)),
            ValidFrom::PerVariable(BTreeMap::new()),
        );
        assert!(matches!(missing, Err(AsymptoticError::MissingThreshold { .. })));
        let constant = ring
            .b_term(Expr::from(2), Growth::one(), ValidFrom::PerVariable(BTreeMap::new()))
            .unwrap();
        assert_eq!(constant.to_string(), "B(2)");
    }

    #[test]
    fn test_multivariate_b_terms() {
        let ring = AsymptoticRing::new("k^QQ * m^QQ", RingOptions::default()).unwrap();
        let error = ring.b(&ring.parse("1/k").unwrap(), 3).unwrap();
        assert_eq!(error.to_string(), "B(k^(-1), k >= 3, m >= 3)");
        let [k, m] = <[Expansion; 2]>::try_from(ring.gens()).unwrap();
        let per_variable = ValidFrom::per_variable([(&k, 4), (&m, 7)]).unwrap();
        let error = ring.b(&ring.parse("1/m").unwrap(), per_variable).unwrap();
        assert_eq!(error.to_string(), "B(m^(-1), k >= 4, m >= 7)");
    }

    #[test]
    fn test_valid_from_keys() {
        let ring = plain_ring();
        let valid_from = ValidFrom::per_variable([(Expr::var("n"), 4)]).unwrap();
        assert_eq!(valid_from.threshold_for("n"), 4);
        assert_eq!(valid_from.threshold_for("m"), 1);
        assert_eq!(ValidFrom::from(9).threshold_for("m"), 9);
        assert!(matches!(
            ValidFrom::per_variable([(ring.one(), 3)]),
            Err(AsymptoticError::Unsupported(_))
        ));
        assert!(ValidFrom::per_variable([(Expr::parse_expression("n + 1").unwrap(), 3)]).is_err());
    }

    #[test]
    fn test_b_term_accessors() {
        let ring = plain_ring();
        let error = ring.b(&parse(&ring, "1/n"), 6).unwrap();
        let Some(Term::B(b)) = error.single_term() else {
            panic!("expected a B-term, got {}", error);
        };
        assert_eq!(b.threshold_for("n"), Some(6));
        assert_eq!(b.threshold_for("m"), None);
        assert_eq!(b.threshold_values().get("n"), Some(&r(6, 1)));
        assert!(!error.is_exact());
        assert!(error.exact_part().unwrap().is_zero());
        assert_eq!(error.error_part().unwrap(), error);
    }
}
