#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// errors of ring construction, term arithmetic and post-processing
pub mod errors;
///____________________________________________________________________________________________________________________________
/// # Growth
/// monomials `n^a * m^b` with rational exponents, ordered componentwise, and the growth groups
/// they live in
///# Example
/// ```
/// use RustedAsymptotics::asymptotic::growth::{Growth, GrowthGroup};
/// use num::{BigInt, BigRational};
/// let group: GrowthGroup = "n^QQ".parse().unwrap();
/// assert_eq!(group.variables(), ["n".to_string()]);
/// let g = Growth::monomial("n", BigRational::new(BigInt::from(3), BigInt::from(2)));
/// assert_eq!(g.to_string(), "n^(3/2)");
/// assert!(Growth::one() < g);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod growth;
/// evaluation of symbolic expressions in an algebra: expressions, intervals or expansions
pub mod evaluate;
///________________________________________________________________________________________________________________________________________________
/// term monoids: the kind of a term together with the bounds `lower <= k <= upper` of the
/// dependent variable
pub mod term_monoid;
///________________________________________________________________________________________________________________________________________________
/// # Terms
/// exact terms `c*g`, O-terms `O(g)` and B-terms `B(c*g, n >= N)` whose coefficients may contain the
/// dependent variable
///# Example
/// ```
/// use RustedAsymptotics::asymptotic::ring::{RingOptions, asymptotic_ring_with_dependent_variable};
/// use num::{BigInt, BigRational};
/// let half = BigRational::new(BigInt::from(1), BigInt::from(2));
/// let (ring, _n, _k) =
///     asymptotic_ring_with_dependent_variable("n^QQ", "k", -half.clone(), half, RingOptions::default())
///         .unwrap();
/// // k^6 reaches n^3 at the upper bound
/// let error = ring.o(&ring.parse("k^6").unwrap()).unwrap();
/// assert_eq!(error.to_string(), "O(n^3)");
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod terms;
/// summands of an expansion, merged on insertion
pub mod poset;
///________________________________________________________________________________________________________________________________________________
/// # Rings
/// `AsymptoticRing` and the factory `asymptotic_ring_with_dependent_variable`
///# Example
/// ```
/// use RustedAsymptotics::asymptotic::ring::{RingOptions, asymptotic_ring_with_dependent_variable};
/// use num::{BigInt, BigRational};
/// let half = BigRational::new(BigInt::from(1), BigInt::from(2));
/// let options = RingOptions::default().with_default_prec(4);
/// let (ring, n, k) =
///     asymptotic_ring_with_dependent_variable("n^QQ", "k", -half.clone(), half, options).unwrap();
/// assert_eq!(k.to_string(), "k");
/// assert_eq!(n.to_string(), "n");
/// let x = ring.parse("1/(1 - k/n)").unwrap();
/// assert_eq!(x.to_string(), "1 + k*n^(-1) + k^2*n^(-2) + k^3*n^(-3) + O(n^(-2))");
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod ring;
/// asymptotic expansions and their arithmetic
pub mod expansion;
///______________________________________________________________________________________________________________________________________________
/// post-processing of expansions: distributing coefficients, rounding B-terms, raising
/// thresholds, upper bounds and Taylor expansions with explicit error
/// _____________________________________________________________________________________________________________________________________________
pub mod expansion_utils;
#[cfg(test)]
mod asymptotic_tests;
#[cfg(test)]
mod expansion_utils_tests;
