//! Monomial growth: products `n^a * m^b` with rational exponents.
//!
//! `Growth` is ordered by the product order: `a <= b` iff every exponent of `a` is `<=` the
//! matching exponent of `b` (a missing variable has exponent 0). For a single variable this is
//! the usual total order of `n^a`. `GrowthGroup` lists the variables a ring may use and is
//! parsed from strings such as `"n^QQ"` or `"k^QQ * m^QQ"`.
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{all_consuming, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, terminated},
};
use num::{BigRational, One, Signed, Zero};

use crate::asymptotic::errors::AsymptoticError;
use crate::symbolic::symbolic_engine::Expr;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Growth {
    // only nonzero exponents are stored
    exponents: BTreeMap<String, BigRational>,
}

impl Growth {
    /// the growth of constants
    pub fn one() -> Growth {
        Growth::default()
    }

    /// `var^exp`
    pub fn monomial(var: &str, exp: BigRational) -> Growth {
        let mut exponents = BTreeMap::new();
        if !exp.is_zero() {
            exponents.insert(var.to_string(), exp);
        }
        Growth { exponents }
    }

    pub fn is_one(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn exponent(&self, var: &str) -> BigRational {
        self.exponents
            .get(var)
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    /// variables with a nonzero exponent
    pub fn variables(&self) -> impl Iterator<Item = &String> {
        self.exponents.keys()
    }

    fn from_map(map: BTreeMap<String, BigRational>) -> Growth {
        Growth {
            exponents: map.into_iter().filter(|(_, e)| !e.is_zero()).collect(),
        }
    }

    fn combine<F>(&self, other: &Growth, op: F) -> Growth
    where
        F: Fn(&BigRational, &BigRational) -> BigRational,
    {
        let mut map = BTreeMap::new();
        for var in self.exponents.keys().chain(other.exponents.keys()) {
            if !map.contains_key(var) {
                map.insert(var.clone(), op(&self.exponent(var), &other.exponent(var)));
            }
        }
        Growth::from_map(map)
    }

    pub fn mul(&self, other: &Growth) -> Growth {
        self.combine(other, |a, b| a + b)
    }

    pub fn div(&self, other: &Growth) -> Growth {
        self.combine(other, |a, b| a - b)
    }

    pub fn pow(&self, exp: &BigRational) -> Growth {
        Growth::from_map(
            self.exponents
                .iter()
                .map(|(var, e)| (var.clone(), e * exp))
                .collect(),
        )
    }

    pub fn recip(&self) -> Growth {
        Growth::one().div(self)
    }

    /// componentwise maximum, the least growth that is `>=` both
    pub fn join(&self, other: &Growth) -> Growth {
        self.combine(other, |a, b| a.max(b).clone())
    }

    /// componentwise minimum
    pub fn meet(&self, other: &Growth) -> Growth {
        self.combine(other, |a, b| a.min(b).clone())
    }

    /// sum of all exponents
    pub fn degree(&self) -> BigRational {
        self.exponents
            .values()
            .fold(BigRational::zero(), |acc, e| acc + e)
    }

    /// `n^a * m^b` as a symbolic expression
    pub fn to_expr(&self) -> Expr {
        self.exponents
            .iter()
            .map(|(var, e)| {
                let base = Expr::var(var);
                if e.is_one() {
                    base
                } else {
                    base.pow_rational(e.clone())
                }
            })
            .reduce(|acc, factor| acc * factor)
            .unwrap_or_else(Expr::one)
    }

    /// Value of the growth with every variable replaced by a number. The result is simplified,
    /// so radicals like `10^(1/2)` stay exact.
    pub fn evaluate_at(
        &self,
        values: &BTreeMap<String, BigRational>,
    ) -> Result<Expr, AsymptoticError> {
        let mut value = Expr::one();
        for (var, e) in &self.exponents {
            let x = values.get(var).ok_or_else(|| AsymptoticError::MissingThreshold {
                term: self.to_string(),
                variable: var.clone(),
            })?;
            value = value * Expr::Const(x.clone()).pow_rational(e.clone());
        }
        Ok(value.simplify()?)
    }

    /// Total order used to print summands: larger degree first, then the exponent vectors
    /// compared lexicographically.
    pub(crate) fn display_cmp(&self, other: &Growth) -> Ordering {
        other.degree().cmp(&self.degree()).then_with(|| {
            let vars: Vec<&String> = self
                .exponents
                .keys()
                .chain(other.exponents.keys())
                .sorted()
                .dedup()
                .collect();
            vars.iter()
                .map(|var| self.exponent(var).cmp(&other.exponent(var)))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl PartialOrd for Growth {
    fn partial_cmp(&self, other: &Growth) -> Option<Ordering> {
        let mut less = false;
        let mut greater = false;
        for var in self.exponents.keys().chain(other.exponents.keys()) {
            match self.exponent(var).cmp(&other.exponent(var)) {
                Ordering::Less => less = true,
                Ordering::Greater => greater = true,
                Ordering::Equal => {}
            }
        }
        match (less, greater) {
            (false, false) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (true, true) => None,
        }
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_one() {
            return write!(f, "1");
        }
        let factors = self.exponents.iter().map(|(var, e)| {
            if e.is_one() {
                var.clone()
            } else if e.is_integer() && e.is_positive() {
                format!("{}^{}", var, e)
            } else {
                format!("{}^({})", var, e)
            }
        });
        write!(f, "{}", factors.format("*"))
    }
}

/// The variables of an asymptotic ring, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrowthGroup {
    variables: Vec<String>,
}

impl GrowthGroup {
    pub fn new(variables: Vec<String>) -> Result<GrowthGroup, AsymptoticError> {
        if variables.is_empty() {
            return Err(AsymptoticError::Config("empty growth group".to_string()));
        }
        if variables.iter().duplicates().next().is_some() {
            return Err(AsymptoticError::Config(format!(
                "repeated variable in growth group {}",
                variables.join(", ")
            )));
        }
        Ok(GrowthGroup { variables })
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn contains(&self, var: &str) -> bool {
        self.variables.iter().any(|v| v == var)
    }
}

impl fmt::Display for GrowthGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.variables.iter().map(|v| format!("{}^QQ", v)).format(" * ")
        )
    }
}

fn parse_variable(input: &str) -> IResult<&str, &str> {
    let mut parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    parser.parse(input)
}

// factor := name '^' 'QQ'
fn parse_factor(input: &str) -> IResult<&str, &str> {
    let mut parser = terminated(
        delimited(multispace0, parse_variable, multispace0),
        (char('^'), multispace0, tag("QQ"), multispace0),
    );
    parser.parse(input)
}

impl FromStr for GrowthGroup {
    type Err = AsymptoticError;

    /// # Examples
    /// ```
    /// use RustedAsymptotics::asymptotic::growth::GrowthGroup;
    /// let group: GrowthGroup = "k^QQ * m^QQ".parse().unwrap();
    /// assert_eq!(group.variables(), ["k", "m"]);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = all_consuming(separated_list1(char('*'), parse_factor));
        let (_, names) = parser
            .parse(s)
            .map_err(|e| AsymptoticError::Config(format!("could not parse growth group {}: {}", s, e)))?;
        GrowthGroup::new(names.into_iter().map(String::from).collect())
    }
}
