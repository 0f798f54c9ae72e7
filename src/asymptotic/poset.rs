//! Summands of an expansion, kept free of mutually absorbing pairs.
//!
//! Every summand is stored with its sort key and dependent growth range. Inserting a summand
//! first lets existing summands absorb it (O-terms first, then B-terms, then exact terms), then
//! lets it absorb existing summands. A merged summand is inserted again until nothing absorbs
//! anymore. The entries are sorted for display: largest bound key first.
use std::cmp::Ordering;

use log::trace;

use crate::asymptotic::errors::AsymptoticError;
use crate::asymptotic::growth::Growth;
use crate::asymptotic::ring::AsymptoticRing;
use crate::asymptotic::term_monoid::TermKind;
use crate::asymptotic::terms::{GrowthRange, Summand, Term, absorbs_ranged};

/// `(bound, raw)`: the largest growth the summand can reach when `k` moves between its bounds,
/// and its own growth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub bound: Growth,
    pub raw: Growth,
}

/// Sort key of a summand. Without a dependent variable in the coefficient both components
/// are the growth of the summand.
pub fn element_key(term: &Term, ring: &AsymptoticRing) -> Result<SortKey, AsymptoticError> {
    let raw = term.growth().clone();
    let bound = match (ring.bounds(), term.coefficient()) {
        (Some(bounds), Some(coefficient)) if bounds.is_mentioned_in(coefficient) => {
            let (at_lower, at_upper) = bounds.boundary_growths(coefficient, ring)?;
            at_lower.join(&at_upper).mul(&raw)
        }
        _ => raw.clone(),
    };
    Ok(SortKey { bound, raw })
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub term: Term,
    pub key: SortKey,
    pub range: GrowthRange,
}

fn kind_rank(kind: TermKind) -> u8 {
    match kind {
        TermKind::Exact => 0,
        TermKind::B => 1,
        TermKind::O => 2,
    }
}

fn display_order(a: &Entry, b: &Entry) -> Ordering {
    b.key
        .bound
        .degree()
        .cmp(&a.key.bound.degree())
        .then_with(|| b.key.raw.degree().cmp(&a.key.raw.degree()))
        .then_with(|| kind_rank(a.term.kind()).cmp(&kind_rank(b.term.kind())))
        .then_with(|| a.key.bound.display_cmp(&b.key.bound))
        .then_with(|| a.key.raw.display_cmp(&b.key.raw))
        .then_with(|| a.term.coefficient().cmp(&b.term.coefficient()))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SummandPoset {
    entries: Vec<Entry>,
}

impl SummandPoset {
    pub fn new() -> SummandPoset {
        SummandPoset::default()
    }

    /// A poset holding one summand with a precomputed key.
    pub(crate) fn singleton(term: Term, key: SortKey, range: GrowthRange) -> SummandPoset {
        SummandPoset {
            entries: vec![Entry { term, key, range }],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.entries.iter().map(|entry| &entry.term)
    }

    /// Terms for in-place changes that keep keys and ranges, e.g. raising thresholds.
    pub(crate) fn terms_mut(&mut self) -> impl Iterator<Item = &mut Term> {
        self.entries.iter_mut().map(|entry| &mut entry.term)
    }

    pub fn first(&self) -> Option<&Entry> {
        self.entries.first()
    }

    fn absorber_of(&self, term: &Term, range: &GrowthRange) -> Option<usize> {
        [TermKind::O, TermKind::B, TermKind::Exact]
            .into_iter()
            .find_map(|kind| {
                self.entries.iter().position(|entry| {
                    entry.term.kind() == kind && absorbs_ranged(&entry.term, &entry.range, term, range)
                })
            })
    }

    /// Adds a summand, merging it with everything that absorbs it or that it absorbs.
    pub fn insert(&mut self, term: Term, ring: &AsymptoticRing) -> Result<(), AsymptoticError> {
        let mut pending = Some(term);
        while let Some(term) = pending.take() {
            if term.is_zero() {
                return Ok(());
            }
            let range = term.dependent_growth_range(ring)?;
            if let Some(index) = self.absorber_of(&term, &range) {
                let existing = self.entries.remove(index);
                trace!("{} absorbs {}", existing.term, term);
                pending = existing.term.absorb(&term, ring)?;
                continue;
            }
            let absorbed = self
                .entries
                .iter()
                .position(|entry| absorbs_ranged(&term, &range, &entry.term, &entry.range));
            if let Some(index) = absorbed {
                let existing = self.entries.remove(index);
                trace!("{} absorbs {}", term, existing.term);
                pending = term.absorb(&existing.term, ring)?;
                continue;
            }
            let key = element_key(&term, ring)?;
            self.entries.push(Entry { term, key, range });
            self.entries.sort_by(display_order);
        }
        Ok(())
    }

    /// Drops entries, keys and ranges of the others stay valid.
    pub(crate) fn retain(&mut self, keep: impl FnMut(&Entry) -> bool) {
        self.entries.retain(keep);
    }
}
