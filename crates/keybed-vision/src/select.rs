// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Best-candidate selection as an order-independent fold.

use std::cmp::Ordering;

use keybed_core::CandidateScore;
use serde::Serialize;

use crate::rectify::RectifiedCandidate;

/// How the evaluated hypotheses were disposed of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionTally {
    /// Rejected by the rectifier as degenerate.
    pub degenerate: usize,
    /// Rectified but judged not to be a keyboard (or never scored).
    pub not_keyboard: usize,
    /// Rectified and given a black-key count.
    pub scored: usize,
}

impl SelectionTally {
    pub fn evaluated(&self) -> usize {
        self.degenerate + self.not_keyboard + self.scored
    }

    fn merge(self, other: Self) -> Self {
        Self {
            degenerate: self.degenerate + other.degenerate,
            not_keyboard: self.not_keyboard + other.not_keyboard,
            scored: self.scored + other.scored,
        }
    }
}

#[derive(Debug, Clone)]
struct Ranked {
    index: usize,
    keys: u32,
    candidate: RectifiedCandidate,
}

impl Ranked {
    /// `Greater` means `self` should be kept over `other`: more black keys
    /// first, then the lower hypothesis index.
    fn rank(&self, other: &Self) -> Ordering {
        self.keys
            .cmp(&other.keys)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Running best-candidate accumulator.
///
/// Only candidates scored [`CandidateScore::BlackKeys`] are eligible. The
/// highest count wins and equal counts go to the earliest hypothesis index,
/// so observing in any order and merging partial selections in any grouping
/// gives the same result as a sequential scan.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    best: Option<Ranked>,
    tally: SelectionTally,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of hypothesis `index`; `None` means it was degenerate.
    pub fn observe(&mut self, index: usize, outcome: Option<RectifiedCandidate>) {
        let Some(candidate) = outcome else {
            self.tally.degenerate += 1;
            return;
        };
        match candidate.score() {
            Some(CandidateScore::BlackKeys(keys)) => {
                self.tally.scored += 1;
                self.offer(Ranked {
                    index,
                    keys,
                    candidate,
                });
            }
            _ => self.tally.not_keyboard += 1,
        }
    }

    /// Combine two partial selections.
    pub fn merge(mut self, other: Self) -> Self {
        self.tally = self.tally.merge(other.tally);
        if let Some(ranked) = other.best {
            self.offer(ranked);
        }
        self
    }

    fn offer(&mut self, challenger: Ranked) {
        let replace = self
            .best
            .as_ref()
            .is_none_or(|current| challenger.rank(current) == Ordering::Greater);
        if replace {
            self.best = Some(challenger);
        }
    }

    pub fn tally(&self) -> SelectionTally {
        self.tally
    }

    /// Hypothesis index and candidate of the current best.
    pub fn best(&self) -> Option<(usize, &RectifiedCandidate)> {
        self.best.as_ref().map(|r| (r.index, &r.candidate))
    }

    pub fn into_best(self) -> Option<RectifiedCandidate> {
        self.best.map(|r| r.candidate)
    }
}

/// Select the best of `(hypothesis index, outcome)` pairs.
pub fn select_best<I>(outcomes: I) -> Option<RectifiedCandidate>
where
    I: IntoIterator<Item = (usize, Option<RectifiedCandidate>)>,
{
    outcomes
        .into_iter()
        .fold(Selection::new(), |mut selection, (index, outcome)| {
            selection.observe(index, outcome);
            selection
        })
        .into_best()
}
