// AsInfer: AS-path inference from partial BGP observations
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Candidate AS-paths and their preference order.

use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use crate::topology::RelStore;
use crate::types::{Asn, AsnError, AsRelation};

/// A candidate AS-path, ordered from the near end (front) to the destination (back).
///
/// The trailing `sure_count` elements form the *sure suffix*: they were taken from an observed
/// path and are trusted as-is. Everything in front of the suffix was inferred by prepending one
/// neighbor at a time. The boundary sits at index `len() - sure_count`, which equals [`Path::ulen`].
///
/// A `Path` also tracks how often an equal path has been proposed ([`Path::frequency`]); the
/// counter participates in the preference order, so a stored path must never be mutated in place
/// (see [`PathSet`](crate::pathset::PathSet)).
#[derive(Debug, Clone)]
pub struct Path {
    /// The sequence of AS identifiers, front first.
    sequence: VecDeque<Asn>,
    /// All identifiers currently on the path, for O(1) loop detection.
    loop_set: HashSet<Asn>,
    /// Number of trailing elements that belong to the sure suffix.
    sure_count: usize,
    /// How many times an equal path has been proposed.
    frequency: u32,
    /// Set once a prepend was refused because the element was already on the path.
    have_loop: bool,
}

/// Outcome of a valley-free check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfResult {
    /// The inferred prefix of the path respects the valley-free export rule.
    pub ok: bool,
    /// The walk hit an AS pair with no recorded relationship. Implies `!ok`.
    pub missing_data: bool,
}

/// Walking direction while checking valley-freeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// No up- or downhill segment seen yet.
    Undecided,
    /// Climbing towards providers.
    Up,
    /// Descending towards customers (or past the single peering edge).
    Down,
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self {
            sequence: VecDeque::new(),
            loop_set: HashSet::new(),
            sure_count: 0,
            frequency: 1,
            have_loop: false,
        }
    }

    /// Create a path from a sequence of identifiers (front first). All elements count towards the
    /// sure suffix, exactly as if the path had been parsed from an observed path string.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Asn>,
    {
        let sequence: VecDeque<Asn> = ids.into_iter().map(|x| x.into()).collect();
        let loop_set = sequence.iter().copied().collect();
        Self {
            sure_count: sequence.len(),
            loop_set,
            sequence,
            frequency: 1,
            have_loop: false,
        }
    }

    /// Number of elements on the path.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns `true` if the path holds no elements.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Length of the inferred (uncertain) prefix.
    pub fn ulen(&self) -> usize {
        self.sequence.len() - self.sure_count
    }

    /// Number of trailing elements that came from an observed path.
    pub fn sure_count(&self) -> usize {
        self.sure_count
    }

    /// How many times an equal path has been proposed.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Record one more proposal of this path.
    pub fn incr_frequency(&mut self) {
        self.frequency += 1;
    }

    /// Returns `true` if a prepend was ever refused because of a loop.
    pub fn has_loop(&self) -> bool {
        self.have_loop
    }

    /// The element at the near end, if any.
    pub fn front(&self) -> Option<Asn> {
        self.sequence.front().copied()
    }

    /// Iterate over the elements, front to back.
    pub fn iter(&self) -> impl Iterator<Item = Asn> + '_ {
        self.sequence.iter().copied()
    }

    /// Returns `true` if `x` is on the path.
    pub fn contains(&self, x: Asn) -> bool {
        self.loop_set.contains(&x)
    }

    /// Push `x` onto the front of the path. If `x` is already on the path, the path is left
    /// untouched, the loop flag is raised, and `false` is returned. With `sure`, the new element
    /// extends the sure suffix (the suffix boundary stays glued to the front).
    pub fn prepend(&mut self, x: Asn, sure: bool) -> bool {
        if !self.loop_set.insert(x) {
            self.have_loop = true;
            return false;
        }
        self.sequence.push_front(x);
        if sure {
            self.sure_count += 1;
        }
        true
    }

    /// Check whether the inferred prefix of the path respects the valley-free export rule.
    ///
    /// The walk inspects consecutive pairs `(a, b)` front-to-back and stops at the sure-suffix
    /// boundary; the suffix itself was observed and is not re-verified. A pair without a recorded
    /// relationship aborts the walk with `missing_data` set.
    pub fn check_valley_free(&self, rel: &RelStore) -> VfResult {
        let mut direction = Direction::Undecided;
        for i in 0..self.ulen() {
            let a = self.sequence[i];
            let b = match self.sequence.get(i + 1) {
                Some(b) => *b,
                None => break,
            };
            let relation = match rel.relation(a, b) {
                Some(r) => r,
                None => {
                    return VfResult {
                        ok: false,
                        missing_data: true,
                    }
                }
            };
            match direction {
                Direction::Undecided => match relation {
                    AsRelation::Peer | AsRelation::Customer => direction = Direction::Down,
                    AsRelation::Provider => direction = Direction::Up,
                    AsRelation::Sibling | AsRelation::Unknown => {}
                },
                Direction::Down => match relation {
                    AsRelation::Provider | AsRelation::Peer => {
                        return VfResult {
                            ok: false,
                            missing_data: false,
                        }
                    }
                    _ => {}
                },
                Direction::Up => match relation {
                    AsRelation::Peer | AsRelation::Customer => direction = Direction::Down,
                    _ => {}
                },
            }
        }
        VfResult {
            ok: true,
            missing_data: false,
        }
    }

    /// Format the path, wrapping each element of the inferred prefix in brackets:
    /// `"[23442] 1234 23454 332345"`. This form is read by operators; keep it stable.
    pub fn to_text_uncertain(&self) -> String {
        let ulen = self.ulen();
        self.sequence
            .iter()
            .enumerate()
            .map(|(i, x)| {
                if i < ulen {
                    format!("[{x}]")
                } else {
                    x.to_string()
                }
            })
            .join(" ")
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Path {
    type Err = AsnError;

    /// Parse a textual path. Tokens may be separated by whitespace, commas, brackets, and single
    /// quotes, so both `"1 2 3"` and `"['1', '2', '3']"` parse to the same path. All parsed
    /// elements are sure.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | '[' | ']' | '\''))
            .filter(|t| !t.is_empty())
            .map(Asn::from_str)
            .collect::<Result<Vec<Asn>, AsnError>>()?;
        Ok(Self::from_ids(ids))
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sequence.iter().join(" "))
    }
}

impl Ord for Path {
    /// The preference order used to rank candidate paths, best first:
    /// shorter paths win, then paths with a shorter inferred prefix, then paths proposed more
    /// often (converging proposals are more plausible), then the smaller front identifier.
    fn cmp(&self, other: &Self) -> Ordering {
        match self.sequence.len().cmp(&other.sequence.len()) {
            Ordering::Equal => {}
            o => return o,
        }
        match self.ulen().cmp(&other.ulen()) {
            Ordering::Equal => {}
            o => return o,
        }
        match self.frequency.cmp(&other.frequency) {
            Ordering::Equal => {}
            o => return o.reverse(),
        }
        match (self.sequence.front(), other.sequence.front()) {
            (Some(a), Some(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Two paths are equal when neither ranks before the other. This is deliberately coarser than
/// sequence equality: the ranking only looks at length, uncertainty, frequency, and the front
/// element, and the containers storing paths rely on `Eq` and `Ord` agreeing.
impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Path {}
