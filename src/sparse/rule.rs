//! Range-based birth/survival rules and their per-count lookup table.

use std::fmt;
use std::str::FromStr;

use crate::error::LifeError;

/// Birth/survival thresholds.
///
/// An alive cell stays alive when its neighbour count lies in
/// `min_survive..=max_survive`; a dead cell becomes alive when its count lies
/// in `min_revive..=max_revive`. A range whose minimum exceeds its maximum is
/// empty.
///
/// [`LifeRule::new`] stores ranges in canonical form: maxima above 8 are
/// clamped and every empty range becomes `1..=0`, so rules that behave the
/// same compare equal and survive a `Display`/`FromStr` round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LifeRule {
    pub min_survive: u8,
    pub max_survive: u8,
    pub min_revive: u8,
    pub max_revive: u8,
}

const EMPTY_RANGE: (u8, u8) = (1, 0);

const fn canonical_range(min: u8, max: u8) -> (u8, u8) {
    let max = if max > 8 { 8 } else { max };
    if min > max { EMPTY_RANGE } else { (min, max) }
}

impl Default for LifeRule {
    fn default() -> Self {
        Self::conway()
    }
}

impl LifeRule {
    pub const fn new(min_survive: u8, max_survive: u8, min_revive: u8, max_revive: u8) -> Self {
        let (min_survive, max_survive) = canonical_range(min_survive, max_survive);
        let (min_revive, max_revive) = canonical_range(min_revive, max_revive);
        Self {
            min_survive,
            max_survive,
            min_revive,
            max_revive,
        }
    }

    /// B3/S23.
    pub const fn conway() -> Self {
        Self::new(2, 3, 3, 3)
    }

    /// B3/S12345.
    pub const fn maze() -> Self {
        Self::new(1, 5, 3, 3)
    }

    /// B3/S012345678.
    pub const fn life_without_death() -> Self {
        Self::new(0, 8, 3, 3)
    }

    #[inline(always)]
    pub fn survives(&self, neighbours: u8) -> bool {
        (self.min_survive..=self.max_survive).contains(&neighbours)
    }

    #[inline(always)]
    pub fn revives(&self, neighbours: u8) -> bool {
        (self.min_revive..=self.max_revive).contains(&neighbours)
    }
}

/// Precomputed outcome for every possible neighbour count.
#[derive(Clone, Copy, Debug)]
pub struct RuleTable {
    survive: [bool; 9],
    revive: [bool; 9],
}

impl RuleTable {
    pub fn new(rule: LifeRule) -> Self {
        let mut survive = [false; 9];
        let mut revive = [false; 9];
        for n in 0u8..=8 {
            survive[n as usize] = rule.survives(n);
            revive[n as usize] = rule.revives(n);
        }
        Self { survive, revive }
    }

    /// Counts above 8 cannot occur on the plane and never survive.
    #[inline(always)]
    pub fn survives(&self, neighbours: u8) -> bool {
        self.survive
            .get(neighbours as usize)
            .copied()
            .unwrap_or(false)
    }

    #[inline(always)]
    pub fn revives(&self, neighbours: u8) -> bool {
        self.revive.get(neighbours as usize).copied().unwrap_or(false)
    }

    /// `false` when no dead cell can ever come alive; revival scanning is skipped.
    #[inline]
    pub fn any_revival(&self) -> bool {
        self.revive.iter().any(|&b| b)
    }
}

fn write_range(f: &mut fmt::Formatter<'_>, min: u8, max: u8) -> fmt::Result {
    for n in min..=max.min(8) {
        write!(f, "{n}")?;
    }
    Ok(())
}

impl fmt::Display for LifeRule {
    /// `B<revive digits>/S<survive digits>`, e.g. `B3/S23`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("B")?;
        write_range(f, self.min_revive, self.max_revive)?;
        f.write_str("/S")?;
        write_range(f, self.min_survive, self.max_survive)
    }
}

/// Parse a digit run into an inclusive range. Empty yields the empty range `1..=0`.
fn parse_range(digits: &str, src: &str) -> Result<(u8, u8), LifeError> {
    if digits.is_empty() {
        return Ok(EMPTY_RANGE);
    }
    let mut counts = Vec::with_capacity(digits.len());
    for ch in digits.chars() {
        match ch.to_digit(10) {
            Some(d) if d <= 8 => counts.push(d as u8),
            _ => {
                return Err(LifeError::InvalidRule(format!(
                    "{src}: neighbour count '{ch}' is not in 0..=8"
                )));
            }
        }
    }
    let contiguous = counts.windows(2).all(|w| w[1] == w[0] + 1);
    if !contiguous {
        return Err(LifeError::InvalidRule(format!(
            "{src}: counts '{digits}' must be one ascending contiguous run"
        )));
    }
    Ok((counts[0], counts[counts.len() - 1]))
}

impl FromStr for LifeRule {
    type Err = LifeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let src = s.trim();
        let (birth, survive) = src
            .split_once('/')
            .ok_or_else(|| LifeError::InvalidRule(format!("{src}: expected B.../S...")))?;

        let birth = birth
            .strip_prefix(['B', 'b'])
            .ok_or_else(|| LifeError::InvalidRule(format!("{src}: missing 'B' section")))?;
        let survive = survive
            .strip_prefix(['S', 's'])
            .ok_or_else(|| LifeError::InvalidRule(format!("{src}: missing 'S' section")))?;

        let (min_revive, max_revive) = parse_range(birth, src)?;
        let (min_survive, max_survive) = parse_range(survive, src)?;
        Ok(Self::new(min_survive, max_survive, min_revive, max_revive))
    }
}
