//! Regulatory database types.

use crate::error::DbError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitOr, BitOrAssign};

/// Bandwidth assumed when a band omits `@ <MHz>`.
pub const DEFAULT_BANDWIDTH: f64 = 20.0;

/// Regulatory flags attached to a permission.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Flags(u32);

impl Flags {
    pub const NO_CCK: Flags = Flags(1 << 0);
    pub const NO_OFDM: Flags = Flags(1 << 1);
    pub const NO_INDOOR: Flags = Flags(1 << 2);
    pub const NO_OUTDOOR: Flags = Flags(1 << 3);
    pub const DFS: Flags = Flags(1 << 4);
    pub const PTP_ONLY: Flags = Flags(1 << 5);
    pub const PTMP_ONLY: Flags = Flags(1 << 6);

    /// Every flag with the name used in db.txt.
    pub const NAMED: [(&'static str, Flags); 7] = [
        ("NO-CCK", Flags::NO_CCK),
        ("NO-OFDM", Flags::NO_OFDM),
        ("NO-INDOOR", Flags::NO_INDOOR),
        ("NO-OUTDOOR", Flags::NO_OUTDOOR),
        ("DFS", Flags::DFS),
        ("PTP-ONLY", Flags::PTP_ONLY),
        ("PTMP-ONLY", Flags::PTMP_ONLY),
    ];

    pub const fn empty() -> Self {
        Flags(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Look up a single flag by its db.txt name.
    pub fn from_name(name: &str) -> Option<Flags> {
        Self::NAMED
            .iter()
            .find(|(flag_name, _)| *flag_name == name)
            .map(|(_, flag)| *flag)
    }

    /// Combine flag names, failing on the first unknown one.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Flags, DbError> {
        names.iter().try_fold(Flags::empty(), |acc, name| {
            let name = name.as_ref();
            Flags::from_name(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| DbError::Flag(name.to_string()))
        })
    }

    /// Names of the set flags, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(_, flag)| self.contains(*flag))
            .map(|(name, _)| name)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

/// Frequency range in MHz with its maximum channel bandwidth.
///
/// Comments do not take part in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreqBand {
    pub start: f64,
    pub end: f64,
    pub max_bandwidth: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl FreqBand {
    pub fn new(start: f64, end: f64, max_bandwidth: f64) -> Self {
        Self {
            start,
            end,
            max_bandwidth,
            comments: Vec::new(),
        }
    }

    fn key(&self) -> [f64; 3] {
        [self.start, self.end, self.max_bandwidth]
    }
}

/// Power limits: antenna gain in dBi, IR and EIRP in dBm.
///
/// Comments do not take part in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerRestriction {
    pub max_ant_gain: f64,
    pub max_ir: f64,
    pub max_eirp: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl PowerRestriction {
    pub fn new(max_ant_gain: f64, max_ir: f64, max_eirp: f64) -> Self {
        Self {
            max_ant_gain,
            max_ir,
            max_eirp,
            comments: Vec::new(),
        }
    }

    fn key(&self) -> [f64; 3] {
        [self.max_ant_gain, self.max_ir, self.max_eirp]
    }
}

fn cmp_key(a: &[f64; 3], b: &[f64; 3]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn hash_key<H: Hasher>(key: &[f64; 3], state: &mut H) {
    for value in key {
        value.to_bits().hash(state);
    }
}

macro_rules! keyed_ord {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.cmp(other).is_eq()
            }
        }

        impl Eq for $ty {}

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> Ordering {
                cmp_key(&self.key(), &other.key())
            }
        }

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                hash_key(&self.key(), state);
            }
        }
    };
}

keyed_ord!(FreqBand);
keyed_ord!(PowerRestriction);

impl fmt::Display for FreqBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} - {:.3} @ {:.3}",
            self.start, self.end, self.max_bandwidth
        )
    }
}

impl fmt::Display for PowerRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}, {:.2}, {:.2}",
            self.max_ant_gain, self.max_ir, self.max_eirp
        )
    }
}

/// One rule of a country: a band, its power limits and flags.
///
/// Compared by band, power and flag bits; the flag spelling is kept only
/// for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub band: FreqBand,
    pub power: PowerRestriction,
    pub flags: Flags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_flags: Vec<String>,
}

impl Permission {
    pub fn new<S: AsRef<str>>(
        band: FreqBand,
        power: PowerRestriction,
        flag_names: &[S],
    ) -> Result<Self, DbError> {
        let flags = Flags::from_names(flag_names)?;
        Ok(Self {
            band,
            power,
            flags,
            text_flags: flag_names.iter().map(|s| s.as_ref().to_string()).collect(),
        })
    }
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Permission {}

impl PartialOrd for Permission {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Permission {
    fn cmp(&self, other: &Self) -> Ordering {
        self.band
            .cmp(&other.band)
            .then_with(|| self.power.cmp(&other.power))
            .then_with(|| self.flags.cmp(&other.flags))
    }
}

/// Rules for one country, kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
    permissions: Vec<Permission>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Country {
    pub fn new(comments: Vec<String>) -> Self {
        Self {
            permissions: Vec::new(),
            comments,
        }
    }

    /// Insert a permission at its sorted position.
    pub fn add(&mut self, permission: Permission) {
        let at = self.permissions.partition_point(|p| p <= &permission);
        self.permissions.insert(at, permission);
    }

    pub fn contains(&self, permission: &Permission) -> bool {
        self.permissions.binary_search(permission).is_ok()
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}

/// Parsed database keyed by country code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    countries: BTreeMap<String, Country>,
}

impl Database {
    pub fn new(countries: BTreeMap<String, Country>) -> Self {
        Self { countries }
    }

    pub fn country(&self, code: &str) -> Option<&Country> {
        self.countries.get(code)
    }

    /// Countries in code order.
    pub fn countries(&self) -> impl Iterator<Item = (&str, &Country)> {
        self.countries.iter().map(|(code, c)| (code.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
