//! Compute resource arithmetic
//!
//! Resource amounts are carried in two forms: `ComputeResources` holds exact
//! quantities following Kubernetes conventions (`100m` = 0.1 cpu, `1Gi` =
//! 2^30 bytes) and is what repositories account leases in;
//! `ComputeResourcesFloat` is the floating-point form all scheduling
//! arithmetic runs over. Missing keys mean zero on both sides.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error parsing a resource quantity string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityParseError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid number in quantity: {0}")]
    InvalidNumber(String),

    #[error("unknown suffix in quantity: {0}")]
    UnknownSuffix(String),

    #[error("quantity has precision below milli-units: {0}")]
    PrecisionTooFine(String),

    #[error("quantity out of range: {0}")]
    Overflow(String),
}

/// An exact resource quantity, stored in milli-units.
///
/// `Quantity::from_str` accepts plain numbers (`"2"`, `"0.5"`), milli
/// notation (`"100m"`), decimal suffixes (`k`, `M`, `G`, `T`) and binary
/// suffixes (`Ki`, `Mi`, `Gi`, `Ti`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Quantity from whole units (e.g. cores, bytes).
    pub fn from_units(units: i64) -> Self {
        Quantity(units * 1000)
    }

    /// Quantity from milli-units (e.g. millicores).
    pub fn from_millis(millis: i64) -> Self {
        Quantity(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn add(&self, other: Quantity) -> Quantity {
        Quantity(self.0 + other.0)
    }

    pub fn sub(&self, other: Quantity) -> Quantity {
        Quantity(self.0 - other.0)
    }

    pub fn max(&self, other: Quantity) -> Quantity {
        Quantity(self.0.max(other.0))
    }
}

/// Multiplier in milli-units for one whole unit of the given suffix.
fn suffix_scale(suffix: &str) -> Option<i128> {
    const KIBI: i128 = 1024;
    Some(match suffix {
        "" => 1000,
        "m" => 1,
        "k" => 1000 * 1000,
        "M" => 1000 * 1_000_000,
        "G" => 1000 * 1_000_000_000,
        "T" => 1000 * 1_000_000_000_000,
        "Ki" => 1000 * KIBI,
        "Mi" => 1000 * KIBI * KIBI,
        "Gi" => 1000 * KIBI * KIBI * KIBI,
        "Ti" => 1000 * KIBI * KIBI * KIBI * KIBI,
        _ => return None,
    })
}

impl FromStr for Quantity {
    type Err = QuantityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(QuantityParseError::Empty);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(s.len());
        let (number, suffix) = s.split_at(split);
        let scale =
            suffix_scale(suffix).ok_or_else(|| QuantityParseError::UnknownSuffix(s.to_string()))?;

        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(QuantityParseError::InvalidNumber(s.to_string()));
        }
        if frac_part.contains('.') || frac_part.len() > 9 {
            return Err(QuantityParseError::InvalidNumber(s.to_string()));
        }

        let int: i128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| QuantityParseError::InvalidNumber(s.to_string()))?
        };
        let frac: i128 = if frac_part.is_empty() {
            0
        } else {
            frac_part
                .parse()
                .map_err(|_| QuantityParseError::InvalidNumber(s.to_string()))?
        };
        let denominator = 10_i128.pow(frac_part.len() as u32);

        // numerator / denominator is the value in whole suffix units.
        let numerator = int
            .checked_mul(denominator)
            .and_then(|n| n.checked_add(frac))
            .ok_or_else(|| QuantityParseError::Overflow(s.to_string()))?;
        let scaled = numerator
            .checked_mul(scale)
            .ok_or_else(|| QuantityParseError::Overflow(s.to_string()))?;
        if scaled % denominator != 0 {
            return Err(QuantityParseError::PrecisionTooFine(s.to_string()));
        }
        let millis = scaled / denominator;
        i64::try_from(millis)
            .map(Quantity)
            .map_err(|_| QuantityParseError::Overflow(s.to_string()))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1000 == 0 {
            write!(f, "{}", self.0 / 1000)
        } else {
            write!(f, "{}m", self.0)
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Exact per-resource quantities, keyed by resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeResources(pub BTreeMap<String, Quantity>);

impl ComputeResources {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build from `(name, quantity)` pairs; panics on malformed quantities,
    /// so intended for configuration defaults and tests.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut resources = BTreeMap::new();
        for (name, quantity) in pairs {
            resources.insert(
                name.to_string(),
                quantity.parse().unwrap_or_else(|e| panic!("{e}")),
            );
        }
        Self(resources)
    }

    pub fn get(&self, resource: &str) -> Quantity {
        self.0.get(resource).copied().unwrap_or(Quantity::ZERO)
    }

    pub fn insert(&mut self, resource: impl Into<String>, quantity: Quantity) {
        self.0.insert(resource.into(), quantity);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Quantity)> {
        self.0.iter()
    }

    pub fn has_negative(&self) -> bool {
        self.0.values().any(|q| q.is_negative())
    }

    /// Element-wise sum; keys missing on either side count as zero.
    pub fn add(&mut self, other: &ComputeResources) {
        for (resource, quantity) in &other.0 {
            let entry = self.0.entry(resource.clone()).or_insert(Quantity::ZERO);
            *entry = entry.add(*quantity);
        }
    }

    /// Element-wise difference; may leave negative entries.
    pub fn sub(&mut self, other: &ComputeResources) {
        for (resource, quantity) in &other.0 {
            let entry = self.0.entry(resource.clone()).or_insert(Quantity::ZERO);
            *entry = entry.sub(*quantity);
        }
    }

    pub fn as_float(&self) -> ComputeResourcesFloat {
        ComputeResourcesFloat(
            self.0
                .iter()
                .map(|(resource, quantity)| (resource.clone(), quantity.as_f64()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Quantity)> for ComputeResources {
    fn from_iter<I: IntoIterator<Item = (String, Quantity)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Floating-point resource map used for all scheduling arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputeResourcesFloat(pub BTreeMap<String, f64>);

impl ComputeResourcesFloat {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, resource: &str) -> f64 {
        self.0.get(resource).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Element-wise sum; keys missing on either side count as zero.
    pub fn add(&mut self, other: &ComputeResourcesFloat) {
        for (resource, value) in &other.0 {
            *self.0.entry(resource.clone()).or_insert(0.0) += value;
        }
    }

    /// Element-wise difference; may leave negative entries, see `is_valid`.
    pub fn sub(&mut self, other: &ComputeResourcesFloat) {
        for (resource, value) in &other.0 {
            *self.0.entry(resource.clone()).or_insert(0.0) -= value;
        }
    }

    /// Scalar multiple of every entry.
    pub fn mul(&self, scalar: f64) -> ComputeResourcesFloat {
        Self(
            self.0
                .iter()
                .map(|(resource, value)| (resource.clone(), value * scalar))
                .collect(),
        )
    }

    /// Element-wise maximum over the union of keys.
    pub fn max(&self, other: &ComputeResourcesFloat) -> ComputeResourcesFloat {
        let mut result = self.clone();
        for (resource, value) in &other.0 {
            let entry = result.0.entry(resource.clone()).or_insert(0.0);
            *entry = entry.max(*value);
        }
        result
    }

    /// Element-wise minimum over the union of keys; missing keys count as
    /// zero.
    pub fn min(&self, other: &ComputeResourcesFloat) -> ComputeResourcesFloat {
        let mut result = ComputeResourcesFloat::new();
        for resource in self.0.keys().chain(other.0.keys()) {
            result
                .0
                .insert(resource.clone(), self.get(resource).min(other.get(resource)));
        }
        result
    }

    /// Cap entries by `limits`. Resources absent from `limits` are
    /// unconstrained.
    pub fn limit_to(&self, limits: &ComputeResourcesFloat) -> ComputeResourcesFloat {
        Self(
            self.0
                .iter()
                .map(|(resource, value)| {
                    let capped = match limits.0.get(resource) {
                        Some(limit) => value.min(*limit),
                        None => *value,
                    };
                    (resource.clone(), capped)
                })
                .collect(),
        )
    }

    /// Clamp negative entries to zero.
    pub fn limit_to_zero(&mut self) {
        for value in self.0.values_mut() {
            if *value < 0.0 {
                *value = 0.0;
            }
        }
    }

    /// True when no entry is negative.
    pub fn is_valid(&self) -> bool {
        self.0.values().all(|value| *value >= 0.0)
    }

    /// True when every entry fits inside `other`; a key missing from `other`
    /// counts as zero there, so a positive request for it does not fit.
    pub fn is_less_or_equal(&self, other: &ComputeResourcesFloat) -> bool {
        self.0
            .iter()
            .all(|(resource, value)| *value <= other.get(resource))
    }

    /// Dominant-resource share: the maximum over resources of
    /// `self[k] / capacity[k] * scarcity[k]`. Resources absent from the
    /// capacity (or with zero capacity) are skipped.
    pub fn dominant_share(
        &self,
        capacity: &ComputeResourcesFloat,
        scarcity: &BTreeMap<String, f64>,
    ) -> f64 {
        let mut share: f64 = 0.0;
        for (resource, value) in &self.0 {
            let total = capacity.get(resource);
            if total <= 0.0 {
                continue;
            }
            let weight = scarcity.get(resource).copied().unwrap_or(0.0);
            share = share.max(value / total * weight);
        }
        share
    }
}
