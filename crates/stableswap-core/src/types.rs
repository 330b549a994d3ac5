//! Core type definitions for the stableswap router

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::errors::TypeError;

/// Raw token amount in the asset's smallest unit.
pub type Amount = u128;

/// Contract address in raw `workchain:hash` form.
///
/// The hash is stored decoded, so `0:ABC...` and `0:abc...` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    workchain: i32,
    hash: [u8; 32],
}

impl Address {
    pub fn new(workchain: i32, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    pub fn workchain(&self) -> i32 {
        self.workchain
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (workchain, hash_hex) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| TypeError::InvalidAddress(format!("missing workchain in '{}'", s)))?;

        let workchain: i32 = workchain
            .parse()
            .map_err(|_| TypeError::InvalidAddress(format!("bad workchain in '{}'", s)))?;

        let bytes = hex::decode(hash_hex)
            .map_err(|e| TypeError::InvalidAddress(format!("bad hash in '{}': {}", s, e)))?;
        let hash: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            TypeError::InvalidAddress(format!("hash must be 32 bytes, got {}", b.len()))
        })?;

        Ok(Self { workchain, hash })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.hash))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A fungible unit: the chain's native coin or a jetton identified by its master address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    Native,
    Jetton(Address),
}

/// Textual form of [`Asset::Native`].
pub const NATIVE_ASSET_ID: &str = "native";

impl Asset {
    pub fn jetton(address: Address) -> Self {
        Self::Jetton(address)
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }
}

impl FromStr for Asset {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(NATIVE_ASSET_ID) {
            return Ok(Self::Native);
        }
        s.parse::<Address>()
            .map(Self::Jetton)
            .map_err(|e| TypeError::InvalidAsset(format!("'{}': {}", s, e)))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str(NATIVE_ASSET_ID),
            Self::Jetton(address) => write!(f, "{}", address),
        }
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An (asset, amount) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub asset: Asset,
    #[serde(with = "amount_serde")]
    pub amount: Amount,
}

impl Allocation {
    pub fn new(asset: Asset, amount: Amount) -> Self {
        Self { asset, amount }
    }
}

/// Return the first asset that appears more than once in `allocations`.
pub fn find_duplicate_asset(allocations: &[Allocation]) -> Option<&Asset> {
    allocations.iter().enumerate().find_map(|(i, a)| {
        allocations[..i]
            .iter()
            .any(|prev| prev.asset == a.asset)
            .then_some(&a.asset)
    })
}

/// Slippage tolerance as an exact fraction in `[0, 1]`.
///
/// Parsed from decimal strings (`"0.005"`) or fractions (`"1/200"`) without
/// going through floating point. Written back in decimal whenever the value
/// has an exact decimal form. Equality is by value, so `1/2 == 2/4`.
#[derive(Debug, Clone, Copy)]
pub struct Slippage {
    numerator: u64,
    denominator: u64,
}

/// Most fractional digits accepted when parsing a decimal tolerance.
const MAX_SLIPPAGE_DECIMALS: usize = 18;

impl Slippage {
    pub const ZERO: Slippage = Slippage {
        numerator: 0,
        denominator: 1,
    };

    pub const FULL: Slippage = Slippage {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self, TypeError> {
        if denominator == 0 {
            return Err(TypeError::InvalidSlippage(
                "denominator must be positive".to_string(),
            ));
        }
        if numerator > denominator {
            return Err(TypeError::InvalidSlippage(format!(
                "{}/{} is above 1",
                numerator, denominator
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Tolerance expressed in basis points (50 = 0.5%).
    pub fn from_bps(bps: u64) -> Result<Self, TypeError> {
        Self::new(bps, 10_000)
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }
}

impl PartialEq for Slippage {
    fn eq(&self, other: &Self) -> bool {
        self.numerator as u128 * other.denominator as u128
            == other.numerator as u128 * self.denominator as u128
    }
}

impl Eq for Slippage {}

impl Hash for Slippage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let divisor = gcd(self.numerator, self.denominator);
        (self.numerator / divisor).hash(state);
        (self.denominator / divisor).hash(state);
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl FromStr for Slippage {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || TypeError::InvalidSlippage(format!("cannot parse '{}'", s));

        if let Some((num, den)) = s.split_once('/') {
            let num = num.trim().parse().map_err(|_| invalid())?;
            let den = den.trim().parse().map_err(|_| invalid())?;
            return Self::new(num, den);
        }

        let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if frac_part.len() > MAX_SLIPPAGE_DECIMALS
            || !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let int_value: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let frac_value: u64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| invalid())?
        };

        let denominator = 10u64.pow(frac_part.len() as u32);
        let numerator = int_value
            .checked_mul(denominator)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(invalid)?;

        Self::new(numerator, denominator)
    }
}

impl fmt::Display for Slippage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Smallest power of ten divisible by the denominator, within the parser's range
        let scale = (0..=MAX_SLIPPAGE_DECIMALS)
            .map(|digits| (digits, 10u64.pow(digits as u32)))
            .find(|(_, power)| power % self.denominator == 0);

        let (digits, power) = match scale {
            Some(scale) => scale,
            None => return write!(f, "{}/{}", self.numerator, self.denominator),
        };

        let scaled = self.numerator * (power / self.denominator);
        let (whole, frac) = (scaled / power, scaled % power);
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let frac = format!("{:0width$}", frac, width = digits);
        write!(f, "{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl Serialize for Slippage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slippage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde helpers for [`Amount`]: written as decimal strings, read from strings or numbers.
pub mod amount_serde {
    use super::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
            StringOrNumber::Number(n) => Ok(Amount::from(n)),
        }
    }

    /// Same rules for optional amounts.
    pub mod option {
        use super::{Amount, StringOrNumber};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            amount: &Option<Amount>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match amount {
                Some(a) => serializer.collect_str(a),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Amount>, D::Error> {
            match Option::<StringOrNumber>::deserialize(deserializer)? {
                Some(StringOrNumber::String(s)) => s
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                Some(StringOrNumber::Number(n)) => Ok(Some(Amount::from(n))),
                None => Ok(None),
            }
        }
    }
}
