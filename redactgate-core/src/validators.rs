// File: redactgate-core/src/validators.rs
//! Programmatic validation functions for specific sensitive data types.
//!
//! Regular expressions find candidates; validators decide whether a candidate is real.
//! A rule names its validator by id, and the id is resolved through a
//! [`ValidatorRegistry`] when the rule set is compiled. A failing validator means
//! "not a match": the text is left untouched and nothing is recorded.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

/// A pure predicate over a matched substring.
pub type ValidatorFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

pub const LUHN: &str = "LUHN";
pub const IPV4: &str = "IPV4";
pub const KR_RRN: &str = "KR_RRN";

const RRN_WEIGHTS: [u32; 12] = [2, 3, 4, 5, 6, 7, 8, 9, 2, 3, 4, 5];

/// Maps validator ids to predicates. Ids are case-insensitive.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, ValidatorFn>,
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("ValidatorRegistry").field("ids", &ids).finish()
    }
}

static BUILTINS: Lazy<ValidatorRegistry> = Lazy::new(|| {
    let mut registry = ValidatorRegistry::default();
    registry.register(LUHN, is_valid_luhn);
    registry.register(IPV4, is_valid_ipv4);
    registry.register(KR_RRN, is_valid_kr_rrn);
    registry
});

impl ValidatorRegistry {
    /// A registry holding `LUHN`, `IPV4` and `KR_RRN`.
    pub fn with_builtins() -> Self {
        BUILTINS.clone()
    }

    /// Adds or replaces the validator for `id`.
    pub fn register<F>(&mut self, id: &str, validator: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.validators.insert(id.to_ascii_uppercase(), Arc::new(validator));
    }

    pub fn get(&self, id: &str) -> Option<ValidatorFn> {
        self.validators.get(&id.to_ascii_uppercase()).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.validators.contains_key(&id.to_ascii_uppercase())
    }
}

/// Payment-card checksum over the digits of `candidate`.
///
/// Non-digits are stripped first; 13 to 19 digits are required. Every second digit,
/// counted from the right, is doubled (minus 9 when above 9) and the total must be
/// divisible by 10.
pub fn is_valid_luhn(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let parity = digits.len() % 2;
    let total: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == parity {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    total % 10 == 0
}

/// Dotted-quad IPv4 address with every octet in 0..=255.
pub fn is_valid_ipv4(candidate: &str) -> bool {
    let octets: Vec<&str> = candidate.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|o| {
            !o.is_empty() && o.len() <= 3 && o.chars().all(|c| c.is_ascii_digit()) && o.parse::<u8>().is_ok()
        })
}

/// Korean resident registration number (`YYMMDD-GNNNNNC`) weighted mod-11 check digit.
pub fn is_valid_kr_rrn(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 13 {
        return false;
    }

    let month = digits[2] * 10 + digits[3];
    let day = digits[4] * 10 + digits[5];
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return false;
    }

    let sum: u32 = digits[..12]
        .iter()
        .zip(RRN_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();
    (11 - sum % 11) % 10 == digits[12]
}
