//! Synthetic identity generation
//!
//! All randomness comes from the rng handed to [`IdentityGenerator`], so
//! tests can seed it and production code can pass `rand::thread_rng()`.

use std::ops::RangeInclusive;

use chrono::{Duration, Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::names::{NameSource, FEMALE_FIRST_NAMES, MALE_FIRST_NAMES};

pub const DEFAULT_PASSWORD_LENGTH: usize = 12;
pub const MIN_PASSWORD_LENGTH: usize = 4;
pub const DEFAULT_MIN_AGE: u32 = 18;
pub const DEFAULT_MAX_AGE: u32 = 65;

/// Birthdays use flat 365-day years.
const DAYS_PER_YEAR: i64 = 365;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!@#$%^&*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

/// Username shapes. Names are lower-cased before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameTemplate {
    /// `firstlast###`
    FirstLast,
    /// `first.last##`
    FirstDotLast,
    /// `flast####`
    InitialLast,
    /// `first##last`
    FirstNumberLast,
    /// `first_last###`
    FirstUnderscoreLast,
}

impl UsernameTemplate {
    pub const ALL: [UsernameTemplate; 5] = [
        UsernameTemplate::FirstLast,
        UsernameTemplate::FirstDotLast,
        UsernameTemplate::InitialLast,
        UsernameTemplate::FirstNumberLast,
        UsernameTemplate::FirstUnderscoreLast,
    ];

    pub fn suffix_range(&self) -> RangeInclusive<u32> {
        match self {
            UsernameTemplate::FirstLast => 10..=999,
            UsernameTemplate::FirstDotLast => 1..=99,
            UsernameTemplate::InitialLast => 100..=9999,
            UsernameTemplate::FirstNumberLast => 1..=99,
            UsernameTemplate::FirstUnderscoreLast => 1..=999,
        }
    }

    pub fn render(&self, first_name: &str, last_name: &str, suffix: u32) -> String {
        let first = first_name.to_lowercase();
        let last = last_name.to_lowercase();
        match self {
            UsernameTemplate::FirstLast => format!("{first}{last}{suffix}"),
            UsernameTemplate::FirstDotLast => format!("{first}.{last}{suffix}"),
            UsernameTemplate::InitialLast => {
                let initial: String = first.chars().take(1).collect();
                format!("{initial}{last}{suffix}")
            }
            UsernameTemplate::FirstNumberLast => format!("{first}{suffix}{last}"),
            UsernameTemplate::FirstUnderscoreLast => format!("{first}_{last}{suffix}"),
        }
    }
}

/// A complete generated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub birthdate: String,
    pub country: String,
    pub username: String,
    pub password: String,
}

pub struct IdentityGenerator<'a, R: Rng + ?Sized> {
    names: &'a NameSource,
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> IdentityGenerator<'a, R> {
    pub fn new(names: &'a NameSource, rng: &'a mut R) -> Self {
        Self { names, rng }
    }

    pub fn first_name(&mut self) -> String {
        pick(self.rng, self.names.first_names()).clone()
    }

    /// First name from one of the built-in gender buckets.
    ///
    /// Loaded name lists carry no gender, so once one has replaced the
    /// built-in first names this draws from the whole active pool.
    pub fn first_name_for(&mut self, gender: Gender) -> String {
        if self.names.has_custom_first_names() {
            return self.first_name();
        }
        let bucket = match gender {
            Gender::Male => MALE_FIRST_NAMES,
            Gender::Female => FEMALE_FIRST_NAMES,
        };
        pick(self.rng, bucket).to_string()
    }

    pub fn last_name(&mut self) -> String {
        pick(self.rng, self.names.last_names()).clone()
    }

    pub fn country(&mut self) -> String {
        pick(self.rng, self.names.countries()).to_string()
    }

    /// Username built from the given names, generating whichever is missing.
    pub fn username(&mut self, first_name: Option<&str>, last_name: Option<&str>) -> String {
        let first = match first_name.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self.first_name(),
        };
        let last = match last_name.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self.last_name(),
        };

        let template = *pick(self.rng, &UsernameTemplate::ALL);
        let suffix = self.rng.gen_range(template.suffix_range());
        template.render(&first, &last, suffix)
    }

    /// Password with at least one lowercase letter, uppercase letter, digit
    /// and symbol from [`SYMBOLS`].
    pub fn password(&mut self, length: usize) -> Result<String, GeneratorError> {
        if length < MIN_PASSWORD_LENGTH {
            return Err(GeneratorError::PasswordTooShort {
                length,
                minimum: MIN_PASSWORD_LENGTH,
            });
        }

        let mut chars: Vec<u8> = Vec::with_capacity(length);
        for class in [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS] {
            chars.push(*pick(self.rng, class));
        }

        let alphabet: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS].concat();
        for _ in MIN_PASSWORD_LENGTH..length {
            chars.push(*pick(self.rng, &alphabet));
        }

        chars.shuffle(self.rng);
        Ok(chars.into_iter().map(char::from).collect())
    }

    /// Birthday for someone aged between `min_age` and `max_age` today.
    pub fn birthday(&mut self, min_age: u32, max_age: u32) -> Result<String, GeneratorError> {
        self.birthday_on(Local::now().date_naive(), min_age, max_age)
    }

    /// Birthday relative to `today`, formatted `YYYY-MM-DD`.
    pub fn birthday_on(
        &mut self,
        today: NaiveDate,
        min_age: u32,
        max_age: u32,
    ) -> Result<String, GeneratorError> {
        let (earliest, latest) = birthday_bounds(today, min_age, max_age)?;
        let span = (latest - earliest).num_days();
        let offset = self.rng.gen_range(0..=span);
        let birthday = earliest + Duration::days(offset);
        Ok(birthday.format("%Y-%m-%d").to_string())
    }

    /// A full identity, generated in the order the creator fills fields.
    pub fn identity(&mut self) -> Result<Identity, GeneratorError> {
        let first_name = self.first_name();
        let last_name = self.last_name();
        let birthdate = self.birthday(DEFAULT_MIN_AGE, DEFAULT_MAX_AGE)?;
        let country = self.country();
        let username = self.username(Some(&first_name), Some(&last_name));
        let password = self.password(DEFAULT_PASSWORD_LENGTH)?;
        Ok(Identity {
            first_name,
            last_name,
            birthdate,
            country,
            username,
            password,
        })
    }
}

/// Earliest and latest birthdays for the age range, using flat 365-day years.
pub fn birthday_bounds(
    today: NaiveDate,
    min_age: u32,
    max_age: u32,
) -> Result<(NaiveDate, NaiveDate), GeneratorError> {
    if min_age > max_age {
        return Err(GeneratorError::InvertedAgeRange { min_age, max_age });
    }
    let years_back = |age: u32| {
        Duration::try_days(i64::from(age) * DAYS_PER_YEAR)
            .and_then(|span| today.checked_sub_signed(span))
            .ok_or(GeneratorError::AgeOutOfRange { age })
    };
    Ok((years_back(max_age)?, years_back(min_age)?))
}

/// Uniform pick from a pool that is never empty.
fn pick<'p, T, R: Rng + ?Sized>(rng: &mut R, pool: &'p [T]) -> &'p T {
    &pool[rng.gen_range(0..pool.len())]
}
