// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid money value")]
    InvalidMoney,
    #[error("negative money value")]
    NegativeMoney,
    #[error("invalid date value")]
    InvalidDate,
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Locale {
    #[default]
    EsCr,
    EsPy,
}

impl Locale {
    pub const ALL: [Self; 2] = [Self::EsCr, Self::EsPy];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EsCr => "es-CR",
            Self::EsPy => "es-PY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub const fn currency_symbol(self) -> &'static str {
        match self {
            Self::EsCr => "₡",
            Self::EsPy => "₲",
        }
    }

    /// Guaraní amounts are shown without fraction digits.
    pub const fn fraction_digits(self) -> u8 {
        match self {
            Self::EsCr => 2,
            Self::EsPy => 0,
        }
    }
}

/// Parses a user-entered amount such as `1.234,50`, `1234.50` or `₡1.234`.
///
/// A comma is always the decimal separator. Without a comma, a single dot
/// followed by exactly three digits is a thousands separator.
pub fn parse_money(input: &str) -> ValidationResult<Money> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(ValidationError::NegativeMoney);
    }
    let clean = trimmed
        .trim_start_matches(['₡', '₲', '$'])
        .replace(' ', "");
    if clean.is_empty() {
        return Err(ValidationError::InvalidMoney);
    }

    let (whole, fraction) = if let Some((whole, fraction)) = clean.split_once(',') {
        (whole.replace('.', ""), fraction.to_owned())
    } else {
        let dots = clean.matches('.').count();
        match clean.split_once('.') {
            Some((whole, fraction)) if dots == 1 && fraction.len() != 3 => {
                (whole.to_owned(), fraction.to_owned())
            }
            _ => (clean.replace('.', ""), String::new()),
        }
    };

    if fraction.len() > 2 {
        return Err(ValidationError::InvalidMoney);
    }
    let units = parse_digits(&whole, !fraction.is_empty())?;
    let mut cents = if fraction.is_empty() {
        0
    } else {
        parse_digits(&fraction, false)?
    };
    if fraction.len() == 1 {
        cents *= 10;
    }

    units
        .checked_mul(100)
        .and_then(|value| value.checked_add(cents))
        .map(Money::from_cents)
        .ok_or(ValidationError::InvalidMoney)
}

pub fn parse_optional_money(input: &str) -> ValidationResult<Option<Money>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_money(input).map(Some)
}

/// Parses a date typed by a user: `YYYY-MM-DD` or `dd/mm/yyyy`.
pub fn parse_input_date(input: &str) -> ValidationResult<Date> {
    let trimmed = input.trim();
    Date::parse(trimmed, &format_description!("[year]-[month]-[day]"))
        .or_else(|_| Date::parse(trimmed, &format_description!("[day]/[month]/[year]")))
        .map_err(|_| ValidationError::InvalidDate)
}

pub fn parse_optional_input_date(input: &str) -> ValidationResult<Option<Date>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_input_date(input).map(Some)
}

/// Parses a date as the backend sends it: `YYYY-MM-DD`, an RFC 3339
/// timestamp, or a naive `YYYY-MM-DDTHH:MM:SS` timestamp.
pub fn parse_wire_date(input: &str) -> Option<Date> {
    let trimmed = input.trim();
    if let Ok(date) = Date::parse(trimmed, &format_description!("[year]-[month]-[day]")) {
        return Some(date);
    }
    if let Ok(timestamp) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(timestamp.date());
    }
    let (day, rest) = (trimmed.get(..10)?, trimmed.get(10..)?);
    if !rest.starts_with(['T', ' ']) {
        return None;
    }
    Date::parse(day, &format_description!("[year]-[month]-[day]")).ok()
}

/// Both supported locales write dates as `dd/mm/yyyy`.
pub fn format_date(value: Option<Date>) -> String {
    value
        .and_then(|date| {
            date.format(&format_description!("[day]/[month]/[year]"))
                .ok()
        })
        .unwrap_or_default()
}

pub fn format_money(amount: Option<Money>, locale: Locale) -> String {
    let cents = amount.unwrap_or(Money::ZERO).cents();
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let symbol = locale.currency_symbol();
    if locale.fraction_digits() == 0 {
        let units = cents / 100 + u64::from(cents % 100 >= 50);
        return format!("{sign}{symbol}{}", group_thousands(units));
    }
    format!(
        "{sign}{symbol}{},{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

fn parse_digits(input: &str, allow_empty: bool) -> ValidationResult<i64> {
    if input.is_empty() {
        if allow_empty {
            return Ok(0);
        }
        return Err(ValidationError::InvalidMoney);
    }
    if !input.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ValidationError::InvalidMoney);
    }
    input
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidMoney)
}
