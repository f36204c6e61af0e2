// parsers.rs
//
// Raw text tokens scraped from the listing index -> typed numbers.
// Every parser fails closed: anything it does not fully understand is a
// `ParseError` carrying the raw text, never a default value.

use crate::errors::{Field, ParseError};

/// Marker the site uses instead of an age for brand-new buildings.
const NEW_BUILD: &str = "新築";

const MAN_YEN: u64 = 10_000;

const AREA_SUFFIXES: [&str; 4] = ["m2", "m²", "㎡", "平米"];
const RANGE_SEPARATORS: [char; 5] = ['-', '~', '〜', '–', '－'];

/// `"築12年"` -> 12, `"築50年以上"` -> 50, `"新築"` -> 0.
pub fn parse_age_years(raw: &str) -> Result<u32, ParseError> {
    let err = || ParseError::new(Field::AgeYears, raw);
    let text = normalize(raw);

    if text == NEW_BUILD {
        return Ok(0);
    }

    let years = text
        .strip_prefix('築')
        .and_then(|s| s.strip_suffix("以上").or(Some(s)))
        .and_then(|s| s.strip_suffix('年'))
        .ok_or_else(err)?;

    parse_digits(years).ok_or_else(err)
}

/// `"3階"` -> 3, `"2-3階"` -> 2, `"B1階"` -> -1, `"B1-2階"` -> -1.
///
/// Ranges yield their first (lowest) floor; every part of the range must
/// still be a valid floor.
pub fn parse_floor(raw: &str) -> Result<i32, ParseError> {
    let err = || ParseError::new(Field::Floor, raw);
    let text = normalize(raw);

    let text = text
        .strip_suffix('階')
        .or_else(|| text.strip_suffix('F'))
        .unwrap_or(text.as_str());

    let mut floors = text.split(&RANGE_SEPARATORS[..]).map(single_floor);

    let first = floors.next().flatten().ok_or_else(err)?;
    for rest in floors {
        rest.ok_or_else(err)?;
    }

    Ok(first)
}

fn single_floor(token: &str) -> Option<i32> {
    let token = token.trim();
    match token.strip_prefix('B') {
        Some(basement) => parse_digits(basement)
            .and_then(|n| i32::try_from(n).ok())
            .and_then(i32::checked_neg),
        None => parse_digits(token).and_then(|n| i32::try_from(n).ok()),
    }
}

/// `"8.5万円"` -> 85000, `"85,000円"` -> 85000, `"85000"` -> 85000.
///
/// Fractional man amounts are computed exactly; anything finer than one yen
/// is rejected.
pub fn parse_price_yen(raw: &str) -> Result<u64, ParseError> {
    let err = || ParseError::new(Field::Price, raw);
    let text = normalize(raw);
    let text = text.strip_suffix('円').unwrap_or(text.as_str());

    if let Some(man) = text.strip_suffix('万') {
        let (whole, frac) = match man.split_once('.') {
            Some((w, f)) => (w, f),
            None => (man, ""),
        };

        if frac.len() > 4 || (!frac.is_empty() && !frac.bytes().all(|b| b.is_ascii_digit())) {
            return Err(err());
        }

        let whole = parse_digits(whole).ok_or_else(err)?;
        let frac_yen = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<4}");
            padded.parse::<u64>().map_err(|_| err())?
        };

        return (whole as u64)
            .checked_mul(MAN_YEN)
            .and_then(|yen| yen.checked_add(frac_yen))
            .ok_or_else(err);
    }

    let plain: String = text.chars().filter(|c| *c != ',').collect();
    if plain.is_empty() || !plain.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    plain.parse::<u64>().map_err(|_| err())
}

/// `"21.5m2"` -> 21.5. Accepts `m2`, `m²`, `㎡` and `平米` suffixes.
pub fn parse_square_meters(raw: &str) -> Result<f32, ParseError> {
    let err = || ParseError::new(Field::SquareMeters, raw);
    let text = normalize(raw);

    let number = AREA_SUFFIXES
        .iter()
        .find_map(|suffix| text.strip_suffix(*suffix))
        .unwrap_or(text.as_str())
        .trim();

    let digits = number.bytes().filter(u8::is_ascii_digit).count();
    let dots = number.bytes().filter(|b| *b == b'.').count();
    if digits == 0 || dots > 1 || digits + dots != number.len() {
        return Err(err());
    }

    let value: f32 = number.parse().map_err(|_| err())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(err());
    }
    Ok(value)
}

/// `"歩7分"` -> 7.
pub fn parse_walk_minutes(raw: &str) -> Result<u32, ParseError> {
    let err = || ParseError::new(Field::WalkMinutes, raw);
    let text = normalize(raw);

    text.strip_prefix('歩')
        .and_then(|s| s.strip_suffix('分'))
        .and_then(parse_digits)
        .ok_or_else(err)
}

/// Trims and folds full-width digits and punctuation to ASCII.
fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '．' => '.',
            '，' => ',',
            'Ｂ' => 'B',
            'Ｆ' => 'F',
            _ => c,
        })
        .collect()
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
