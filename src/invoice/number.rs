use rand::Rng;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

const DATE_PART: &[FormatItem<'static>] = format_description!("[year][month][day]");
const SUFFIX_LEN: usize = 5;
const CLOCK_CHARS: usize = 2;

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".into();
    }
    let mut digits = Vec::new();
    while n > 0 {
        let d = (n % 36) as u32;
        digits.push(std::char::from_digit(d, 36).unwrap_or('0').to_ascii_uppercase());
        n /= 36;
    }
    digits.iter().rev().collect()
}

/// `INV-YYYYMMDD-XXXXX`: UTC date plus a base-36 suffix made of the two
/// fastest-moving clock digits and three random digits. Not guaranteed unique;
/// the storage constraint is the arbiter.
pub fn invoice_number_at<R: Rng>(now: OffsetDateTime, rng: &mut R) -> String {
    let date_part = now
        .format(DATE_PART)
        .unwrap_or_else(|_| "00000000".into());

    let millis = now.unix_timestamp_nanos().max(0) as u128 / 1_000_000;
    let clock = to_base36(millis);
    let mut suffix: String = clock[clock.len().saturating_sub(CLOCK_CHARS)..].to_string();
    while suffix.len() < SUFFIX_LEN {
        let d = rng.gen_range(0..36u32);
        suffix.push(std::char::from_digit(d, 36).unwrap_or('0').to_ascii_uppercase());
    }

    format!("INV-{date_part}-{suffix}")
}

pub fn generate_invoice_number() -> String {
    invoice_number_at(OffsetDateTime::now_utc(), &mut rand::thread_rng())
}

pub fn invoice_url(base_url: &str, number: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), number)
}
