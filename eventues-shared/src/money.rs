use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// All ticket amounts are Brazilian Real.
pub const CURRENCY: &str = "BRL";

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Plain two-decimal rendering with a dot separator (`50.00`).
pub fn format_two_places(amount: Decimal) -> String {
    format!("{:.2}", round_cents(amount))
}

/// pt-BR currency rendering: `R$ 1.234,56`
pub fn format_brl(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let plain = format!("{:.2}", rounded.abs());
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Display wrapper for a resolved price that may be unset.
///
/// An unset price is never shown as zero; organizers need to see that the
/// configuration is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLabel(pub Option<Decimal>);

impl PriceLabel {
    pub const UNDEFINED: &'static str = "price not defined";
}

impl fmt::Display for PriceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(amount) => f.write_str(&format_brl(amount)),
            None => f.write_str(Self::UNDEFINED),
        }
    }
}
