pub mod money;

pub use money::{format_brl, format_two_places, PriceLabel, CURRENCY};
