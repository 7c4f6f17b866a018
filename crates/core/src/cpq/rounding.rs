use rust_decimal::{Decimal, RoundingStrategy};

pub const MONEY_DECIMALS: u32 = 2;
pub const RATE_DECIMALS: u32 = 3;

pub fn round_to(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_money(value: Decimal) -> Decimal {
    round_to(value, MONEY_DECIMALS)
}

pub fn round_rate(value: Decimal) -> Decimal {
    round_to(value, RATE_DECIMALS)
}
