mod engine;
mod ordering;
mod series;
mod types;

pub use engine::{MAX_MONTHS, calculate_snowball};
pub use ordering::{DebtOrder, new_debt, order_debts, sample_debts, sanitize_debts};
pub use series::{debt_balance_data, freed_minimums_data, months_to_payoff, payoff_series};
pub use types::{
    Debt, DebtBalancePoint, DebtWithSchedule, FreedMinimumsPoint, MonthLedgerEntry,
    PayoffPoint, PayoffStatus, SnowballCalculationResult,
};
