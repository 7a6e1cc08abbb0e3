use log::{debug, warn};

use super::series::{debt_balance_data, freed_minimums_data};
use super::types::{
    Debt, DebtWithSchedule, MonthLedgerEntry, PayoffStatus, SnowballCalculationResult,
};

pub const MAX_MONTHS: u32 = 1000;

#[derive(Debug, Clone, Copy)]
enum PoolSource {
    Snowball { freed_minimums: f64, monthly_extra: f64 },
    Rollover(f64),
}

#[derive(Debug)]
struct SimulationState {
    balances: Vec<f64>,
    payoff_months: Vec<Option<u32>>,
    ledgers: Vec<Vec<MonthLedgerEntry>>,
    freed_minimums: f64,
}

impl SimulationState {
    fn new(debts: &[Debt]) -> Self {
        Self {
            balances: debts.iter().map(|d| d.balance).collect(),
            payoff_months: debts
                .iter()
                .map(|d| d.is_paid_off().then_some(0))
                .collect(),
            ledgers: vec![Vec::new(); debts.len()],
            freed_minimums: starting_freed_minimums(debts),
        }
    }

    fn first_unpaid(&self) -> Option<usize> {
        self.balances.iter().position(|b| *b > 0.0)
    }

    fn run_month(&mut self, debts: &[Debt], recipient: usize, monthly_extra: f64, month: u32) {
        let mut newly_freed = 0.0;
        let mut carry = 0.0;

        for (idx, debt) in debts.iter().enumerate() {
            let balance = self.balances[idx];
            if balance <= 0.0 {
                self.ledgers[idx].push(already_paid_entry(debt));
                continue;
            }

            let source = if idx == recipient {
                PoolSource::Snowball {
                    freed_minimums: self.freed_minimums,
                    monthly_extra,
                }
            } else {
                PoolSource::Rollover(carry)
            };
            let pool = match source {
                PoolSource::Snowball {
                    freed_minimums,
                    monthly_extra,
                } => debt.amount + freed_minimums + monthly_extra,
                PoolSource::Rollover(carry) => debt.amount + carry,
            };

            let interest = balance * (debt.interest_rate / 100.0) / 12.0;
            let owed = balance + interest;
            let clears = pool >= owed;
            let payment = if clears { owed } else { pool };
            let interest_paid = interest.min(payment);
            let principal_paid = payment - interest_paid;
            let remaining_balance = if clears {
                0.0
            } else {
                (balance - principal_paid).max(0.0)
            };
            let rollover = if payment < pool { pool - payment } else { 0.0 };

            self.ledgers[idx].push(MonthLedgerEntry {
                payment,
                remaining_balance,
                principal_paid,
                interest_paid,
                rollover,
                used_snowball: idx == recipient,
                info: describe_payment(debt, source, rollover),
            });

            carry = rollover;
            self.balances[idx] = remaining_balance;
            if remaining_balance <= 0.0 && self.payoff_months[idx].is_none() {
                self.payoff_months[idx] = Some(month);
                newly_freed += debt.amount;
            }
        }

        self.freed_minimums += newly_freed;
    }

    fn push_fully_paid_rows(&mut self, debts: &[Debt]) {
        for (debt, ledger) in debts.iter().zip(self.ledgers.iter_mut()) {
            ledger.push(MonthLedgerEntry {
                payment: 0.0,
                remaining_balance: 0.0,
                principal_paid: 0.0,
                interest_paid: 0.0,
                rollover: debt.amount,
                used_snowball: false,
                info: format!(
                    "All debts are paid off. The {} minimum payment is yours to keep.",
                    money(debt.amount)
                ),
            });
        }
    }
}

pub fn calculate_snowball(debts: &[Debt], monthly_extra: f64) -> SnowballCalculationResult {
    if debts.is_empty() {
        return empty_result();
    }

    let mut state = SimulationState::new(debts);
    let mut month = 0_u32;

    let status = loop {
        let Some(recipient) = state.first_unpaid() else {
            state.push_fully_paid_rows(debts);
            break PayoffStatus::PaidOff;
        };
        if month == MAX_MONTHS {
            break PayoffStatus::NonConvergent;
        }
        month += 1;
        state.run_month(debts, recipient, monthly_extra, month);
    };

    let SimulationState {
        payoff_months,
        ledgers,
        ..
    } = state;
    let schedules: Vec<DebtWithSchedule> = debts
        .iter()
        .zip(ledgers)
        .zip(payoff_months)
        .map(|((debt, months), payoff_month)| DebtWithSchedule {
            debt: debt.clone(),
            payoff_month,
            months,
        })
        .collect();

    match status {
        PayoffStatus::PaidOff => debug!(
            "snowball plan for {} debts is debt-free after {month} months",
            debts.len()
        ),
        PayoffStatus::NonConvergent => warn!(
            "snowball plan for {} debts did not converge within {MAX_MONTHS} months",
            debts.len()
        ),
    }

    SnowballCalculationResult {
        status,
        total_debt: debts.iter().map(Debt::outstanding).sum(),
        total_minimum_payments: debts.iter().map(|d| d.amount).sum(),
        freed_minimum_payments: starting_freed_minimums(debts),
        debt_free_months: match status {
            PayoffStatus::PaidOff => Some(month),
            PayoffStatus::NonConvergent => None,
        },
        months_simulated: month,
        debt_balance_data: debt_balance_data(&schedules, month),
        freed_minimums_data: freed_minimums_data(&schedules, month),
        schedules,
    }
}

fn starting_freed_minimums(debts: &[Debt]) -> f64 {
    debts
        .iter()
        .filter(|d| d.is_paid_off())
        .fold(0.0, |acc, d| acc + d.amount)
}

fn empty_result() -> SnowballCalculationResult {
    SnowballCalculationResult {
        status: PayoffStatus::PaidOff,
        total_debt: 0.0,
        total_minimum_payments: 0.0,
        freed_minimum_payments: 0.0,
        debt_free_months: Some(0),
        months_simulated: 0,
        schedules: Vec::new(),
        debt_balance_data: Vec::new(),
        freed_minimums_data: Vec::new(),
    }
}

fn already_paid_entry(debt: &Debt) -> MonthLedgerEntry {
    MonthLedgerEntry {
        payment: 0.0,
        remaining_balance: 0.0,
        principal_paid: 0.0,
        interest_paid: 0.0,
        rollover: debt.amount,
        used_snowball: false,
        info: format!(
            "This debt is already paid off. Its {} minimum is part of the freed minimums.",
            money(debt.amount)
        ),
    }
}

fn describe_payment(debt: &Debt, source: PoolSource, rollover: f64) -> String {
    let mut info = format!("Pay = Min payment: {}", money(debt.amount));
    match source {
        PoolSource::Snowball {
            freed_minimums,
            monthly_extra,
        } => {
            if freed_minimums > 0.0 {
                info.push_str(&format!(" + Freed minimums: {}", money(freed_minimums)));
            }
            info.push_str(&format!(" + Monthly Extra Payment: {}", money(monthly_extra)));
        }
        PoolSource::Rollover(carry) => {
            if carry > 0.0 {
                info.push_str(&format!(" + Rollover: {}", money(carry)));
            }
        }
    }
    if rollover > 0.0 {
        info.push_str(&format!(
            ". Rollover {} applied to next debt in this month.",
            money(rollover)
        ));
    }
    info
}

fn money(value: f64) -> String {
    format!("${value:.2}")
}
