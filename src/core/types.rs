use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub name: String,
    /// Annual percentage rate in percent, e.g. `26.0` for 26%/yr.
    pub interest_rate: f64,
    /// Minimum required monthly payment.
    #[serde(alias = "monthlyPayment")]
    pub amount: f64,
    #[serde(alias = "currentBalance")]
    pub balance: f64,
}

impl Debt {
    pub fn new(name: impl Into<String>, interest_rate: f64, amount: f64, balance: f64) -> Self {
        Self {
            name: name.into(),
            interest_rate,
            amount,
            balance,
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }

    /// Starting balance as it counts toward totals; never negative.
    pub fn outstanding(&self) -> f64 {
        self.balance.max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthLedgerEntry {
    pub payment: f64,
    pub remaining_balance: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub rollover: f64,
    pub used_snowball: bool,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtWithSchedule {
    #[serde(flatten)]
    pub debt: Debt,
    pub payoff_month: Option<u32>,
    pub months: Vec<MonthLedgerEntry>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayoffStatus {
    PaidOff,
    /// The month cap was reached with at least one balance still open.
    NonConvergent,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtBalancePoint {
    pub month: u32,
    pub total_balance: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreedMinimumsPoint {
    pub month: u32,
    pub freed_minimums: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffPoint {
    pub month: u32,
    pub remaining_balance: f64,
    pub payment: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub rollover: f64,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnowballCalculationResult {
    pub status: PayoffStatus,
    pub total_debt: f64,
    pub total_minimum_payments: f64,
    pub freed_minimum_payments: f64,
    pub debt_free_months: Option<u32>,
    pub months_simulated: u32,
    pub schedules: Vec<DebtWithSchedule>,
    pub debt_balance_data: Vec<DebtBalancePoint>,
    pub freed_minimums_data: Vec<FreedMinimumsPoint>,
}

impl SnowballCalculationResult {
    pub fn converged(&self) -> bool {
        self.status == PayoffStatus::PaidOff
    }
}
