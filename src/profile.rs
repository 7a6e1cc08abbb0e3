use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::{
    Debt, DebtOrder, SnowballCalculationResult, calculate_snowball, new_debt, order_debts,
    sample_debts, sanitize_debts,
};
use crate::error::PlanError;

pub const DEFAULT_MONTHLY_CONTRIBUTION: f64 = 100.0;

/// The per-user record the calculator reads and writes: the extra monthly
/// payment plus the debt list in the order it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub monthly_contribution: f64,
    #[serde(alias = "debts")]
    pub bills: Vec<Debt>,
}

impl UserProfile {
    pub fn sample() -> Self {
        Self {
            monthly_contribution: DEFAULT_MONTHLY_CONTRIBUTION,
            bills: sample_debts(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, PlanError> {
        let json = fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        check_amount("monthlyContribution", self.monthly_contribution)?;
        for (index, debt) in self.bills.iter().enumerate() {
            for (field, value) in [
                ("interestRate", debt.interest_rate),
                ("amount", debt.amount),
                ("balance", debt.balance),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(PlanError::InvalidDebt {
                        index,
                        field,
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    /// Plans the profile as stored, clamping bad numbers instead of
    /// rejecting them.
    pub fn plan(&self, order: DebtOrder) -> SnowballCalculationResult {
        let debts = order_debts(&sanitize_debts(&self.bills), order);
        calculate_snowball(&debts, self.planned_contribution())
    }

    pub fn planned_contribution(&self) -> f64 {
        if self.monthly_contribution.is_finite() {
            self.monthly_contribution.max(0.0)
        } else {
            0.0
        }
    }

    pub fn add_debt(&mut self) {
        self.bills.insert(0, new_debt());
    }

    pub fn remove_debt(&mut self, index: usize) -> Result<Debt, PlanError> {
        if index >= self.bills.len() {
            return Err(PlanError::NoSuchDebt(index));
        }
        Ok(self.bills.remove(index))
    }
}

pub fn check_amount(field: &'static str, value: f64) -> Result<(), PlanError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlanError::InvalidAmount { field, value });
    }
    Ok(())
}

pub trait ProfileStore: Send + Sync {
    fn load(&self, user_id: &str) -> Result<Option<UserProfile>, PlanError>;

    /// Replaces the stored profile. Returns the profile as stored.
    fn save(&self, user_id: &str, profile: UserProfile) -> Result<UserProfile, PlanError>;
}

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn load(&self, user_id: &str) -> Result<Option<UserProfile>, PlanError> {
        let profiles = self.profiles.read().map_err(|_| PlanError::StorePoisoned)?;
        Ok(profiles.get(user_id).cloned())
    }

    fn save(&self, user_id: &str, profile: UserProfile) -> Result<UserProfile, PlanError> {
        profile.validate()?;
        let stored = UserProfile {
            monthly_contribution: profile.monthly_contribution,
            bills: order_debts(&profile.bills, DebtOrder::Balance),
        };

        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| PlanError::StorePoisoned)?;
        profiles.insert(user_id.to_string(), stored.clone());
        info!(
            "saved profile for {user_id} with {} debts",
            stored.bills.len()
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PayoffStatus;

    #[test]
    fn profile_json_accepts_stored_metadata_keys() {
        let json = r#"{
          "monthlyContribution": 250,
          "bills": [
            {"name": "Store Card", "interestRate": 15, "monthlyPayment": 45, "currentBalance": 1200},
            {"name": "Loan", "interestRate": 8, "amount": 500, "balance": 10000}
          ]
        }"#;
        let profile = UserProfile::from_json_str(json).expect("json should parse");

        assert_eq!(profile.monthly_contribution, 250.0);
        assert_eq!(profile.bills[0], Debt::new("Store Card", 15.0, 45.0, 1200.0));
        assert_eq!(profile.bills[1].amount, 500.0);
    }

    #[test]
    fn profile_json_rejects_missing_fields() {
        let err = UserProfile::from_json_str(r#"{"bills": []}"#).expect_err("must reject");
        assert!(matches!(err, PlanError::Json(_)));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = UserProfile::from_path(Path::new("does/not/exist.json"))
            .expect_err("must fail to read");
        assert!(err.to_string().contains("does/not/exist.json"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn save_sorts_by_balance_and_load_returns_stored_copy() {
        let store = InMemoryProfileStore::new();
        assert_eq!(store.load("user-1").expect("load"), None);

        let stored = store
            .save("user-1", UserProfile::sample())
            .expect("valid profile");
        let balances: Vec<f64> = stored.bills.iter().map(|d| d.balance).collect();
        assert_eq!(balances, vec![1_200.0, 3_500.0, 10_000.0, 20_000.0, 30_000.0]);
        assert_eq!(store.load("user-1").expect("load"), Some(stored.clone()));

        let again = store
            .save("user-1", stored.clone())
            .expect("saving twice is fine");
        assert_eq!(again, stored);
        assert_eq!(store.load("user-2").expect("load"), None);
    }

    #[test]
    fn save_rejects_negative_values() {
        let store = InMemoryProfileStore::new();
        let mut profile = UserProfile::sample();
        profile.bills[2].balance = -1.0;

        let err = store.save("user-1", profile).expect_err("must reject");
        assert!(matches!(
            err,
            PlanError::InvalidDebt {
                index: 2,
                field: "balance",
                ..
            }
        ));

        let mut profile = UserProfile::sample();
        profile.monthly_contribution = f64::NAN;
        let err = store.save("user-1", profile).expect_err("must reject");
        assert!(err.to_string().contains("monthlyContribution"));
        assert_eq!(store.load("user-1").expect("load"), None);
    }

    #[test]
    fn sample_profile_plan_pays_everything_off() {
        let result = UserProfile::sample().plan(DebtOrder::Balance);
        assert_eq!(result.status, PayoffStatus::PaidOff);
        assert_eq!(result.schedules[0].debt.name, "Store Card");
        assert!(result.debt_free_months.is_some_and(|m| m > 0));
    }

    #[test]
    fn plan_clamps_unsaved_bad_numbers() {
        let profile = UserProfile {
            monthly_contribution: f64::NAN,
            bills: vec![Debt::new("Card", -5.0, 60.0, 100.0)],
        };
        assert_eq!(profile.planned_contribution(), 0.0);

        let result = profile.plan(DebtOrder::AsGiven);
        assert_eq!(result.schedules[0].debt.interest_rate, 0.0);
        assert_eq!(result.debt_free_months, Some(2));
    }

    #[test]
    fn add_and_remove_debt_edit_the_list() {
        let mut profile = UserProfile::sample();
        profile.add_debt();
        assert_eq!(profile.bills[0], new_debt());
        assert_eq!(profile.bills.len(), 6);

        let removed = profile.remove_debt(0).expect("debt exists");
        assert_eq!(removed.name, "New Debt");
        assert!(matches!(
            profile.remove_debt(10),
            Err(PlanError::NoSuchDebt(10))
        ));
    }
}
