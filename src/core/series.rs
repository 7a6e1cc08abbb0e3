use super::types::{DebtBalancePoint, DebtWithSchedule, FreedMinimumsPoint, PayoffPoint};

/// Total remaining balance across all debts for months `0..=months`.
///
/// Month 0 is the sum of starting balances; month `m` reads each ledger's
/// row `m - 1`.
pub fn debt_balance_data(schedules: &[DebtWithSchedule], months: u32) -> Vec<DebtBalancePoint> {
    if schedules.is_empty() {
        return Vec::new();
    }

    (0..=months)
        .map(|month| {
            let total_balance: f64 = schedules
                .iter()
                .map(|s| {
                    if month == 0 {
                        s.debt.outstanding()
                    } else {
                        s.months
                            .get(month as usize - 1)
                            .map_or(0.0, |m| m.remaining_balance)
                    }
                })
                .sum();
            DebtBalancePoint {
                month,
                total_balance,
            }
        })
        .collect()
}

pub fn freed_minimums_data(
    schedules: &[DebtWithSchedule],
    months: u32,
) -> Vec<FreedMinimumsPoint> {
    if schedules.is_empty() {
        return Vec::new();
    }

    (0..=months)
        .map(|month| FreedMinimumsPoint {
            month,
            freed_minimums: schedules
                .iter()
                .filter(|s| s.payoff_month.is_some_and(|paid| paid <= month))
                .fold(0.0, |acc, s| acc + s.debt.amount),
        })
        .collect()
}

/// Month number (1-indexed) in which the debt's ledger first shows a zero
/// balance. `None` for a debt that started paid off or never got there.
pub fn months_to_payoff(schedule: &DebtWithSchedule) -> Option<u32> {
    if schedule.debt.is_paid_off() {
        return None;
    }
    schedule
        .months
        .iter()
        .position(|m| m.remaining_balance <= 0.0)
        .map(|idx| idx as u32 + 1)
}

pub fn payoff_series(schedule: &DebtWithSchedule) -> Vec<PayoffPoint> {
    if schedule.debt.is_paid_off() {
        return Vec::new();
    }

    let mut points = vec![PayoffPoint {
        month: 0,
        remaining_balance: round_cents(schedule.debt.balance),
        payment: 0.0,
        principal_paid: 0.0,
        interest_paid: 0.0,
        rollover: 0.0,
        info: String::new(),
    }];

    for (idx, entry) in schedule.months.iter().enumerate() {
        points.push(PayoffPoint {
            month: idx as u32 + 1,
            remaining_balance: round_cents(entry.remaining_balance),
            payment: round_cents(entry.payment),
            principal_paid: round_cents(entry.principal_paid),
            interest_paid: round_cents(entry.interest_paid),
            rollover: round_cents(entry.rollover),
            info: entry.info.clone(),
        });
        if entry.remaining_balance <= 0.0 {
            break;
        }
    }

    points
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Debt, calculate_snowball};

    #[test]
    fn payoff_series_stops_at_first_zero_month() {
        let result = calculate_snowball(&[Debt::new("Card", 0.0, 60.0, 100.0)], 0.0);
        let points = payoff_series(&result.schedules[0]);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].month, 0);
        assert_eq!(points[0].remaining_balance, 100.0);
        assert_eq!(points[1].remaining_balance, 40.0);
        assert_eq!(points[2].month, 2);
        assert_eq!(points[2].remaining_balance, 0.0);
        assert_eq!(points[2].rollover, 20.0);
        assert!(points[0].info.is_empty());
        assert_eq!(points[2].info, result.schedules[0].months[1].info);
        assert!(points[2].info.contains("Rollover $20.00"));
    }

    #[test]
    fn payoff_series_rounds_to_cents() {
        let result = calculate_snowball(&[Debt::new("Card", 19.99, 33.33, 1000.0)], 0.0);
        let points = payoff_series(&result.schedules[0]);

        for point in &points {
            let cents = point.remaining_balance * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn months_to_payoff_matches_recorded_payoff_month() {
        let debts = vec![
            Debt::new("Small", 0.0, 50.0, 500.0),
            Debt::new("Large", 0.0, 100.0, 2000.0),
            Debt::new("Closed", 0.0, 0.0, 0.0),
        ];
        let result = calculate_snowball(&debts, 0.0);

        assert_eq!(months_to_payoff(&result.schedules[0]), Some(10));
        assert_eq!(months_to_payoff(&result.schedules[1]), Some(17));
        assert_eq!(months_to_payoff(&result.schedules[2]), None);
        assert!(payoff_series(&result.schedules[2]).is_empty());
        assert_eq!(
            months_to_payoff(&result.schedules[1]),
            result.schedules[1].payoff_month
        );
    }

    #[test]
    fn months_to_payoff_is_none_when_plan_never_converges() {
        let result = calculate_snowball(&[Debt::new("Underwater", 30.0, 1.0, 100_000.0)], 0.0);
        assert_eq!(months_to_payoff(&result.schedules[0]), None);
        assert_eq!(payoff_series(&result.schedules[0]).len(), 1001);
    }

    #[test]
    fn series_are_empty_without_schedules() {
        assert!(debt_balance_data(&[], 4).is_empty());
        assert!(freed_minimums_data(&[], 4).is_empty());
    }
}
