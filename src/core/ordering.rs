use super::types::Debt;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DebtOrder {
    AsGiven,
    Balance,
    MinimumPayment,
}

pub fn order_debts(debts: &[Debt], order: DebtOrder) -> Vec<Debt> {
    let mut ordered = debts.to_vec();
    match order {
        DebtOrder::AsGiven => {}
        DebtOrder::Balance => ordered.sort_by(|a, b| a.balance.total_cmp(&b.balance)),
        DebtOrder::MinimumPayment => ordered.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
    }
    ordered
}

pub fn sanitize_debts(debts: &[Debt]) -> Vec<Debt> {
    debts
        .iter()
        .map(|debt| {
            let name = debt.name.trim();
            Debt {
                name: if name.is_empty() {
                    "Unnamed debt".to_string()
                } else {
                    name.to_string()
                },
                interest_rate: non_negative(debt.interest_rate),
                amount: non_negative(debt.amount),
                balance: non_negative(debt.balance),
            }
        })
        .collect()
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

pub fn new_debt() -> Debt {
    Debt::new("New Debt", 10.0, 50.0, 500.0)
}

pub fn sample_debts() -> Vec<Debt> {
    vec![
        Debt::new("Store Card", 15.0, 45.0, 1_200.0),
        Debt::new("Medical Bill", 0.0, 150.0, 3_500.0),
        Debt::new("Credit Card", 26.0, 250.0, 20_000.0),
        Debt::new("Personal Loan", 8.0, 500.0, 10_000.0),
        Debt::new("Car Loan", 6.0, 650.0, 30_000.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(debts: &[Debt]) -> Vec<&str> {
        debts.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn balance_order_is_ascending_and_stable() {
        let debts = vec![
            Debt::new("B", 0.0, 10.0, 500.0),
            Debt::new("A", 0.0, 20.0, 100.0),
            Debt::new("C", 0.0, 30.0, 500.0),
        ];
        let ordered = order_debts(&debts, DebtOrder::Balance);
        assert_eq!(names(&ordered), vec!["A", "B", "C"]);
        assert_eq!(names(&debts), vec!["B", "A", "C"]);
    }

    #[test]
    fn minimum_payment_order_sorts_by_amount() {
        let ordered = order_debts(&sample_debts(), DebtOrder::MinimumPayment);
        assert_eq!(
            names(&ordered),
            vec![
                "Store Card",
                "Medical Bill",
                "Credit Card",
                "Personal Loan",
                "Car Loan"
            ]
        );
    }

    #[test]
    fn as_given_keeps_input_order() {
        let debts = sample_debts();
        assert_eq!(order_debts(&debts, DebtOrder::AsGiven), debts);
    }

    #[test]
    fn sanitize_clamps_negative_and_non_finite_values() {
        let debts = vec![
            Debt::new("  Card  ", -5.0, f64::NAN, -100.0),
            Debt::new("   ", 12.0, 40.0, f64::INFINITY),
        ];
        let clean = sanitize_debts(&debts);

        assert_eq!(clean[0], Debt::new("Card", 0.0, 0.0, 0.0));
        assert_eq!(clean[1], Debt::new("Unnamed debt", 12.0, 40.0, 0.0));
    }
}
