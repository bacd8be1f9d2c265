mod common;

use common::{book_with_annual_loan, date};
use loan_core::core::services::{
    AllocationService, BalanceService, LoanService, NewLoan, PaymentService,
};
use loan_core::interest::round2;
use loan_core::ledger::{InterestType, LoanBook, LoanStatus, PaymentRequest, Person};

#[test]
fn year_end_payment_splits_into_interest_then_principal() {
    let (mut book, _, loan_id) = book_with_annual_loan(1_000.0, 12.0);
    let entry = PaymentService::record(
        &mut book,
        loan_id,
        PaymentRequest::new(1_000.0, date(2024, 12, 31)),
    )
    .unwrap();

    assert_eq!(entry.interest_for_period, 120.0);
    assert_eq!(entry.total_due, 1_120.0);
    assert_eq!(entry.new_balance, 120.0);

    let loan = book.loan(loan_id).unwrap();
    assert_eq!(loan.total_interest_paid, 120.0);
    assert_eq!(loan.total_principal_paid, 880.0);
    assert_eq!(loan.status, LoanStatus::Active);
}

#[test]
fn successive_payments_keep_the_ledger_invariant() {
    let (mut book, _, loan_id) = book_with_annual_loan(10_000.0, 12.0);
    for (amount, when) in [
        (500.0, date(2024, 4, 1)),
        (500.0, date(2024, 7, 1)),
        (500.0, date(2024, 10, 1)),
        (9_500.0, date(2024, 12, 31)),
    ] {
        PaymentService::record(&mut book, loan_id, PaymentRequest::new(amount, when)).unwrap();
    }

    let loan = book.loan(loan_id).unwrap();
    assert_eq!(loan.payment_history.len(), 4);
    for entry in &loan.payment_history {
        let expected = round2(
            entry.balance_before + entry.interest_for_period - entry.payment_amount,
        )
        .max(0.0);
        assert!((entry.new_balance - expected).abs() < 0.01);
        let split_covers_payment = entry.payment_amount
            - entry.payment_amount.min(entry.interest_for_period)
            - (entry.payment_amount - entry.interest_for_period).max(0.0);
        assert!(split_covers_payment.abs() < 0.01);
    }
    assert_eq!(
        loan.current_balance,
        loan.payment_history.last().unwrap().new_balance
    );
}

#[test]
fn statement_and_audit_rebuild_agree() {
    let (mut book, _, loan_id) = book_with_annual_loan(5_000.0, 10.0);
    let raw = vec![
        PaymentRequest::new(800.0, date(2024, 3, 15)),
        PaymentRequest::new(1_200.0, date(2024, 6, 20)),
        PaymentRequest::new(2_000.0, date(2024, 11, 2)),
    ];
    for payment in &raw {
        PaymentService::record(&mut book, loan_id, payment.clone()).unwrap();
    }

    let loan = book.loan(loan_id).unwrap();
    let statement = BalanceService::statement(loan);
    let rebuilt = BalanceService::rebuild(loan, &raw);

    assert_eq!(statement.len(), rebuilt.len());
    for (recorded, audited) in statement.iter().zip(&rebuilt) {
        assert_eq!(recorded.date, audited.date);
        assert_eq!(recorded.days_since_last, audited.days_since_last);
        assert!((recorded.balance_before - audited.balance_before).abs() < 0.01);
        assert!((recorded.interest_for_period - audited.interest_for_period).abs() < 0.01);
        assert!((recorded.new_balance - audited.new_balance).abs() < 0.01);
        assert!((recorded.cumulative_interest - audited.cumulative_interest).abs() < 0.01);
    }
}

#[test]
fn deposit_funds_oldest_due_loan_first() {
    let mut book = LoanBook::new("Deposits");
    let person = book.add_person(Person::new("Ravi"));
    let older = LoanService::create(
        &mut book,
        NewLoan {
            person_id: person,
            amount: 1_000.0,
            interest_rate: 0.0,
            interest_type: InterestType::PerAnnum,
            start_date: date(2024, 1, 1),
            due_date: date(2024, 6, 1),
            description: None,
        },
    )
    .unwrap();
    let newer = LoanService::create(
        &mut book,
        NewLoan {
            person_id: person,
            amount: 800.0,
            interest_rate: 0.0,
            interest_type: InterestType::PerAnnum,
            start_date: date(2024, 1, 1),
            due_date: date(2024, 9, 1),
            description: None,
        },
    )
    .unwrap();

    let recorded =
        PaymentService::apply_deposit(&mut book, person, 1_500.0, date(2024, 3, 1), None).unwrap();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].0, older);
    assert_eq!(recorded[0].1.payment_amount, 1_000.0);
    assert_eq!(recorded[1].0, newer);
    assert_eq!(recorded[1].1.payment_amount, 500.0);

    assert_eq!(book.loan(older).unwrap().status, LoanStatus::Paid);
    let remaining = book.loan(newer).unwrap();
    assert_eq!(remaining.status, LoanStatus::Active);
    assert_eq!(remaining.current_balance, 300.0);
}

#[test]
fn allocation_skips_paid_loans_and_stops_at_zero() {
    let (mut book, person, loan_id) = book_with_annual_loan(1_000.0, 0.0);
    PaymentService::record(
        &mut book,
        loan_id,
        PaymentRequest::new(1_000.0, date(2024, 2, 1)),
    )
    .unwrap();

    let active: Vec<_> = book
        .loans_for_person(person)
        .into_iter()
        .filter(|loan| loan.status == LoanStatus::Active)
        .cloned()
        .collect();
    let allocations = AllocationService::auto_allocate(&active, 500.0, date(2024, 3, 1));
    assert!(allocations.is_empty());
}

#[test]
fn deposit_description_is_carried_onto_entries() {
    let (mut book, person, loan_id) = book_with_annual_loan(2_000.0, 0.0);
    let recorded = PaymentService::apply_deposit(
        &mut book,
        person,
        500.0,
        date(2024, 2, 1),
        Some("February collection".into()),
    )
    .unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, loan_id);
    assert_eq!(recorded[0].1.notes, "February collection");

    let loan = book.loan(loan_id).unwrap();
    assert_eq!(
        loan.payment_history[0].description.as_deref(),
        Some("February collection")
    );
}
