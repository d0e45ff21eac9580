// Repository tests against a real MySQL server
//
// Run with: TEST_DATABASE_URL=mysql://... cargo test --test mysql_repository_test -- --ignored

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use chrono::Utc;
use fintrack::config::LedgerConfig;
use fintrack::core::{AppError, Currency, MonthCalendar};
use fintrack::debts::{Debt, DebtRepository, DebtService, MySqlDebtRepository};
use fintrack::installments::InstallmentPlanner;
use fintrack::transactions::{
    LedgerTransaction, MySqlTransactionRepository, TransactionKind, TransactionRepository,
};
use fintrack::users::{key_digest, MySqlUserRepository, UserRepository};
use helpers::*;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn planned_debts(user_id: &str, plan_id: &str, tenor: i32) -> Vec<Debt> {
    let now = Utc::now().naive_utc();
    InstallmentPlanner::new(Currency::IDR)
        .plan(dec!(1000000), tenor, date(2024, 1, 31), "Sofa, Debt payment")
        .unwrap()
        .iter()
        .map(|installment| Debt::from_installment(user_id, plan_id, installment, now))
        .collect()
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_batch_with_failing_row_rolls_back() {
    let pool = create_test_pool().await;
    let (user_id, _) = seed_user(&pool, "Batch").await;
    let repo = MySqlDebtRepository::new(pool.clone());

    let plan_id = Uuid::new_v4().to_string();
    let mut debts = planned_debts(&user_id, &plan_id, 4);
    // Row 4 collides with row 1 on the primary key after three inserts succeeded
    debts[3].id = debts[0].id.clone();

    let result = repo.create_batch(&debts).await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(count_plan_rows(&pool, &plan_id).await, 0);
    assert!(repo.list_by_user(&user_id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_debt_listings_round_trip() {
    let pool = create_test_pool().await;
    let (user_id, _) = seed_user(&pool, "Listings").await;
    let repo = Arc::new(MySqlDebtRepository::new(pool.clone()));
    let service = DebtService::new(repo.clone(), LedgerConfig::default());

    let plan = service
        .create_debt_with_tenor(
            &user_id,
            TestDataFactory::debt_request(dec!(3000000), 6, date(2024, 1, 31), "Sofa"),
        )
        .await
        .unwrap();
    assert_eq!(count_plan_rows(&pool, &plan.plan_id).await, 6);

    let all = repo.list_by_user(&user_id).await.unwrap();
    let due_dates: Vec<_> = all.iter().map(|d| d.due_date).collect();
    assert_eq!(
        due_dates,
        vec![
            date(2024, 1, 31),
            date(2024, 2, 29),
            date(2024, 3, 31),
            date(2024, 4, 30),
            date(2024, 5, 31),
            date(2024, 6, 30),
        ]
    );
    assert!(all.iter().all(|d| d.amount == dec!(500000) && !d.paid));
    assert_eq!(all[5].note, "Sofa, Debt payment, 6/6");

    let page = repo
        .list_unpaid_due_from(&user_id, date(2024, 3, 15), 2, 1)
        .await
        .unwrap();
    let page_dates: Vec<_> = page.iter().map(|d| d.due_date).collect();
    assert_eq!(page_dates, vec![date(2024, 4, 30), date(2024, 5, 31)]);

    let february = repo
        .list_unpaid_due_between(
            &user_id,
            MonthCalendar::start_of_month(date(2024, 2, 10)),
            MonthCalendar::end_of_month(date(2024, 2, 10)),
        )
        .await
        .unwrap();
    assert_eq!(february.len(), 1);
    assert_eq!(february[0].installment_number, 2);

    let (other_user, _) = seed_user(&pool, "Stranger").await;
    assert!(!repo.delete(&other_user, &all[0].id).await.unwrap());
    assert!(repo.delete(&user_id, &all[0].id).await.unwrap());
    assert_eq!(count_plan_rows(&pool, &plan.plan_id).await, 5);
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_update_payment_flips_unpaid_row_once() {
    let pool = create_test_pool().await;
    let (user_id, _) = seed_user(&pool, "Payer").await;
    let repo = MySqlDebtRepository::new(pool.clone());

    let plan_id = Uuid::new_v4().to_string();
    let debts = planned_debts(&user_id, &plan_id, 2);
    repo.create_batch(&debts).await.unwrap();

    let mut first = debts[0].clone();
    first.mark_as_paid(datetime(2024, 2, 1)).unwrap();
    assert!(repo.update_payment(&first).await.unwrap());

    let mut late = debts[0].clone();
    late.mark_as_paid(datetime(2024, 3, 1)).unwrap();
    assert!(!repo.update_payment(&late).await.unwrap());

    let stored = repo.find_by_id(&user_id, &debts[0].id).await.unwrap().unwrap();
    assert!(stored.paid);
    assert_eq!(stored.paid_at, Some(datetime(2024, 2, 1)));
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_concurrent_payments_have_one_winner() {
    let pool = create_test_pool().await;
    let (user_id, _) = seed_user(&pool, "Racer").await;
    let service = DebtService::new(
        Arc::new(MySqlDebtRepository::new(pool.clone())),
        LedgerConfig::default(),
    );

    let plan = service
        .create_debt_with_tenor(
            &user_id,
            TestDataFactory::debt_request(dec!(100000), 1, date(2024, 4, 1), "Bag"),
        )
        .await
        .unwrap();
    let id = &plan.debts[0].id;

    let (a, b) = tokio::join!(
        service.mark_as_paid_at(&user_id, id, datetime(2024, 4, 2)),
        service.mark_as_paid_at(&user_id, id, datetime(2024, 5, 2)),
    );

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!([a, b]
        .into_iter()
        .any(|r| matches!(r, Err(AppError::Validation(_)))));
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_transactions_round_trip_with_kind_filter() {
    let pool = create_test_pool().await;
    let (user_id, _) = seed_user(&pool, "Ledger").await;
    let repo = MySqlTransactionRepository::new(pool.clone());

    let entries = [
        (TransactionKind::Income, dec!(4000000), Some("salary"), datetime(2024, 2, 1)),
        (TransactionKind::Expense, dec!(85000), Some("food"), datetime(2024, 2, 10)),
        (TransactionKind::Expense, dec!(120000), None, datetime(2024, 2, 29)),
        (TransactionKind::Expense, dec!(40000), Some("transport"), datetime(2024, 3, 1)),
    ];
    for (kind, amount, category, when) in entries {
        let tx = LedgerTransaction::new(&user_id, kind, amount, category, None, when, Currency::IDR)
            .unwrap();
        repo.create(&tx).await.unwrap();
    }

    let (from, to) = MonthCalendar::month_window(date(2024, 2, 15));
    let february_expenses = repo
        .list_between(&user_id, Some(TransactionKind::Expense), from, to)
        .await
        .unwrap();
    assert_eq!(february_expenses.len(), 2);
    assert_eq!(february_expenses[0].amount, dec!(120000));
    assert!(february_expenses
        .iter()
        .all(|t| t.kind == TransactionKind::Expense));

    let february_all = repo.list_between(&user_id, None, from, to).await.unwrap();
    assert_eq!(february_all.len(), 3);

    let recent = repo.list_recent(&user_id, None, 2, 1).await.unwrap();
    let amounts: Vec<_> = recent.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![dec!(120000), dec!(85000)]);

    let income = repo
        .list_recent(&user_id, Some(TransactionKind::Income), 10, 0)
        .await
        .unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].kind, TransactionKind::Income);
    assert_eq!(income[0].category, "salary");

    let (other_user, _) = seed_user(&pool, "Outsider").await;
    assert!(!repo.delete(&other_user, &income[0].id).await.unwrap());
    assert!(repo.delete(&user_id, &income[0].id).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_deactivated_key_no_longer_resolves() {
    let pool = create_test_pool().await;
    let (user_id, api_key) = seed_user(&pool, "Keyholder").await;
    let repo = MySqlUserRepository::new(pool.clone());
    let digest = key_digest(&api_key);

    let principal = repo.find_principal_by_key_digest(&digest).await.unwrap();
    assert_eq!(principal.map(|p| p.user_id), Some(user_id.clone()));

    assert!(repo.deactivate_key(&user_id, &digest).await.unwrap());
    assert!(repo.find_principal_by_key_digest(&digest).await.unwrap().is_none());
    assert!(!repo.deactivate_key(&user_id, &digest).await.unwrap());

    // Re-seeding a revoked key keeps the original owner
    let again = repo.ensure_user_with_key("Keyholder", &digest).await.unwrap();
    assert_eq!(again, user_id);
}
