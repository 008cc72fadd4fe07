mod common;

use anyhow::Result;
use common::{at, demo_service, login_ross, reopen};
use guichet::application::AppError;
use guichet::domain::{
    parse_cents, AccountSelector, LedgerError, OperationError, OperationKind,
};

#[tokio::test]
async fn test_deposit_and_withdraw() -> Result<()> {
    let (mut service, _temp) = demo_service().await?;
    let ross = login_ross(&service)?;

    let deposit = service
        .deposit(&ross, AccountSelector::Primary, 12550, at("2025-03-01", 9))
        .await?;
    assert_eq!(deposit.kind, OperationKind::Deposit);
    assert_eq!(deposit.balance_after, 212550);

    let withdrawal = service
        .withdraw(&ross, AccountSelector::Primary, 2550, at("2025-03-01", 10))
        .await?;
    assert_eq!(withdrawal.amount, -2550);
    assert_eq!(withdrawal.balance_after, 210000);

    let statement = service.statement(&ross, AccountSelector::Primary)?;
    assert_eq!(statement.balance, 210000);
    let labels: Vec<String> = statement.history.iter().map(|op| op.label()).collect();
    assert_eq!(labels, vec!["+125.50€ deposited", "-25.50€ withdrawn"]);

    Ok(())
}

#[tokio::test]
async fn test_non_positive_amounts_rejected() -> Result<()> {
    let (mut service, _temp) = demo_service().await?;
    let ross = login_ross(&service)?;
    let when = at("2025-03-01", 9);

    for amount in [0, -500] {
        let err = service
            .deposit(&ross, AccountSelector::Primary, amount, when)
            .await
            .unwrap_err();
        assert_eq!(err.operation_error(), Some(&OperationError::InvalidAmount(amount)));

        let err = service
            .withdraw(&ross, AccountSelector::Primary, amount, when)
            .await
            .unwrap_err();
        assert_eq!(err.operation_error(), Some(&OperationError::InvalidAmount(amount)));
    }

    assert!(service.history(&ross, AccountSelector::Primary)?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_daily_withdrawal_limit() -> Result<()> {
    let (mut service, _temp) = demo_service().await?;
    let ross = login_ross(&service)?;

    service
        .withdraw(&ross, AccountSelector::Primary, 70000, at("2025-03-01", 9))
        .await?;
    let err = service
        .withdraw(&ross, AccountSelector::Primary, 30001, at("2025-03-01", 18))
        .await
        .unwrap_err();
    assert_eq!(
        err.operation_error(),
        Some(&OperationError::DailyLimitExceeded {
            limit: 100000,
            already_withdrawn: 70000,
            requested: 30001,
        })
    );

    // Exactly up to the limit is fine
    service
        .withdraw(&ross, AccountSelector::Primary, 30000, at("2025-03-01", 18))
        .await?;

    let overview = service.overview(&ross, at("2025-03-01", 19))?;
    assert_eq!(overview.withdrawn_today, 100000);
    assert_eq!(overview.balance, 100000);

    Ok(())
}

#[tokio::test]
async fn test_daily_limit_resets_on_next_day() -> Result<()> {
    let (mut service, _temp) = demo_service().await?;
    let ross = login_ross(&service)?;

    service
        .withdraw(&ross, AccountSelector::Primary, 100000, at("2025-03-01", 23))
        .await?;
    service
        .withdraw(&ross, AccountSelector::Primary, 100000, at("2025-03-02", 0))
        .await?;

    let overview = service.overview(&ross, at("2025-03-02", 12))?;
    assert_eq!(overview.balance, 0);
    assert_eq!(overview.withdrawn_today, 100000);

    Ok(())
}

#[tokio::test]
async fn test_insufficient_funds_reported_before_limit() -> Result<()> {
    let (mut service, _temp) = demo_service().await?;
    let ross = login_ross(&service)?;

    let err = service
        .withdraw(&ross, AccountSelector::Primary, 250000, at("2025-03-01", 9))
        .await
        .unwrap_err();
    assert!(matches!(
        err.operation_error(),
        Some(OperationError::InsufficientFunds { balance: 200000, required: 250000 })
    ));

    Ok(())
}

#[tokio::test]
async fn test_livret_operations() -> Result<()> {
    let (mut service, _temp) = demo_service().await?;
    let ross = login_ross(&service)?;

    let missing = service
        .deposit(&ross, AccountSelector::Savings, 1000, at("2025-03-01", 9))
        .await;
    assert!(matches!(
        missing,
        Err(AppError::Ledger(LedgerError::NoSavingsAccount(_)))
    ));

    let livret = service.open_savings(&ross).await?;
    assert_eq!(livret.name, "Livret A de Ross");

    service
        .deposit(&ross, AccountSelector::Savings, 1000, at("2025-03-01", 9))
        .await?;
    service
        .withdraw(&ross, AccountSelector::Savings, 400, at("2025-03-01", 10))
        .await?;

    let statement = service.statement(&ross, AccountSelector::Savings)?;
    assert_eq!(statement.balance, 600);
    assert_eq!(statement.number.as_str(), "LIV950201848");

    assert!(matches!(
        service.open_savings(&ross).await,
        Err(AppError::Ledger(LedgerError::SavingsAlreadyOpen(_)))
    ));

    Ok(())
}

#[tokio::test]
async fn test_custom_policy_limit() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let path = temp.path().join("ledger.json");
    let policy = guichet::domain::LedgerPolicy::default().with_daily_withdrawal_limit(5000);
    let mut service = guichet::application::BankService::init(&path, policy, true).await?;
    let ross = login_ross(&service)?;

    let err = service
        .withdraw(&ross, AccountSelector::Primary, 5001, at("2025-03-01", 9))
        .await
        .unwrap_err();
    assert!(matches!(
        err.operation_error(),
        Some(OperationError::DailyLimitExceeded { limit: 5000, .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_huge_deposit_rejected_without_changes() -> Result<()> {
    let (mut service, temp) = demo_service().await?;
    let ross = login_ross(&service)?;
    let amount = parse_cents("92233720368547758")?;

    let err = service
        .deposit(&ross, AccountSelector::Primary, amount, at("2025-03-01", 9))
        .await
        .unwrap_err();
    assert_eq!(err.operation_error(), Some(&OperationError::AmountTooLarge(amount)));

    let statement = service.statement(&ross, AccountSelector::Primary)?;
    assert_eq!(statement.balance, 200000);
    assert!(statement.history.is_empty());
    assert_eq!(service.ledger().last_sequence(), 0);

    // Up to the largest representable balance is still accepted
    let headroom = i64::MAX - 200000;
    let op = service
        .deposit(&ross, AccountSelector::Primary, headroom, at("2025-03-01", 10))
        .await?;
    assert_eq!(op.balance_after, i64::MAX);
    assert!(service
        .deposit(&ross, AccountSelector::Primary, 1, at("2025-03-01", 11))
        .await
        .is_err());

    let reopened = reopen(&temp).await?;
    assert_eq!(reopened.statement(&ross, AccountSelector::Primary)?.balance, i64::MAX);
    assert_eq!(reopened.history(&ross, AccountSelector::Primary)?.len(), 1);

    Ok(())
}
