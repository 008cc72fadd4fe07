mod common;

use anyhow::Result;
use chrono::Utc;
use common::{
    at, demo_service, login_rachel, login_ross, reopen, test_service, RACHEL, ROSS, ROSS_PIN,
};
use guichet::application::AppError;
use guichet::domain::{AccountSelector, CredentialError, LedgerError, LedgerPolicy};
use guichet::application::BankService;

#[tokio::test]
async fn test_demo_ledger_has_two_customers() -> Result<()> {
    let (service, _temp) = demo_service().await?;

    let accounts = service.list_accounts();
    assert_eq!(accounts.len(), 2);
    // Ordered by account number
    assert_eq!(accounts[0].name, "Rachel");
    assert_eq!(accounts[1].name, "Ross");
    assert!(accounts.iter().all(|a| a.balance == 200000));
    assert!(accounts.iter().all(|a| a.savings_balance.is_none()));

    Ok(())
}

#[tokio::test]
async fn test_init_refuses_existing_ledger() -> Result<()> {
    let (_service, temp) = test_service().await?;
    let path = temp.path().join("ledger.json");

    let result = BankService::init(&path, LedgerPolicy::default(), false).await;
    assert!(matches!(result, Err(AppError::Storage(_))));

    Ok(())
}

#[tokio::test]
async fn test_init_rejects_invalid_policy() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let path = temp.path().join("ledger.json");

    let policy = LedgerPolicy::default().with_daily_withdrawal_limit(0);
    let result = BankService::init(&path, policy, false).await;
    assert!(matches!(result, Err(AppError::InvalidPolicy(_))));
    assert!(!path.exists(), "No file should be written for a rejected policy");

    Ok(())
}

#[tokio::test]
async fn test_login_validation() -> Result<()> {
    let (service, _temp) = demo_service().await?;

    assert_eq!(login_ross(&service)?.name, "Ross");

    let cases = [
        ("95020184", ROSS_PIN, CredentialError::InvalidAccountNumber),
        ("95020184x", ROSS_PIN, CredentialError::InvalidAccountNumber),
        (ROSS, "135", CredentialError::InvalidPin),
        (ROSS, "0000", CredentialError::Mismatch),
        ("123456789", ROSS_PIN, CredentialError::Mismatch),
        (" 950201848", ROSS_PIN, CredentialError::InvalidAccountNumber),
        ("950201848 ", ROSS_PIN, CredentialError::InvalidAccountNumber),
        (ROSS, "1350 ", CredentialError::InvalidPin),
        (ROSS, "\t1350", CredentialError::InvalidPin),
    ];
    for (number, pin, expected) in cases {
        match service.login(number, pin) {
            Err(AppError::Credentials(err)) => assert_eq!(err, expected, "{} / {}", number, pin),
            other => panic!("expected credential error for {}, got {:?}", number, other.map(|s| s.number)),
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_open_account_and_login() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let account = service.open_account("Monica", "123456789", "4242", 50000).await?;
    assert_eq!(account.balance, 50000);

    let session = service.login("123456789", "4242")?;
    assert_eq!(session.name, "Monica");

    let dup = service.open_account("Chandler", "123456789", "1111", 0).await;
    assert!(matches!(
        dup,
        Err(AppError::Ledger(LedgerError::AccountExists(_)))
    ));

    Ok(())
}

#[tokio::test]
async fn test_open_account_validation() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    assert!(matches!(
        service.open_account("  ", "123456789", "4242", 0).await,
        Err(AppError::InvalidName)
    ));
    assert!(matches!(
        service.open_account("Joey", "123", "4242", 0).await,
        Err(AppError::Credentials(CredentialError::InvalidAccountNumber))
    ));
    assert!(matches!(
        service.open_account("Joey", "123456789", "42", 0).await,
        Err(AppError::Credentials(CredentialError::InvalidPin))
    ));
    assert!(matches!(
        service.open_account("Joey", "123456789", "4242", -1).await,
        Err(AppError::NegativeOpeningBalance(-1))
    ));
    assert!(service.list_accounts().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_operations_are_persisted() -> Result<()> {
    let (mut service, temp) = demo_service().await?;
    let ross = login_ross(&service)?;

    service.open_savings(&ross).await?;
    service
        .deposit(&ross, AccountSelector::Primary, 10000, at("2025-01-10", 9))
        .await?;
    service
        .transfer_internal(&ross, AccountSelector::Primary, 30000, at("2025-01-10", 10))
        .await?;
    service
        .transfer_external(&ross, AccountSelector::Primary, RACHEL, 5000, at("2025-01-11", 9))
        .await?;

    let reopened = reopen(&temp).await?;
    let ross = login_ross(&reopened)?;
    let overview = reopened.overview(&ross, Utc::now())?;

    // 2000 + 100 - 300 - 50 - 0.50
    assert_eq!(overview.balance, 174950);
    assert_eq!(overview.savings.map(|s| s.balance), Some(30000));

    let rachel = login_rachel(&reopened)?;
    assert_eq!(reopened.overview(&rachel, Utc::now())?.balance, 205000);
    assert_eq!(reopened.ledger().last_sequence(), 3);

    Ok(())
}

#[tokio::test]
async fn test_rejected_operation_does_not_touch_file() -> Result<()> {
    let (mut service, temp) = demo_service().await?;
    let ross = login_ross(&service)?;
    let path = temp.path().join("ledger.json");

    let before = std::fs::read_to_string(&path)?;
    let result = service
        .withdraw(&ross, AccountSelector::Primary, 999999, Utc::now())
        .await;
    assert!(result.is_err());
    let after = std::fs::read_to_string(&path)?;

    assert_eq!(before, after);
    Ok(())
}
