// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use guichet::application::{BankService, Session};
use guichet::domain::LedgerPolicy;
use tempfile::TempDir;

pub const ROSS: &str = "950201848";
pub const ROSS_PIN: &str = "1350";
pub const RACHEL: &str = "194572957";
pub const RACHEL_PIN: &str = "3450";

/// Helper to create a service over a fresh, empty ledger file
pub async fn test_service() -> Result<(BankService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("ledger.json");
    let service = BankService::init(&path, LedgerPolicy::default(), false).await?;
    Ok((service, temp_dir))
}

/// Helper to create a service seeded with Ross and Rachel (2000.00 each)
pub async fn demo_service() -> Result<(BankService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("ledger.json");
    let service = BankService::init(&path, LedgerPolicy::default(), true).await?;
    Ok((service, temp_dir))
}

/// Reopen the ledger file written by a service created with the helpers above
pub async fn reopen(temp_dir: &TempDir) -> Result<BankService> {
    Ok(BankService::open(temp_dir.path().join("ledger.json")).await?)
}

pub fn login_ross(service: &BankService) -> Result<Session> {
    Ok(service.login(ROSS, ROSS_PIN)?)
}

pub fn login_rachel(service: &BankService) -> Result<Session> {
    Ok(service.login(RACHEL, RACHEL_PIN)?)
}

/// Helper to parse a date string into DateTime<Utc> at the given hour
pub fn at(date_str: &str, hour: u32) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
        .and_utc()
}
