use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{BankService, Session};
use crate::domain::{format_cents, AccountNumber, AccountSelector, Cents, Operation};

/// Account history as written by the JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExport {
    pub exported_at: DateTime<Utc>,
    pub name: String,
    pub number: AccountNumber,
    pub balance: Cents,
    pub operations: Vec<Operation>,
}

/// Exporter for converting account data to CSV or JSON
pub struct Exporter<'a> {
    service: &'a BankService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a BankService) -> Self {
        Self { service }
    }

    /// Export one account's history to CSV. Amounts are decimal strings.
    pub fn export_history_csv<W: Write>(
        &self,
        session: &Session,
        which: AccountSelector,
        writer: W,
    ) -> Result<usize> {
        let statement = self.service.statement(session, which)?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "sequence",
            "timestamp",
            "kind",
            "amount",
            "fee",
            "counterparty",
            "balance_after",
            "label",
        ])?;

        for op in &statement.history {
            csv_writer.write_record(&[
                op.sequence.to_string(),
                op.timestamp.to_rfc3339(),
                op.kind.to_string(),
                format_cents(op.amount),
                format_cents(op.fee),
                op.counterparty
                    .as_ref()
                    .map(|c| c.number.to_string())
                    .unwrap_or_default(),
                format_cents(op.balance_after),
                op.label(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(statement.history.len())
    }

    /// Export one account's history as pretty JSON.
    pub fn export_history_json<W: Write>(
        &self,
        session: &Session,
        which: AccountSelector,
        mut writer: W,
    ) -> Result<HistoryExport> {
        let statement = self.service.statement(session, which)?;
        let export = HistoryExport {
            exported_at: Utc::now(),
            name: statement.name,
            number: statement.number,
            balance: statement.balance,
            operations: statement.history,
        };

        serde_json::to_writer_pretty(&mut writer, &export)?;
        writeln!(writer)?;
        Ok(export)
    }

    /// Export the balance evolution series to CSV.
    pub fn export_evolution_csv<W: Write>(&self, session: &Session, writer: W) -> Result<usize> {
        let report = self.service.evolution(session)?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["sequence", "timestamp", "primary", "savings", "total", "label"])?;
        for point in &report.points {
            csv_writer.write_record(&[
                point.sequence.to_string(),
                point.timestamp.to_rfc3339(),
                format_cents(point.primary),
                format_cents(point.savings),
                format_cents(point.total),
                point.label.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(report.points.len())
    }
}
