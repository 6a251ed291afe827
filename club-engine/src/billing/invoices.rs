//! Invoices: monthly dues run, payment events, sending
//!
//! Balances move in the same transaction as the invoice they belong to.

use super::money::{to_decimal, to_f64};
use crate::club::{ClubContext, ClubError, ClubResult};
use crate::utils::time::{billing_period, local_date};
use chrono::Days;
use serde::{Deserialize, Serialize};
use shared::models::{
    AuditAction, Invoice, InvoiceItem, InvoiceSource, InvoiceStatus, Member, MemberStatus,
    MembershipTier,
};

/// Days until a dues invoice is due
pub const DUES_INVOICE_DUE_DAYS: u64 = 14;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuesRunReport {
    pub period: String,
    pub created: Vec<Invoice>,
    /// Members already billed for this period
    pub already_billed: usize,
    /// Members with zero dues
    pub skipped: usize,
}

/// Bill monthly dues to every member that is not INACTIVE
///
/// One invoice per member per billing month; re-running the same month only
/// reports what was already billed.
pub fn generate_monthly_invoices(ctx: &ClubContext<'_>) -> ClubResult<DuesRunReport> {
    let period = billing_period(ctx.now, ctx.tz);
    let club_dues = ctx.settings()?.map(|s| s.monthly_dues).unwrap_or_default();
    let today = local_date(ctx.now, ctx.tz);
    let due_date = today
        .checked_add_days(Days::new(DUES_INVOICE_DUE_DAYS))
        .unwrap_or(today);

    let mut report = DuesRunReport {
        period: period.clone(),
        ..Default::default()
    };

    let members: Vec<Member> = ctx.storage.all(ctx.txn)?;
    for mut member in members {
        if member.status == MemberStatus::Inactive {
            continue;
        }
        if ctx.storage.dues_invoice(ctx.txn, member.id, &period)?.is_some() {
            report.already_billed += 1;
            continue;
        }

        let tier_dues = match member.tier_id {
            Some(tier_id) => ctx.find::<MembershipTier>(tier_id)?.map(|t| t.monthly_dues),
            None => None,
        };
        let dues = to_f64(to_decimal(tier_dues.unwrap_or(club_dues)));
        if dues <= 0.0 {
            report.skipped += 1;
            continue;
        }

        let description = format!("Monthly dues {period}");
        let invoice = Invoice {
            id: shared::util::snowflake_id(),
            member_id: member.id,
            amount: dues,
            status: InvoiceStatus::Draft,
            due_date,
            description: description.clone(),
            items: vec![InvoiceItem {
                description,
                quantity: 1.0,
                unit_price: dues,
                amount: dues,
            }],
            source: InvoiceSource::MonthlyDues {
                period: period.clone(),
            },
            paid_at: None,
            created_at: ctx.now,
            updated_at: ctx.now,
        };
        ctx.storage.insert_invoice(ctx.txn, &invoice)?;
        ctx.storage
            .record_dues_invoice(ctx.txn, member.id, &period, invoice.id)?;

        member.balance = to_f64(to_decimal(member.balance) + to_decimal(dues));
        member.updated_at = ctx.now;
        ctx.save(&member)?;

        report.created.push(invoice);
    }

    tracing::info!(
        period = %report.period,
        created = report.created.len(),
        already_billed = report.already_billed,
        skipped = report.skipped,
        "Monthly dues run finished"
    );
    Ok(report)
}

/// Apply a payment-gateway "invoice paid" event
///
/// Returns `false` when the invoice was already PAID (nothing changes).
pub fn mark_invoice_paid(ctx: &ClubContext<'_>, invoice_id: i64) -> ClubResult<(Invoice, bool)> {
    let mut invoice: Invoice = ctx.load(invoice_id)?;
    if invoice.status == InvoiceStatus::Paid {
        tracing::debug!(invoice_id, "Invoice already paid, ignoring event");
        return Ok((invoice, false));
    }

    invoice.status = InvoiceStatus::Paid;
    invoice.paid_at = Some(ctx.now);
    invoice.updated_at = ctx.now;
    ctx.save(&invoice)?;

    let mut member: Member = ctx.load(invoice.member_id)?;
    member.balance = to_f64(to_decimal(member.balance) - to_decimal(invoice.amount));
    member.updated_at = ctx.now;
    ctx.save(&member)?;

    ctx.audit(
        AuditAction::InvoicePaid,
        "invoice",
        invoice.id,
        Some(member.id),
        serde_json::json!({ "amount": invoice.amount }),
    )?;
    Ok((invoice, true))
}

/// DRAFT → SENT
pub fn send_invoice(ctx: &ClubContext<'_>, invoice_id: i64) -> ClubResult<Invoice> {
    let mut invoice: Invoice = ctx.load(invoice_id)?;
    if invoice.status != InvoiceStatus::Draft {
        return Err(ClubError::InvalidTransition(format!(
            "invoice {} is {:?}, only DRAFT invoices can be sent",
            invoice.id, invoice.status
        )));
    }
    invoice.status = InvoiceStatus::Sent;
    invoice.updated_at = ctx.now;
    ctx.save(&invoice)?;
    tracing::info!(invoice_id, member_id = invoice.member_id, "Invoice sent");
    Ok(invoice)
}

/// Completed flights keep their invoice; corrections are a separate invoice
pub fn void_invoice(ctx: &ClubContext<'_>, invoice_id: i64) -> ClubResult<Invoice> {
    let invoice: Invoice = ctx.load(invoice_id)?;
    Err(ClubError::Unsupported(format!(
        "invoice {} cannot be voided or regenerated",
        invoice.id
    )))
}
