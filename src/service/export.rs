use std::io::Write;

use crate::models::{InvoiceRecord, Stored};
use crate::service::totals::InvoiceTotals;

const LEDGER_HEADER: [&str; 12] = [
    "id",
    "invoice_number",
    "client_name",
    "date",
    "due_date",
    "subtotal",
    "discount",
    "tax",
    "total",
    "received",
    "balance_due",
    "notes",
];

/// 导出发票台账 CSV (每张发票一行, 金额与列表一致)
pub fn write_invoice_ledger<W: Write>(
    invoices: &[Stored<InvoiceRecord>],
    output: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(LEDGER_HEADER)?;

    for invoice in invoices {
        let record = &invoice.data;
        let totals = InvoiceTotals::for_record(record);
        writer.write_record(&[
            invoice.id.to_string(),
            record.invoice_number.clone(),
            record.client_name.clone(),
            record.date.to_string(),
            record.due_date.to_string(),
            totals.subtotal.to_string(),
            totals.discount_amount.to_string(),
            totals.tax_amount.to_string(),
            totals.total.to_string(),
            totals.received_amount.to_string(),
            totals.balance_due.to_string(),
            record.notes.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
