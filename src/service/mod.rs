pub mod export;
pub mod filter;
pub mod invoice_number;
pub mod records;
pub mod session;
pub mod summary;
pub mod totals;
pub mod urgency;
pub mod views;

pub use records::{RecordService, Resource};
pub use session::{Confirmation, Session};
pub use summary::{FinancialSummary, InvoiceListRow, InvoicePreview, OrderSummary};
pub use totals::{BalanceState, InvoiceTotals};
pub use urgency::{Notification, Urgency};
pub use views::{InvoiceEditor, ListView, OrderBoard};
