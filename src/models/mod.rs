pub mod finance;
pub mod invoice;
pub mod measurement;
pub mod order;
pub mod record;

pub use finance::{FinancialRecord, RecordKind};
pub use invoice::{ClientInfo, InvoiceDraft, InvoiceRecord, LineItem};
pub use measurement::{
    BlouseMeasurements, ClientMeasurements, Gender, GownMeasurements, JacketMeasurements,
    SkirtMeasurements, TrouserMeasurements,
};
pub use order::{OrderItem, OrderStatus, Priority};
pub use record::{Stored, UserId};
