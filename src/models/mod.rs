mod transfer;

pub use transfer::{TransferRecord, TransferTable};
