mod store;

pub use store::*;

/// Version written into every ledger file
pub const FORMAT_VERSION: u32 = 1;
