mod account;
mod evolution;
mod ledger;
mod money;
mod operation;
mod policy;

pub use account::*;
pub use evolution::*;
pub use ledger::*;
pub use money::*;
pub use operation::*;
pub use policy::*;
