pub mod account;
pub mod payment;
pub mod response;
pub mod transaction;

pub use account::*;
pub use payment::*;
pub use response::*;
pub use transaction::*;
