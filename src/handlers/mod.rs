pub mod checkout;
pub mod extract;
pub mod health;
pub mod transactions;

pub use checkout::*;
pub use extract::*;
pub use health::*;
pub use transactions::*;
