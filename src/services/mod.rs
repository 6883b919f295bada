pub mod cache;
pub mod checkout;
pub mod ledger;
pub mod provider;
pub mod qr;
pub mod solana_pay;

pub use cache::CacheService;
pub use checkout::CheckoutService;
pub use ledger::{Ledger, SolanaRpcClient};
pub use provider::{CandyPayClient, PaymentProvider};
pub use qr::{PngQrRenderer, QrRenderer};
