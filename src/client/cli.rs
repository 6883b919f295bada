use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use solpay_gateway::{
    config::Config,
    db::Database,
    middleware::JwtKeys,
    models::NewAccount,
    services::{
        solana_pay::{self, PaymentLabels, PaymentRequestUri},
        Ledger, PngQrRenderer, QrRenderer, SolanaRpcClient,
    },
};

#[derive(Parser)]
#[command(name = "solpay-cli", version, about = "Solana Pay gateway command-line tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a Solana Pay payment URL
    GenerateUrl {
        #[arg(long)]
        recipient: String,
        /// Payment amount in SOL
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        memo: Option<String>,
        /// Also print the QR code as a data URI
        #[arg(long)]
        qr: bool,
    },
    /// Verify a Solana payment against the expected recipient and amount
    Verify {
        #[arg(long)]
        signature: String,
        #[arg(long)]
        expected_recipient: String,
        #[arg(long)]
        expected_amount: f64,
    },
    /// Get the SOL balance of a wallet
    Balance {
        #[arg(long)]
        address: String,
    },
    /// Seed an account in the gateway database
    CreateAccount {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        fullname: String,
        #[arg(long, env = "SOLPAY_ACCOUNT_PASSWORD")]
        password: String,
        #[arg(long)]
        wallet_key: Option<String>,
    },
    /// Issue a bearer token for an existing account
    IssueToken {
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::GenerateUrl {
            recipient,
            amount,
            label,
            message,
            memo,
            qr,
        } => {
            let labels = PaymentLabels::new(label, message, memo);
            let url = PaymentRequestUri::new(&recipient, amount, labels)?.to_uri()?;
            println!("Payment URL: {}", url);

            if qr {
                println!("QR Code: {}", PngQrRenderer::default().render_data_uri(&url)?);
            }
        }

        Command::Verify {
            signature,
            expected_recipient,
            expected_amount,
        } => {
            let ledger = rpc_client(&config)?;
            let Some(tx) = ledger.get_transaction(&signature).await? else {
                bail!("Transaction not found: {}", signature);
            };

            let result = solana_pay::reconcile(&tx, &expected_recipient, expected_amount);
            if result.verified {
                println!("[OK] Payment verified");
            } else {
                println!("[FAILED] Payment verification failed: {}", result.message);
            }
            println!("Signature: {}", result.signature);
            if let Some(amount) = result.amount {
                println!("Amount: {} SOL", amount);
            }
            if let Some(recipient) = &result.recipient {
                println!("Recipient: {}", recipient);
            }
            if let Some(timestamp) = &result.timestamp {
                println!("Block time: {}", timestamp);
            }
            println!("Fee: {} lamports", tx.fee);

            if !result.verified {
                std::process::exit(1);
            }
        }

        Command::Balance { address } => {
            let ledger = rpc_client(&config)?;
            match ledger.get_balance(&address).await? {
                Some(lamports) => {
                    println!("Address: {}", address);
                    println!("Balance: {} SOL", solana_pay::lamports_to_sol(lamports));
                }
                None => bail!("Could not retrieve balance for {}", address),
            }
        }

        Command::CreateAccount {
            username,
            email,
            fullname,
            password,
            wallet_key,
        } => {
            let db = Database::connect(&config.database_url).await?;
            let account = db
                .accounts()
                .create(NewAccount {
                    username,
                    email,
                    fullname,
                    password,
                    wallet_key,
                })
                .await?;
            println!("Account created: {} <{}>", account.username, account.email);
        }

        Command::IssueToken { username } => {
            let db = Database::connect(&config.database_url).await?;
            if !db.accounts().exists(&username).await? {
                bail!("Account not found: {}", username);
            }

            let keys = JwtKeys::new(&config.jwt_secret, config.access_token_expire_minutes);
            println!("{}", keys.issue(&username)?);
        }
    }

    Ok(())
}

fn rpc_client(config: &Config) -> Result<SolanaRpcClient> {
    SolanaRpcClient::new(
        &config.solana_rpc_url,
        config.solana_rpc_fallback.as_deref(),
        config.rpc_timeout_secs,
    )
}
