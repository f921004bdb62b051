//! CLI for interacting with sealed-bid token sales.
//!
//! This binary provides commands for:
//! - Generating auction keys and sealing bids offline
//! - Signing investment authorizations
//! - Investing, refunding and settling against the mock chain
//! - Decrypting bids and building the published results

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use sale_client::encoding::{parse_address, parse_bytes, parse_signature, parse_word, to_hex};
use sale_client::{collect_bids, create_sealed_bid, Allocation, InvestmentAuthorizer, ResultsBuilder, SaleResultsBundle};
use sale_crypto::{open_sealed_bid, AuctionKeypair};
use sale_module::SaleCall;
use sale_types::{SaleEvent, SalePhase};

#[derive(Parser)]
#[command(name = "sale-cli")]
#[command(about = "CLI for sealed-bid token sales")]
struct Cli {
    /// Mock chain RPC endpoint
    #[arg(long, default_value = "http://127.0.0.1:9944")]
    rpc: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an auction keypair
    Keygen,

    /// Seal a bid amount for an investor
    Seal {
        /// Auction private key (hex)
        #[arg(long)]
        private_key: String,

        /// Investor address (hex)
        #[arg(long)]
        investor: String,

        /// Token amount bid for (kept secret until publication)
        #[arg(long)]
        amount_out: u128,
    },

    /// Sign an investment authorization
    Sign {
        /// secp256k1 signer secret (hex)
        #[arg(long)]
        signer_key: String,

        /// Investor address (hex)
        #[arg(long)]
        investor: String,

        /// Sale address (hex)
        #[arg(long)]
        sale: String,

        #[arg(long, default_value = "1")]
        chain_id: u64,
    },

    /// Decrypt a logged bid
    Decrypt {
        /// Auction private key (hex)
        #[arg(long)]
        private_key: String,

        /// Encrypted amount (hex)
        #[arg(long)]
        encrypted: String,

        /// Salt (hex)
        #[arg(long)]
        salt: String,
    },

    /// Decrypt every live bid on the sale
    OpenBids {
        /// Auction private key (hex)
        #[arg(long)]
        private_key: String,
    },

    /// Build the results bundle from an allocations file
    BuildResults {
        /// Auction private key (hex)
        #[arg(long)]
        private_key: String,

        /// JSON list of allocations
        #[arg(long)]
        allocations: PathBuf,

        /// Where to write the bundle (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Create the sale from a JSON request file
    InitSale {
        #[arg(long)]
        file: PathBuf,
    },

    /// Invest with a sealed bid
    Invest {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Capital invested (visible on-chain)
        #[arg(long)]
        amount: u128,

        /// ABI-encoded sealed bid (hex)
        #[arg(long)]
        sealed_bid: String,

        /// Investment authorization (hex)
        #[arg(long)]
        signature: String,
    },

    /// Refund during the refund period
    Refund {
        #[arg(long)]
        sender: String,
    },

    /// Lock cancellation ahead of publication
    InitPublish {
        #[arg(long)]
        sender: String,
    },

    /// Publish results from a bundle file
    Publish {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        results: PathBuf,
    },

    /// Claim the sender's token allocation from a bundle file
    Claim {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        results: PathBuf,
    },

    /// Withdraw the sender's unaccepted capital from a bundle file
    WithdrawExcess {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        results: PathBuf,
    },

    /// Supply the sold tokens (project admin)
    SupplyTokens {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        amount: u128,

        #[arg(long)]
        legion_fee: u128,

        #[arg(long)]
        referrer_fee: u128,
    },

    /// Send any sale call as JSON
    Call {
        #[arg(long)]
        sender: String,

        /// JSON-encoded call, e.g. '"CancelSale"'
        #[arg(long)]
        call: String,
    },

    /// Get sale totals
    Status,

    /// Get an investor position
    Position {
        #[arg(long)]
        investor: String,
    },

    /// Get the current phase
    Phase,

    /// List emitted events
    Events {
        #[arg(long, default_value = "0")]
        offset: u64,

        #[arg(long, default_value = "100")]
        limit: u64,
    },

    /// Get a token balance
    Balance {
        #[arg(long)]
        token: String,

        #[arg(long)]
        holder: String,
    },

    /// Mint test tokens
    Mint {
        #[arg(long)]
        token: String,

        #[arg(long)]
        holder: String,

        #[arg(long)]
        amount: u128,
    },

    /// Approve a spender (usually the sale)
    Approve {
        #[arg(long)]
        token: String,

        #[arg(long)]
        owner: String,

        #[arg(long)]
        spender: String,

        #[arg(long)]
        amount: u128,
    },

    /// Set chain timestamp (for testing)
    SetTimestamp {
        #[arg(long)]
        timestamp: u64,
    },

    /// Advance chain time (for testing)
    AdvanceTime {
        #[arg(long)]
        seconds: u64,
    },
}

// RPC types (matching mock-chain)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChainInfo {
    chain_id: u64,
    timestamp: u64,
    sale_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CallReceipt {
    call: String,
    events: Vec<SaleEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatusRpc {
    total_capital_invested: String,
    total_tokens_allocated: String,
    total_capital_raised: String,
    claim_tokens_merkle_root: String,
    accepted_capital_merkle_root: String,
    is_canceled: bool,
    tokens_supplied: bool,
    capital_withdrawn: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PositionRpc {
    investor: String,
    invested_capital: String,
    has_refunded: bool,
    has_claimed_excess: bool,
    has_settled: bool,
    vesting_address: Option<String>,
}

fn keypair_from_hex(private_key: &str) -> Result<AuctionKeypair> {
    Ok(AuctionKeypair::from_private_key(parse_word(private_key)?)?)
}

fn public_key_hex(keypair: &AuctionKeypair) -> String {
    format!(
        "0x{}{}",
        hex::encode(keypair.public_key.x),
        hex::encode(keypair.public_key.y)
    )
}

fn read_bundle(path: &Path) -> Result<SaleResultsBundle> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

fn keygen_cmd() -> Result<()> {
    let keypair = AuctionKeypair::generate(&mut OsRng);
    println!("Auction keypair:");
    println!("  Private key: {}", to_hex(keypair.private_key));
    println!("  Public key:  {}", public_key_hex(&keypair));
    Ok(())
}

fn seal_cmd(private_key: &str, investor: &str, amount_out: u128) -> Result<()> {
    let keypair = keypair_from_hex(private_key)?;
    let investor = parse_address(investor)?;
    let bid = create_sealed_bid(&keypair, &investor, amount_out)?;

    println!("Sealed bid:");
    println!("  Encrypted: {}", to_hex(bid.sealed_bid.encrypted_amount_out));
    println!("  Salt:      {}", to_hex(bid.sealed_bid.salt));
    println!("  Encoded:   {}", to_hex(&bid.encoded));
    Ok(())
}

fn sign_cmd(signer_key: &str, investor: &str, sale: &str, chain_id: u64) -> Result<()> {
    let authorizer = InvestmentAuthorizer::from_hex(signer_key, chain_id)?;
    let signature = authorizer.authorize(&parse_address(investor)?, &parse_address(sale)?)?;

    println!("Authorization:");
    println!("  Signer:    {}", to_hex(authorizer.address()));
    println!("  Signature: {}", to_hex(signature.0));
    Ok(())
}

fn decrypt_cmd(private_key: &str, encrypted: &str, salt: &str) -> Result<()> {
    let keypair = keypair_from_hex(private_key)?;
    let amount = open_sealed_bid(
        &parse_word(encrypted)?,
        &parse_word(salt)?,
        &keypair.public_key,
        &keypair.private_key,
    )?;
    println!("Decrypted amount: {}", amount);
    Ok(())
}

fn build_results_cmd(private_key: &str, allocations: &Path, out: Option<&Path>) -> Result<()> {
    let keypair = keypair_from_hex(private_key)?;
    let allocations: Vec<Allocation> = serde_json::from_str(&std::fs::read_to_string(allocations)?)?;
    let bundle = ResultsBuilder::new(&keypair).allocations(allocations)?.build()?;
    let json = serde_json::to_string_pretty(&bundle)?;

    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Results bundle written to {}", path.display());
            println!("  Claim root:       {}", to_hex(bundle.claim_merkle_root));
            println!("  Accepted root:    {}", to_hex(bundle.accepted_merkle_root));
            println!("  Tokens allocated: {}", bundle.tokens_allocated);
            println!("  Capital raised:   {}", bundle.capital_raised);
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn open_bids_cmd(client: &HttpClient, private_key: &str) -> Result<()> {
    let keypair = keypair_from_hex(private_key)?;
    let events: Vec<SaleEvent> = client.request("query_events", rpc_params![0u64, u64::MAX]).await?;
    let bids = collect_bids(&events, &keypair)?;

    println!("Live bids ({}):", bids.len());
    for bid in bids {
        println!(
            "  {} invested {} for {}",
            to_hex(bid.investor),
            bid.invested_capital,
            bid.amount_out
        );
    }
    Ok(())
}

async fn init_sale_cmd(client: &HttpClient, file: &Path) -> Result<()> {
    let request: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(file)?)?;
    let info: ChainInfo = client.request("admin_initSale", rpc_params![request]).await?;

    println!("Sale created:");
    println!("  Address:   {}", info.sale_address.unwrap_or_default());
    println!("  Chain ID:  {}", info.chain_id);
    println!("  Timestamp: {}", info.timestamp);
    Ok(())
}

async fn call_cmd(client: &HttpClient, sender: &str, call: SaleCall) -> Result<()> {
    // Validate locally before sending
    parse_address(sender)?;
    info!("Sending {} from {}", call.name(), sender);

    let receipt: CallReceipt = client.request("sale_call", rpc_params![sender, call]).await?;

    println!("{} committed:", receipt.call);
    for event in &receipt.events {
        println!("  {}: {}", event.name(), serde_json::to_string(event)?);
    }
    Ok(())
}

async fn bundle_call_cmd(
    client: &HttpClient,
    sender: &str,
    results: &Path,
    pick: impl Fn(&SaleResultsBundle, &sale_types::Address) -> Option<SaleCall>,
) -> Result<()> {
    let bundle = read_bundle(results)?;
    let investor = parse_address(sender)?;
    let call = pick(&bundle, &investor).ok_or_else(|| anyhow!("Nothing to settle for {}", sender))?;
    call_cmd(client, sender, call).await
}

async fn status_cmd(client: &HttpClient) -> Result<()> {
    let status: StatusRpc = client.request("query_status", rpc_params![]).await?;

    println!("Sale status:");
    println!("  Capital invested: {}", status.total_capital_invested);
    println!("  Capital raised:   {}", status.total_capital_raised);
    println!("  Tokens allocated: {}", status.total_tokens_allocated);
    println!("  Claim root:       {}", status.claim_tokens_merkle_root);
    println!("  Accepted root:    {}", status.accepted_capital_merkle_root);
    println!("  Canceled:         {}", status.is_canceled);
    println!("  Tokens supplied:  {}", status.tokens_supplied);
    println!("  Capital withdrawn: {}", status.capital_withdrawn);
    Ok(())
}

async fn position_cmd(client: &HttpClient, investor: &str) -> Result<()> {
    let position: PositionRpc = client.request("query_position", rpc_params![investor]).await?;

    println!("Position {}:", position.investor);
    println!("  Invested capital: {}", position.invested_capital);
    println!("  Refunded:         {}", position.has_refunded);
    println!("  Claimed excess:   {}", position.has_claimed_excess);
    println!("  Settled:          {}", position.has_settled);
    if let Some(vesting) = position.vesting_address {
        println!("  Vesting wallet:   {}", vesting);
    }
    Ok(())
}

async fn phase_cmd(client: &HttpClient) -> Result<()> {
    let phase: SalePhase = client.request("query_phase", rpc_params![]).await?;
    println!("Phase: {:?}", phase);
    Ok(())
}

async fn events_cmd(client: &HttpClient, offset: u64, limit: u64) -> Result<()> {
    let events: Vec<SaleEvent> = client.request("query_events", rpc_params![offset, limit]).await?;

    if events.is_empty() {
        println!("No events");
        return Ok(());
    }
    for (i, event) in events.iter().enumerate() {
        println!("{:>4} {}: {}", offset + i as u64, event.name(), serde_json::to_string(event)?);
    }
    Ok(())
}

async fn balance_cmd(client: &HttpClient, token: &str, holder: &str) -> Result<()> {
    let balance: String = client.request("query_balance", rpc_params![token, holder]).await?;
    println!("Balance: {}", balance);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("sale_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let client = HttpClientBuilder::default().build(&cli.rpc)?;

    match cli.command {
        Commands::Keygen => keygen_cmd()?,
        Commands::Seal {
            private_key,
            investor,
            amount_out,
        } => seal_cmd(&private_key, &investor, amount_out)?,
        Commands::Sign {
            signer_key,
            investor,
            sale,
            chain_id,
        } => sign_cmd(&signer_key, &investor, &sale, chain_id)?,
        Commands::Decrypt {
            private_key,
            encrypted,
            salt,
        } => decrypt_cmd(&private_key, &encrypted, &salt)?,
        Commands::OpenBids { private_key } => open_bids_cmd(&client, &private_key).await?,
        Commands::BuildResults {
            private_key,
            allocations,
            out,
        } => build_results_cmd(&private_key, &allocations, out.as_deref())?,
        Commands::InitSale { file } => init_sale_cmd(&client, &file).await?,
        Commands::Invest {
            sender,
            amount,
            sealed_bid,
            signature,
        } => {
            let call = SaleCall::Invest {
                amount,
                sealed_bid: parse_bytes(&sealed_bid)?,
                signature: parse_signature(&signature)?,
            };
            call_cmd(&client, &sender, call).await?
        }
        Commands::Refund { sender } => call_cmd(&client, &sender, SaleCall::Refund).await?,
        Commands::InitPublish { sender } => {
            call_cmd(&client, &sender, SaleCall::InitializePublishSaleResults).await?
        }
        Commands::Publish { sender, results } => {
            let bundle = read_bundle(&results)?;
            call_cmd(&client, &sender, bundle.publish_call()).await?
        }
        Commands::Claim { sender, results } => {
            bundle_call_cmd(&client, &sender, &results, |bundle, investor| bundle.claim_call(investor)).await?
        }
        Commands::WithdrawExcess { sender, results } => {
            bundle_call_cmd(&client, &sender, &results, |bundle, investor| {
                bundle.withdraw_excess_call(investor)
            })
            .await?
        }
        Commands::SupplyTokens {
            sender,
            amount,
            legion_fee,
            referrer_fee,
        } => {
            let call = SaleCall::SupplyTokens {
                amount,
                legion_fee,
                referrer_fee,
            };
            call_cmd(&client, &sender, call).await?
        }
        Commands::Call { sender, call } => {
            let call: SaleCall = serde_json::from_str(&call)?;
            call_cmd(&client, &sender, call).await?
        }
        Commands::Status => status_cmd(&client).await?,
        Commands::Position { investor } => position_cmd(&client, &investor).await?,
        Commands::Phase => phase_cmd(&client).await?,
        Commands::Events { offset, limit } => events_cmd(&client, offset, limit).await?,
        Commands::Balance { token, holder } => balance_cmd(&client, &token, &holder).await?,
        Commands::Mint { token, holder, amount } => {
            let balance: String = client
                .request("admin_mint", rpc_params![token, holder, amount.to_string()])
                .await?;
            println!("Minted {}, balance now {}", amount, balance);
        }
        Commands::Approve {
            token,
            owner,
            spender,
            amount,
        } => {
            let _: bool = client
                .request("admin_approve", rpc_params![token, owner, &spender, amount.to_string()])
                .await?;
            println!("Approved {} for {}", amount, spender);
        }
        Commands::SetTimestamp { timestamp } => {
            let now: u64 = client.request("admin_setTimestamp", rpc_params![timestamp]).await?;
            println!("Timestamp: {}", now);
        }
        Commands::AdvanceTime { seconds } => {
            let now: u64 = client.request("admin_advanceTime", rpc_params![seconds]).await?;
            println!("Timestamp: {}", now);
        }
    }

    Ok(())
}
