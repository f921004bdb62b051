//! Mock chain server for local testing of sealed-bid sales.
//!
//! This provides a JSON-RPC server that hosts a single sale together with
//! in-memory token balances, vesting wallets and an address registry. Every
//! call takes the write lock for its whole duration, so calls are applied one
//! at a time in arrival order and a failed call leaves no trace.

use anyhow::Result;
use clap::Parser;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use sale_module::{
    InMemoryRegistry, SaleCall, SaleLifecycle, SaleQuery, SaleQueryResponse, SaleRuntime, TokenLedger,
};
use sale_types::{
    Address, SaleEvent, SalePhase, LEGION_BOUNCER_ID, LEGION_FEE_RECEIVER_ID, LEGION_SIGNER_ID,
    LEGION_VESTING_FACTORY_ID,
};

mod types;
use types::*;

#[derive(Parser)]
#[command(name = "sale-mock-chain")]
#[command(about = "JSON-RPC mock chain hosting one sealed-bid sale")]
struct Args {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:9944")]
    addr: SocketAddr,

    /// Chain id bound into investment authorizations
    #[arg(long, default_value = "1")]
    chain_id: u64,

    /// Initial block timestamp
    #[arg(long, default_value = "1700000000")]
    timestamp: u64,
}

/// Shared chain state.
struct ChainState {
    runtime: SaleRuntime,
    sale_address: Option<Address>,
}

impl ChainState {
    fn new(chain_id: u64, timestamp: u64) -> Self {
        Self {
            runtime: SaleRuntime::new(chain_id, timestamp, InMemoryRegistry::new()),
            sale_address: None,
        }
    }

    fn info(&self) -> ChainInfo {
        ChainInfo {
            chain_id: self.runtime.chain_id,
            timestamp: self.runtime.timestamp,
            sale_address: self.sale_address.map(to_hex),
        }
    }
}

/// RPC API definition for the mock chain.
#[rpc(server)]
pub trait MockChainApi {
    // ============ Admin Methods ============

    /// Install registry roles and create the sale, starting now.
    #[method(name = "admin_initSale")]
    async fn admin_init_sale(&self, request: InitSaleRequest) -> Result<ChainInfo, ErrorObjectOwned>;

    /// Set the current timestamp. Time never moves backwards.
    #[method(name = "admin_setTimestamp")]
    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<u64, ErrorObjectOwned>;

    /// Advance the clock by `seconds`.
    #[method(name = "admin_advanceTime")]
    async fn admin_advance_time(&self, seconds: u64) -> Result<u64, ErrorObjectOwned>;

    /// Mint test tokens. Returns the new balance.
    #[method(name = "admin_mint")]
    async fn admin_mint(&self, token: String, holder: String, amount: String) -> Result<String, ErrorObjectOwned>;

    /// Set an allowance on behalf of `owner`.
    #[method(name = "admin_approve")]
    async fn admin_approve(
        &self,
        token: String,
        owner: String,
        spender: String,
        amount: String,
    ) -> Result<bool, ErrorObjectOwned>;

    // ============ Sale Methods ============

    /// Execute a sale call from `sender`.
    #[method(name = "sale_call")]
    async fn sale_call(&self, sender: String, call: SaleCall) -> Result<CallReceipt, ErrorObjectOwned>;

    // ============ Query Methods ============

    /// Get chain info.
    #[method(name = "chain_getInfo")]
    async fn chain_get_info(&self) -> Result<ChainInfo, ErrorObjectOwned>;

    /// Run a raw sale query.
    #[method(name = "query_sale")]
    async fn query_sale(&self, query: SaleQuery) -> Result<SaleQueryResponse, ErrorObjectOwned>;

    /// Get sale totals.
    #[method(name = "query_status")]
    async fn query_status(&self) -> Result<StatusRpc, ErrorObjectOwned>;

    /// Get an investor position.
    #[method(name = "query_position")]
    async fn query_position(&self, investor: String) -> Result<PositionRpc, ErrorObjectOwned>;

    /// Get the phase at the current timestamp.
    #[method(name = "query_phase")]
    async fn query_phase(&self) -> Result<SalePhase, ErrorObjectOwned>;

    /// Get emitted events.
    #[method(name = "query_events")]
    async fn query_events(&self, offset: u64, limit: u64) -> Result<Vec<SaleEvent>, ErrorObjectOwned>;

    /// Get a token balance.
    #[method(name = "query_balance")]
    async fn query_balance(&self, token: String, holder: String) -> Result<String, ErrorObjectOwned>;
}

/// Implementation of the mock chain RPC server.
struct MockChainServer {
    state: Arc<RwLock<ChainState>>,
}

impl MockChainServer {
    fn new(chain_id: u64, timestamp: u64) -> Self {
        Self {
            state: Arc::new(RwLock::new(ChainState::new(chain_id, timestamp))),
        }
    }

    fn rpc_error(msg: &str) -> ErrorObjectOwned {
        ErrorObjectOwned::owned(-32000, msg.to_string(), None::<()>)
    }
}

#[async_trait]
impl MockChainApiServer for MockChainServer {
    async fn admin_init_sale(&self, request: InitSaleRequest) -> Result<ChainInfo, ErrorObjectOwned> {
        let sale_address = parse_address(&request.sale_address).map_err(|e| Self::rpc_error(&e))?;
        let roles = request.roles.parse().map_err(|e| Self::rpc_error(&e))?;
        let params = request.params.parse().map_err(|e| Self::rpc_error(&e))?;

        let mut state = self.state.write();
        let registry = state.runtime.registry.clone();
        let limits = state.runtime.limits;

        state.runtime.registry.set(LEGION_BOUNCER_ID, roles.operator);
        state.runtime.registry.set(LEGION_FEE_RECEIVER_ID, roles.fee_receiver);
        state.runtime.registry.set(LEGION_SIGNER_ID, roles.signer);
        state.runtime.registry.set(LEGION_VESTING_FACTORY_ID, roles.vesting_factory);
        if let Some(limits) = request.limits {
            state.runtime.limits = limits;
        }

        if let Err(e) = state.runtime.initialize_sale(sale_address, params) {
            state.runtime.registry = registry;
            state.runtime.limits = limits;
            return Err(Self::rpc_error(&e.to_string()));
        }

        state.sale_address = Some(sale_address);
        info!(
            "Sale initialized at {} (timestamp {})",
            to_hex(sale_address),
            state.runtime.timestamp
        );
        Ok(state.info())
    }

    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<u64, ErrorObjectOwned> {
        let mut state = self.state.write();
        let now = state.runtime.set_timestamp(timestamp);
        if now != timestamp {
            warn!("Ignoring timestamp {} before current time {}", timestamp, now);
        }
        Ok(now)
    }

    async fn admin_advance_time(&self, seconds: u64) -> Result<u64, ErrorObjectOwned> {
        let mut state = self.state.write();
        Ok(state.runtime.advance_time(seconds))
    }

    async fn admin_mint(&self, token: String, holder: String, amount: String) -> Result<String, ErrorObjectOwned> {
        let token = parse_address(&token).map_err(|e| Self::rpc_error(&e))?;
        let holder = parse_address(&holder).map_err(|e| Self::rpc_error(&e))?;
        let amount = parse_amount(&amount).map_err(|e| Self::rpc_error(&e))?;

        let mut state = self.state.write();
        state
            .runtime
            .tokens
            .mint(&token, &holder, amount)
            .map_err(|e| Self::rpc_error(&e.to_string()))?;
        Ok(state.runtime.tokens.balance_of(&token, &holder).to_string())
    }

    async fn admin_approve(
        &self,
        token: String,
        owner: String,
        spender: String,
        amount: String,
    ) -> Result<bool, ErrorObjectOwned> {
        let token = parse_address(&token).map_err(|e| Self::rpc_error(&e))?;
        let owner = parse_address(&owner).map_err(|e| Self::rpc_error(&e))?;
        let spender = parse_address(&spender).map_err(|e| Self::rpc_error(&e))?;
        let amount = parse_amount(&amount).map_err(|e| Self::rpc_error(&e))?;

        let mut state = self.state.write();
        state.runtime.tokens.approve(&token, &owner, &spender, amount);
        Ok(true)
    }

    async fn sale_call(&self, sender: String, call: SaleCall) -> Result<CallReceipt, ErrorObjectOwned> {
        let sender = parse_address(&sender).map_err(|e| Self::rpc_error(&e))?;
        let name = call.name();

        let mut state = self.state.write();
        let events = state
            .runtime
            .execute(sender, call)
            .map_err(|e| Self::rpc_error(&e.to_string()))?;

        info!("{} from {} emitted {} event(s)", name, to_hex(sender), events.len());
        Ok(CallReceipt {
            call: name.to_string(),
            events,
        })
    }

    async fn chain_get_info(&self) -> Result<ChainInfo, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state.info())
    }

    async fn query_sale(&self, query: SaleQuery) -> Result<SaleQueryResponse, ErrorObjectOwned> {
        let state = self.state.read();
        state.runtime.query(query).map_err(|e| Self::rpc_error(&e.to_string()))
    }

    async fn query_status(&self) -> Result<StatusRpc, ErrorObjectOwned> {
        let state = self.state.read();
        let sale = state
            .runtime
            .sale()
            .ok_or_else(|| Self::rpc_error("Sale not initialized"))?;
        Ok(StatusRpc::from(&sale.state.status))
    }

    async fn query_position(&self, investor: String) -> Result<PositionRpc, ErrorObjectOwned> {
        let investor = parse_address(&investor).map_err(|e| Self::rpc_error(&e))?;
        let state = self.state.read();
        let sale = state
            .runtime
            .sale()
            .ok_or_else(|| Self::rpc_error("Sale not initialized"))?;
        Ok(PositionRpc::new(&investor, &sale.state.position(&investor)))
    }

    async fn query_phase(&self) -> Result<SalePhase, ErrorObjectOwned> {
        let state = self.state.read();
        let sale = state
            .runtime
            .sale()
            .ok_or_else(|| Self::rpc_error("Sale not initialized"))?;
        Ok(sale.phase(state.runtime.timestamp))
    }

    async fn query_events(&self, offset: u64, limit: u64) -> Result<Vec<SaleEvent>, ErrorObjectOwned> {
        let state = self.state.read();
        match state.runtime.query(SaleQuery::Events { offset, limit }) {
            Ok(SaleQueryResponse::Events(events)) => Ok(events),
            Ok(_) => Err(Self::rpc_error("Unexpected query response")),
            Err(e) => Err(Self::rpc_error(&e.to_string())),
        }
    }

    async fn query_balance(&self, token: String, holder: String) -> Result<String, ErrorObjectOwned> {
        let token = parse_address(&token).map_err(|e| Self::rpc_error(&e))?;
        let holder = parse_address(&holder).map_err(|e| Self::rpc_error(&e))?;
        let state = self.state.read();
        Ok(state.runtime.tokens.balance_of(&token, &holder).to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sale_mock_chain=info".parse()?)
                .add_directive("sale_module=info".parse()?)
                .add_directive("jsonrpsee=warn".parse()?),
        )
        .init();

    let args = Args::parse();

    info!("Starting mock chain server on {} (chain id {})", args.addr, args.chain_id);

    let server = Server::builder().build(args.addr).await?;
    let handle = server.start(MockChainServer::new(args.chain_id, args.timestamp).into_rpc());

    info!("Mock chain server running. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}
