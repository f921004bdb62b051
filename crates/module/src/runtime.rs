//! Transactional host for a single sale.
//!
//! Every call runs against a snapshot of the sale and its collaborators.
//! If the call fails the snapshot is restored, so no partial write from a
//! failed call is ever observable.

use tracing::{debug, warn};

use sale_types::{Address, SaleEvent};

use crate::call::SaleCall;
use crate::error::SaleError;
use crate::handlers::{handle_call, CallContext, HandlerResult};
use crate::host::Env;
use crate::memory::{InMemoryRegistry, InMemoryTokenLedger, InMemoryVestingFactory};
use crate::params::{PeriodLimits, SaleInitParams};
use crate::queries::{handle_query, SaleQuery, SaleQueryResponse};
use crate::sealed_bid::SealedBidAuctionSale;

/// A sale plus in-memory collaborators and a logical clock.
#[derive(Clone, Debug)]
pub struct SaleRuntime {
    pub chain_id: u64,
    /// Current block time
    pub timestamp: u64,
    pub limits: PeriodLimits,
    pub tokens: InMemoryTokenLedger,
    pub vesting: InMemoryVestingFactory,
    pub registry: InMemoryRegistry,
    sale: Option<SealedBidAuctionSale>,
}

impl SaleRuntime {
    pub fn new(chain_id: u64, timestamp: u64, registry: InMemoryRegistry) -> Self {
        Self {
            chain_id,
            timestamp,
            limits: PeriodLimits::default(),
            tokens: InMemoryTokenLedger::new(),
            vesting: InMemoryVestingFactory::new(),
            registry,
            sale: None,
        }
    }

    pub fn with_limits(mut self, limits: PeriodLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Create the sale at `sale_address`, starting now.
    pub fn initialize_sale(&mut self, sale_address: Address, params: SaleInitParams) -> HandlerResult<()> {
        if self.sale.is_some() {
            return Err(SaleError::SaleAlreadyInitialized);
        }
        let sale = SealedBidAuctionSale::initialize(params, &self.limits, sale_address, self.timestamp, &self.registry)?;
        self.sale = Some(sale);
        Ok(())
    }

    pub fn sale(&self) -> Option<&SealedBidAuctionSale> {
        self.sale.as_ref()
    }

    /// Move the clock forward. Time never goes backwards.
    pub fn set_timestamp(&mut self, timestamp: u64) -> u64 {
        self.timestamp = self.timestamp.max(timestamp);
        self.timestamp
    }

    pub fn advance_time(&mut self, seconds: u64) -> u64 {
        self.set_timestamp(self.timestamp.saturating_add(seconds))
    }

    /// Execute `call` from `sender` atomically.
    ///
    /// Returns the events the call emitted.
    pub fn execute(&mut self, sender: Address, call: SaleCall) -> HandlerResult<Vec<SaleEvent>> {
        let name = call.name();
        let ctx = CallContext {
            sender,
            timestamp: self.timestamp,
            chain_id: self.chain_id,
        };

        let sale = self.sale.as_mut().ok_or(SaleError::SaleNotInitialized)?;
        let snapshot = (sale.clone(), self.tokens.clone(), self.vesting.clone());
        let first_event = sale.state.events.len();

        let mut env = Env {
            tokens: &mut self.tokens,
            vesting: &mut self.vesting,
            registry: &self.registry,
        };
        match handle_call(sale, &ctx, &mut env, call) {
            Ok(()) => {
                let events = sale.state.events[first_event..].to_vec();
                debug!(call = name, events = events.len(), "call committed");
                Ok(events)
            }
            Err(err) => {
                warn!(call = name, sender = ?sender, error = %err, "call reverted");
                let (sale_snapshot, tokens, vesting) = snapshot;
                *sale = sale_snapshot;
                self.tokens = tokens;
                self.vesting = vesting;
                Err(err)
            }
        }
    }

    /// Answer a read-only query at the current block time.
    pub fn query(&self, query: SaleQuery) -> HandlerResult<SaleQueryResponse> {
        let sale = self.sale.as_ref().ok_or(SaleError::SaleNotInitialized)?;
        handle_query(sale, query, self.timestamp)
    }
}
