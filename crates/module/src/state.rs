//! Per-sale state shared by every sale variant.

use std::collections::HashMap;

use sale_types::{
    Address, InvestorPosition, RoleAddresses, SaleConfiguration, SaleEvent, SaleSchedule, SaleStatus,
    VestingConfiguration,
};

/// Sale state.
///
/// Held in memory and snapshotted by the runtime around each call, so a
/// failed call leaves no trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleState {
    /// Address the sale holds funds under
    pub address: Address,
    pub config: SaleConfiguration,
    pub vesting: VestingConfiguration,
    pub schedule: SaleSchedule,
    pub status: SaleStatus,
    pub roles: RoleAddresses,
    pub paused: bool,
    /// Investor positions, created on first investment
    pub positions: HashMap<Address, InvestorPosition>,
    /// Append-only event log
    pub events: Vec<SaleEvent>,
}

impl SaleState {
    pub fn new(
        address: Address,
        config: SaleConfiguration,
        vesting: VestingConfiguration,
        schedule: SaleSchedule,
        roles: RoleAddresses,
    ) -> Self {
        Self {
            address,
            config,
            vesting,
            schedule,
            status: SaleStatus::default(),
            roles,
            paused: false,
            positions: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Append an event to the log.
    pub fn emit(&mut self, event: SaleEvent) {
        tracing::debug!(event = event.name(), "sale event");
        self.events.push(event);
    }

    /// Number of investors with a position record.
    pub fn investor_count(&self) -> usize {
        self.positions.len()
    }
}
