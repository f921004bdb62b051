//! Shared fixture for sale tests.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use sale_crypto::signature::signer_address;
use sale_crypto::{
    encode_sealed_bid, eth_signed_message_hash, investment_authorization_digest, seal_bid, sign_digest,
    AuctionKeypair, MerkleTree,
};
use sale_types::{
    Address, SaleEvent, SaleSchedule, Signature, LEGION_BOUNCER_ID, LEGION_FEE_RECEIVER_ID, LEGION_SIGNER_ID,
    LEGION_VESTING_FACTORY_ID,
};

use crate::call::SaleCall;
use crate::handlers::HandlerResult;
use crate::memory::InMemoryRegistry;
use crate::params::{tests::sample_params, SaleInitParams};
use crate::runtime::SaleRuntime;
use crate::sealed_bid::SealedBidAuctionSale;

pub const CHAIN_ID: u64 = 1;
pub const START: u64 = 1_700_000_000;
pub const SALE: Address = [0x5a; 20];
pub const OPERATOR: Address = [0x0b; 20];
pub const FEE_RECEIVER: Address = [0x0f; 20];
pub const VESTING_FACTORY: Address = [0x0e; 20];
pub const ALICE: Address = [0x01; 20];
pub const BOB: Address = [0x02; 20];
pub const CAROL: Address = [0x03; 20];

pub struct Fixture {
    pub runtime: SaleRuntime,
    pub keypair: AuctionKeypair,
    pub signer: SigningKey,
    pub params: SaleInitParams,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_params(|_| {})
    }

    pub fn with_params(customize: impl FnOnce(&mut SaleInitParams)) -> Self {
        let mut rng = OsRng;
        let keypair = AuctionKeypair::generate(&mut rng);
        let signer = SigningKey::random(&mut rng);

        let mut registry = InMemoryRegistry::new();
        registry.set(LEGION_BOUNCER_ID, OPERATOR);
        registry.set(LEGION_FEE_RECEIVER_ID, FEE_RECEIVER);
        registry.set(LEGION_SIGNER_ID, signer_address(&signer));
        registry.set(LEGION_VESTING_FACTORY_ID, VESTING_FACTORY);

        let mut params = sample_params();
        params.public_key = keypair.public_key;
        customize(&mut params);

        let mut runtime = SaleRuntime::new(CHAIN_ID, START, registry);
        runtime.initialize_sale(SALE, params.clone()).unwrap();

        Self {
            runtime,
            keypair,
            signer,
            params,
        }
    }

    pub fn project(&self) -> Address {
        self.params.project_admin
    }

    pub fn bid_token(&self) -> Address {
        self.params.bid_token
    }

    pub fn ask_token(&self) -> Address {
        self.params.ask_token.unwrap()
    }

    pub fn sale(&self) -> &SealedBidAuctionSale {
        self.runtime.sale().unwrap()
    }

    pub fn schedule(&self) -> SaleSchedule {
        self.sale().state.schedule.clone()
    }

    pub fn balance(&self, token: &Address, holder: &Address) -> u128 {
        use crate::host::TokenLedger;
        self.runtime.tokens.balance_of(token, holder)
    }

    /// Mint bid tokens to `investor` and approve the sale.
    pub fn fund(&mut self, investor: &Address, amount: u128) {
        let token = self.bid_token();
        self.runtime.tokens.mint(&token, investor, amount).unwrap();
        let allowance = self.runtime.tokens.allowance(&token, investor, &SALE);
        self.runtime.tokens.approve(&token, investor, &SALE, allowance + amount);
    }

    pub fn authorization(&self, investor: &Address) -> Signature {
        let digest = eth_signed_message_hash(&investment_authorization_digest(investor, &SALE, CHAIN_ID));
        sign_digest(&self.signer, &digest).unwrap()
    }

    pub fn sealed_bid(&self, investor: &Address, amount_out: u128) -> Vec<u8> {
        encode_sealed_bid(&seal_bid(amount_out, investor, &self.keypair).unwrap())
    }

    pub fn execute(&mut self, sender: Address, call: SaleCall) -> HandlerResult<Vec<SaleEvent>> {
        self.runtime.execute(sender, call)
    }

    /// Fund `investor` and invest `amount` with a bid for `amount` tokens.
    pub fn invest(&mut self, investor: Address, amount: u128) -> HandlerResult<Vec<SaleEvent>> {
        self.fund(&investor, amount);
        let call = SaleCall::Invest {
            amount,
            sealed_bid: self.sealed_bid(&investor, amount),
            signature: self.authorization(&investor),
        };
        self.execute(investor, call)
    }

    pub fn warp_to(&mut self, timestamp: u64) {
        self.runtime.set_timestamp(timestamp);
    }

    pub fn warp_past_sale(&mut self) {
        let end = self.schedule().end_time;
        self.warp_to(end);
    }

    pub fn warp_past_refund(&mut self) {
        let end = self.schedule().refund_end_time;
        self.warp_to(end);
    }

    pub fn warp_past_lockup(&mut self) {
        let end = self.schedule().lockup_end_time;
        self.warp_to(end);
    }

    /// Lock and publish results built from the given allocations.
    pub fn publish(
        &mut self,
        claims: &[(Address, u128)],
        accepted: &[(Address, u128)],
        capital_raised: u128,
    ) -> (MerkleTree, MerkleTree) {
        self.warp_past_refund();
        self.execute(OPERATOR, SaleCall::InitializePublishSaleResults).unwrap();

        let claim_tree = MerkleTree::from_allocations(claims).unwrap();
        let accepted_tree = MerkleTree::from_allocations(accepted).unwrap();
        let call = SaleCall::PublishSaleResults {
            claim_merkle_root: claim_tree.root(),
            accepted_merkle_root: accepted_tree.root(),
            tokens_allocated: claims.iter().map(|(_, amount)| amount).sum(),
            capital_raised,
            private_key: self.keypair.private_key,
        };
        self.execute(OPERATOR, call).unwrap();
        (claim_tree, accepted_tree)
    }

    /// Mint the ask token to the project and supply the allocation with fees.
    pub fn supply_tokens(&mut self) -> HandlerResult<Vec<SaleEvent>> {
        let amount = self.sale().state.status.total_tokens_allocated;
        let (legion_fee, referrer_fee) =
            crate::settlement::token_fees(amount, &self.sale().state.config).unwrap();
        let token = self.ask_token();
        let project = self.project();
        let total = amount + legion_fee + referrer_fee;
        self.runtime.tokens.mint(&token, &project, total).unwrap();
        self.runtime.tokens.approve(&token, &project, &SALE, total);
        self.execute(
            project,
            SaleCall::SupplyTokens {
                amount,
                legion_fee,
                referrer_fee,
            },
        )
    }
}
