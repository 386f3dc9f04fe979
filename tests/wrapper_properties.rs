//! Behavioural properties of the wrapper core, exercised against the
//! in-memory ledger and the hydra-backed gateway.

#![allow(clippy::panic)]

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};
use hydra_amm::domain::Decimals;

use dex_wrapper::domain::{
    Address, AssetHandle, Deadline, LiquidityRequest, PairId, RemoveLiquidityRequest, SwapRequest,
};
use dex_wrapper::error::DexError;
use dex_wrapper::gateway::{
    AddLiquidityArgs, AmmFactory, AmmGatewayError, AmmRouter, HydraGateway, RemoveLiquidityArgs,
    SwapArgs,
};
use dex_wrapper::ledger::{AssetLedger, InMemoryLedger};
use dex_wrapper::wrapper::{CallEnv, WrapperConfig, WrapperState};

const OWNER: Address = Address::from_bytes([0x01; 20]);
const ALICE: Address = Address::from_bytes([0x02; 20]);
const MALLORY: Address = Address::from_bytes([0x03; 20]);
const ASSET_A: Address = Address::from_bytes([0x0a; 20]);
const ASSET_B: Address = Address::from_bytes([0x0b; 20]);
const ASSET_C: Address = Address::from_bytes([0x0c; 20]);
const ROUTER: Address = Address::from_bytes([0xee; 20]);
const FACTORY: Address = Address::from_bytes([0xfa; 20]);
const WRAPPER: Address = Address::from_bytes([0xd0; 20]);

const FUNDS: u128 = 100_000_000;

/// Gateway double over the hydra gateway.
///
/// It counts factory creations and can hide an existing pair from its
/// first lookup, as if a rival caller created it between the wrapper's
/// lookup and its create call. A `lenient` double drops every minimum
/// before forwarding, and `reject_deposits` fails deposits outright.
struct ScriptedGateway {
    inner: HydraGateway,
    stale_lookups: Cell<u32>,
    create_calls: u32,
    lenient: bool,
    reject_deposits: bool,
}

impl ScriptedGateway {
    fn new() -> Self {
        Self {
            inner: HydraGateway::new(ROUTER, FACTORY, 30),
            stale_lookups: Cell::new(0),
            create_calls: 0,
            lenient: false,
            reject_deposits: false,
        }
    }

    /// Creates the pair behind the wrapper's back and hides it from the
    /// next lookup.
    fn race(&mut self) -> PairId {
        let Ok(pair_id) = self.inner.create_pair(ASSET_A, ASSET_B) else {
            panic!("rival creation failed");
        };
        self.stale_lookups.set(1);
        pair_id
    }
}

impl AmmFactory for ScriptedGateway {
    fn factory_address(&self) -> Address {
        self.inner.factory_address()
    }

    fn get_pair(&self, a: Address, b: Address) -> Option<PairId> {
        let stale = self.stale_lookups.get();
        if stale > 0 {
            self.stale_lookups.set(stale - 1);
            return None;
        }
        self.inner.get_pair(a, b)
    }

    fn create_pair(&mut self, a: Address, b: Address) -> Result<PairId, AmmGatewayError> {
        self.create_calls += 1;
        self.inner.create_pair(a, b)
    }
}

impl AmmRouter for ScriptedGateway {
    fn router_address(&self) -> Address {
        self.inner.router_address()
    }

    fn add_liquidity(
        &mut self,
        ledger: &mut dyn AssetLedger,
        sender: Address,
        now: DateTime<Utc>,
        mut args: AddLiquidityArgs,
    ) -> Result<(u128, u128, u128), AmmGatewayError> {
        if self.reject_deposits {
            return Err(AmmGatewayError::InsufficientLiquidity);
        }
        if self.lenient {
            args.amount_a_min = 0;
            args.amount_b_min = 0;
        }
        self.inner.add_liquidity(ledger, sender, now, args)
    }

    fn remove_liquidity(
        &mut self,
        ledger: &mut dyn AssetLedger,
        sender: Address,
        now: DateTime<Utc>,
        mut args: RemoveLiquidityArgs,
    ) -> Result<(u128, u128), AmmGatewayError> {
        if self.lenient {
            args.amount_a_min = 0;
            args.amount_b_min = 0;
        }
        self.inner.remove_liquidity(ledger, sender, now, args)
    }

    fn swap_exact_tokens_for_tokens(
        &mut self,
        ledger: &mut dyn AssetLedger,
        sender: Address,
        now: DateTime<Utc>,
        mut args: SwapArgs,
    ) -> Result<Vec<u128>, AmmGatewayError> {
        if self.lenient {
            args.amount_out_min = 0;
        }
        self.inner.swap_exact_tokens_for_tokens(ledger, sender, now, args)
    }
}

struct World {
    wrapper: WrapperState,
    ledger: InMemoryLedger,
    gateway: ScriptedGateway,
}

impl World {
    fn new() -> Self {
        Self::with_funds(6, FUNDS)
    }

    /// Assets of `decimals` precision; every holder starts with `funds`
    /// of each.
    fn with_funds(decimals: u8, funds: u128) -> Self {
        let Ok(precision) = Decimals::new(decimals) else {
            panic!("valid decimals");
        };
        let Ok(wrapper) = WrapperState::new(WrapperConfig {
            asset_a: AssetHandle::new(ASSET_A, precision),
            asset_b: AssetHandle::new(ASSET_B, precision),
            router: ROUTER,
            factory: FACTORY,
            owner: OWNER,
            address: WRAPPER,
        }) else {
            panic!("valid config");
        };
        let mut ledger = InMemoryLedger::new();
        for holder in [OWNER, ALICE, MALLORY] {
            for asset in [ASSET_A, ASSET_B, ASSET_C] {
                let Ok(()) = ledger.mint(asset, holder, funds) else {
                    panic!("mint failed");
                };
                let Ok(()) = ledger.approve(asset, holder, WRAPPER, u128::MAX) else {
                    panic!("approve failed");
                };
            }
        }
        Self {
            wrapper,
            ledger,
            gateway: ScriptedGateway::new(),
        }
    }

    fn balances(&self, holder: Address) -> [u128; 3] {
        [ASSET_A, ASSET_B, ASSET_C].map(|asset| self.ledger.balance_of(asset, holder))
    }

    /// Nothing left in the wrapper's custody and no live router allowance.
    fn assert_custody_clear(&self) {
        for asset in [ASSET_A, ASSET_B, ASSET_C] {
            assert_eq!(self.ledger.balance_of(asset, WRAPPER), 0);
            assert_eq!(self.ledger.allowance(asset, WRAPPER, ROUTER), 0);
        }
    }

    fn add(&mut self, caller: Address, req: &LiquidityRequest) -> Result<(u128, u128, u128), DexError> {
        let mut env = CallEnv::new(&mut self.ledger, &mut self.gateway, caller, Utc::now());
        self.wrapper
            .add_liquidity(&mut env, req)
            .map(|r| (r.amount_a, r.amount_b, r.liquidity))
    }

    fn remove(&mut self, caller: Address, req: &RemoveLiquidityRequest) -> Result<(u128, u128), DexError> {
        let mut env = CallEnv::new(&mut self.ledger, &mut self.gateway, caller, Utc::now());
        self.wrapper
            .remove_liquidity(&mut env, req)
            .map(|r| (r.amount_a, r.amount_b))
    }

    fn swap(&mut self, caller: Address, req: &SwapRequest) -> Result<u128, DexError> {
        let mut env = CallEnv::new(&mut self.ledger, &mut self.gateway, caller, Utc::now());
        self.wrapper.swap(&mut env, req).map(|r| r.amount_out)
    }

    /// Seeds the A/B pool with `a`:`b` from the owner.
    fn seed(&mut self, a: u128, b: u128) -> u128 {
        let Ok((_, _, liquidity)) = self.add(OWNER, &deposit(a, b, 0, 0)) else {
            panic!("seeding failed");
        };
        liquidity
    }
}

fn deposit(a: u128, b: u128, a_min: u128, b_min: u128) -> LiquidityRequest {
    LiquidityRequest {
        amount_a_desired: a,
        amount_b_desired: b,
        amount_a_min: a_min,
        amount_b_min: b_min,
        recipient: ALICE,
        deadline: Deadline::Within(600),
    }
}

fn swap_a_for_b(amount_in: u128, amount_out_min: u128) -> SwapRequest {
    SwapRequest {
        amount_in,
        amount_out_min,
        path: vec![ASSET_A, ASSET_B],
        recipient: ALICE,
        deadline: Deadline::Within(600),
    }
}

#[test]
fn pair_resolution_is_idempotent() {
    let mut world = World::new();
    let Ok(first) = world.wrapper.resolve_pair(&mut world.gateway) else {
        panic!("first resolution failed");
    };
    let Ok(second) = world.wrapper.resolve_pair(&mut world.gateway) else {
        panic!("second resolution failed");
    };
    assert_eq!(first.pair_id, second.pair_id);
    assert!(first.created);
    assert!(!second.created);
    assert_eq!(world.gateway.create_calls, 1);
}

#[test]
fn pair_resolution_survives_a_creation_race() {
    let mut world = World::new();
    let rival = world.gateway.race();
    let Ok(resolution) = world.wrapper.resolve_pair(&mut world.gateway) else {
        panic!("resolution must not fail when the pair already exists");
    };
    assert_eq!(resolution.pair_id, rival);
    assert!(!resolution.created);
    assert_eq!(world.gateway.create_calls, 1);
    assert_eq!(world.wrapper.pair_id(), Some(rival));
}

#[test]
fn created_pair_is_returned_by_get_pair() {
    let mut world = World::new();
    assert!(world.wrapper.get_pair(&world.gateway).is_none());
    let mut env = CallEnv::new(&mut world.ledger, &mut world.gateway, MALLORY, Utc::now());
    let Ok(created) = world.wrapper.create_pair(&mut env) else {
        panic!("create_pair failed");
    };
    assert_eq!(world.wrapper.get_pair(&world.gateway), Some(created.pair_id));

    let Ok(fresh) = WrapperState::new(WrapperConfig {
        asset_a: world.wrapper.asset_b(),
        asset_b: world.wrapper.asset_a(),
        router: ROUTER,
        factory: FACTORY,
        owner: OWNER,
        address: WRAPPER,
    }) else {
        panic!("valid config");
    };
    assert_eq!(fresh.get_pair(&world.gateway), Some(created.pair_id));
}

#[test]
fn add_liquidity_conserves_caller_balances() {
    let mut world = World::new();
    world.seed(1_000_000, 2_000_000);

    let before = world.balances(ALICE);
    let Ok((used_a, used_b, minted)) = world.add(ALICE, &deposit(50_000, 50_000, 0, 0)) else {
        panic!("deposit failed");
    };
    let after = world.balances(ALICE);

    assert!(used_a <= 50_000);
    assert!(used_b <= 50_000);
    assert!(minted > 0);
    assert_eq!(after[0], before[0] - used_a);
    assert_eq!(after[1], before[1] - used_b);
    // Pool ratio is 1:2, so the full B amount fixes A at half of it.
    assert_eq!((used_a, used_b), (25_000, 50_000));
    // Nothing lingers in custody and no router allowance survives.
    assert_eq!(world.ledger.balance_of(ASSET_A, WRAPPER), 0);
    assert_eq!(world.ledger.balance_of(ASSET_B, WRAPPER), 0);
    assert_eq!(world.ledger.allowance(ASSET_A, WRAPPER, ROUTER), 0);
    assert_eq!(world.ledger.allowance(ASSET_B, WRAPPER, ROUTER), 0);
}

#[test]
fn unmet_minimums_fail_with_slippage_and_change_nothing() {
    let mut world = World::new();
    world.seed(1_000_000, 800_000);

    let before = world.balances(ALICE);
    let pool_before = world.gateway.inner.pairs();
    assert_eq!(
        world.add(ALICE, &deposit(100, 100, 90, 90)).map_err(|e| e.error_code()),
        Err(4001)
    );
    assert_eq!(world.balances(ALICE), before);
    assert_eq!(world.gateway.inner.pairs(), pool_before);
}

#[test]
fn expired_requests_move_nothing() {
    let mut world = World::new();
    world.seed(1_000_000, 1_000_000);
    let before = world.balances(ALICE);
    let past = Deadline::At(Utc::now() - Duration::seconds(1));

    let mut req = deposit(1_000, 1_000, 0, 0);
    req.deadline = past;
    assert_eq!(world.add(ALICE, &req), Err(DexError::DeadlineExpired));

    let mut swap = swap_a_for_b(1_000, 0);
    swap.deadline = past;
    assert_eq!(world.swap(ALICE, &swap), Err(DexError::DeadlineExpired));

    let remove = RemoveLiquidityRequest {
        liquidity: 1,
        amount_a_min: 0,
        amount_b_min: 0,
        recipient: ALICE,
        deadline: past,
    };
    assert_eq!(world.remove(ALICE, &remove), Err(DexError::DeadlineExpired));

    assert_eq!(world.balances(ALICE), before);
}

#[test]
fn swap_never_returns_less_than_the_floor() {
    let mut world = World::new();
    world.seed(1_000_000, 1_000_000);

    let before = world.balances(ALICE);
    let Ok(out) = world.swap(ALICE, &swap_a_for_b(20, 10)) else {
        panic!("swap failed");
    };
    assert!(out >= 10);
    let after = world.balances(ALICE);
    assert_eq!(after[0], before[0] - 20);
    assert_eq!(after[1], before[1] + out);

    // A 1:1 pool cannot return more than went in.
    let before = world.balances(ALICE);
    assert!(matches!(
        world.swap(ALICE, &swap_a_for_b(20, 21)),
        Err(DexError::SlippageExceeded(_))
    ));
    assert_eq!(world.balances(ALICE), before);
}

#[test]
fn swap_rejects_unroutable_paths_before_pulling() {
    let mut world = World::new();
    world.seed(1_000_000, 1_000_000);
    let before = world.balances(ALICE);

    for path in [vec![ASSET_A], vec![ASSET_A, ASSET_A], vec![ASSET_A, ASSET_C]] {
        let mut req = swap_a_for_b(1_000, 0);
        req.path = path;
        assert!(matches!(
            world.swap(ALICE, &req),
            Err(DexError::InvalidPath(_))
        ));
    }
    assert_eq!(world.balances(ALICE), before);
}

#[test]
fn missing_allowance_is_reported() {
    let mut world = World::new();
    let Ok(()) = world.ledger.approve(ASSET_B, ALICE, WRAPPER, 10) else {
        panic!("approve failed");
    };
    let before = world.balances(ALICE);
    assert!(matches!(
        world.add(ALICE, &deposit(1_000, 1_000, 0, 0)),
        Err(DexError::InsufficientAllowance(_))
    ));
    assert_eq!(world.balances(ALICE), before);
}

#[test]
fn remove_liquidity_returns_assets_to_recipient() {
    let mut world = World::new();
    let minted = world.seed(1_000_000, 1_000_000);
    let Some(pair) = world.wrapper.pair_id() else {
        panic!("pair must be cached after seeding");
    };
    let shares = pair.address();
    assert_eq!(world.ledger.balance_of(shares, ALICE), minted);
    let Ok(()) = world.ledger.approve(shares, ALICE, WRAPPER, minted) else {
        panic!("approve failed");
    };

    let before = world.balances(ALICE);
    let req = RemoveLiquidityRequest {
        liquidity: minted / 2,
        amount_a_min: 1,
        amount_b_min: 1,
        recipient: ALICE,
        deadline: Deadline::Within(600),
    };
    let Ok((out_a, out_b)) = world.remove(ALICE, &req) else {
        panic!("withdrawal failed");
    };
    assert!(out_a > 0 && out_b > 0);
    let after = world.balances(ALICE);
    assert_eq!(after[0], before[0] + out_a);
    assert_eq!(after[1], before[1] + out_b);
    assert_eq!(world.ledger.balance_of(shares, ALICE), minted - minted / 2);
    assert_eq!(world.ledger.balance_of(ASSET_A, WRAPPER), 0);
}

#[test]
fn remove_below_minimums_is_slippage() {
    let mut world = World::new();
    let minted = world.seed(1_000_000, 1_000_000);
    let Some(pair) = world.wrapper.pair_id() else {
        panic!("pair must be cached");
    };
    let Ok(()) = world.ledger.approve(pair.address(), ALICE, WRAPPER, minted) else {
        panic!("approve failed");
    };
    let before = world.ledger.balance_of(pair.address(), ALICE);
    let req = RemoveLiquidityRequest {
        liquidity: minted / 10,
        amount_a_min: 1_000_000,
        amount_b_min: 0,
        recipient: ALICE,
        deadline: Deadline::Within(600),
    };
    assert!(matches!(
        world.remove(ALICE, &req),
        Err(DexError::SlippageExceeded(_))
    ));
    assert_eq!(world.ledger.balance_of(pair.address(), ALICE), before);
}

#[test]
fn non_owner_admin_calls_change_nothing() {
    let mut world = World::new();
    let Ok(()) = world.ledger.transfer(ASSET_A, MALLORY, WRAPPER, 777) else {
        panic!("transfer failed");
    };
    let wrapper_before = world.wrapper.clone();
    let mallory_before = world.balances(MALLORY);

    assert_eq!(
        world.wrapper.transfer_ownership(MALLORY, MALLORY),
        Err(DexError::Unauthorized(MALLORY))
    );
    let mut env = CallEnv::new(&mut world.ledger, &mut world.gateway, MALLORY, Utc::now());
    assert_eq!(
        world.wrapper.sweep(&mut env, ASSET_A, MALLORY, None),
        Err(DexError::Unauthorized(MALLORY))
    );

    assert_eq!(world.wrapper, wrapper_before);
    assert_eq!(world.balances(MALLORY), mallory_before);
    assert_eq!(world.ledger.balance_of(ASSET_A, WRAPPER), 777);
}

#[test]
fn foreign_gateway_is_rejected() {
    let mut world = World::new();
    let mut foreign = HydraGateway::new(Address::from_bytes([0x99; 20]), FACTORY, 30);
    let mut env = CallEnv::new(&mut world.ledger, &mut foreign, ALICE, Utc::now());
    assert!(matches!(
        world.wrapper.create_pair(&mut env),
        Err(DexError::ExternalProtocol(_))
    ));
    assert!(world.wrapper.pair_id().is_none());
}

#[test]
fn whole_token_scenario_at_eighteen_decimals() {
    let e18: u128 = 1_000_000_000_000_000_000;
    let mut world = World::with_funds(18, 10_000 * e18);

    let Ok((used_a, used_b, minted)) =
        world.add(ALICE, &deposit(100 * e18, 100 * e18, 90 * e18, 90 * e18))
    else {
        panic!("18-decimal deposit failed");
    };
    assert_eq!((used_a, used_b), (100 * e18, 100 * e18));
    assert!(minted > 0);

    let before = world.balances(ALICE);
    let Ok(out) = world.swap(ALICE, &swap_a_for_b(20 * e18, 10 * e18)) else {
        panic!("18-decimal swap failed");
    };
    assert!(out >= 10 * e18);
    let after = world.balances(ALICE);
    assert_eq!(after[0], before[0] - 20 * e18);
    assert_eq!(after[1], before[1] + out);
    world.assert_custody_clear();
}

#[test]
fn deposit_outside_minimums_is_reverted_even_if_the_router_accepts_it() {
    let mut world = World::new();
    world.seed(1_000_000, 800_000);
    world.gateway.lenient = true;
    let Some(pair) = world.wrapper.pair_id() else {
        panic!("pair must be cached");
    };

    let before = world.balances(ALICE);
    let shares_before = world.ledger.balance_of(pair.address(), ALICE);
    assert!(matches!(
        world.add(ALICE, &deposit(100, 100, 90, 90)),
        Err(DexError::SlippageExceeded(_))
    ));
    assert_eq!(world.balances(ALICE), before);
    assert_eq!(world.ledger.balance_of(pair.address(), ALICE), shares_before);
    world.assert_custody_clear();
}

#[test]
fn swap_below_floor_is_reverted_even_if_the_router_pays_out() {
    let mut world = World::new();
    world.seed(1_000_000, 1_000_000);
    world.gateway.lenient = true;

    let before = world.balances(ALICE);
    assert!(matches!(
        world.swap(ALICE, &swap_a_for_b(20, 1_000)),
        Err(DexError::SlippageExceeded(_))
    ));
    assert_eq!(world.balances(ALICE), before);
    world.assert_custody_clear();
}

#[test]
fn withdrawal_below_minimums_is_reverted_even_if_the_router_pays_out() {
    let mut world = World::new();
    let minted = world.seed(1_000_000, 1_000_000);
    world.gateway.lenient = true;
    let Some(pair) = world.wrapper.pair_id() else {
        panic!("pair must be cached");
    };
    let Ok(()) = world.ledger.approve(pair.address(), ALICE, WRAPPER, minted) else {
        panic!("approve failed");
    };

    let before = world.balances(ALICE);
    let shares_before = world.ledger.balance_of(pair.address(), ALICE);
    let req = RemoveLiquidityRequest {
        liquidity: minted / 10,
        amount_a_min: 1_000_000,
        amount_b_min: 0,
        recipient: ALICE,
        deadline: Deadline::Within(600),
    };
    assert!(matches!(
        world.remove(ALICE, &req),
        Err(DexError::SlippageExceeded(_))
    ));
    assert_eq!(world.balances(ALICE), before);
    assert_eq!(world.ledger.balance_of(pair.address(), ALICE), shares_before);
    world.assert_custody_clear();
    assert_eq!(world.ledger.balance_of(pair.address(), WRAPPER), 0);
}

#[test]
fn failed_first_deposit_leaves_no_pair_behind() {
    let mut world = World::new();
    world.gateway.reject_deposits = true;

    let before = world.balances(ALICE);
    assert!(matches!(
        world.add(ALICE, &deposit(1_000, 1_000, 0, 0)),
        Err(DexError::ExternalProtocol(_))
    ));
    assert_eq!(world.balances(ALICE), before);
    assert!(world.wrapper.pair_id().is_none());
    assert!(world.wrapper.get_pair(&world.gateway).is_none());
    assert_eq!(world.gateway.create_calls, 0);
    world.assert_custody_clear();
}
