use crate::invariants::{
    assert_all_invariants, assert_paid_out_monotonic, assert_valid_status_transition,
};
use crate::{
    Address, Amount, Error, ErrorKind, EscrowRegistry, MintPolicy, ProjectStatus, RegistryConfig,
    RoyaltyFraction,
};

const ONE_ETH: Amount = 1_000_000_000_000_000_000;
const URI: &str = "https://my-nft.metadata/here-is-some-cool-metadata.json";

struct Fixture {
    reg: EscrowRegistry,
    minter: Address,
    redeemer: Address,
    royalty: Address,
}

fn setup() -> Fixture {
    let minter = Address::new("0xminter");
    let redeemer = Address::new("0xredeemer");
    let royalty = Address::new("0xroyalty");
    let config = RegistryConfig::new(minter.clone(), "0xcontract".into(), royalty.clone());
    let mut reg = EscrowRegistry::new(config).unwrap();
    reg.credit(&minter, &minter, 100 * ONE_ETH).unwrap();
    reg.credit(&minter, &redeemer, 100 * ONE_ETH).unwrap();
    Fixture {
        reg,
        minter,
        redeemer,
        royalty,
    }
}

#[test]
fn test_redeem_requires_initialization() {
    let mut f = setup();
    assert!(!f.reg.initialized());
    let err = f.reg.redeem_eth_from_nft(&f.minter, 0).unwrap_err();
    assert_eq!(err, Error::ProjectNotFound(0));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_redeem_can_only_be_called_by_owner() {
    let mut f = setup();
    let id = f.reg.mint(&f.minter, URI, ONE_ETH).unwrap();
    let err = f.reg.redeem_eth_from_nft(&f.redeemer, id).unwrap_err();
    assert_eq!(err, Error::NotAuthorized(f.redeemer.clone()));
    assert_eq!(err.kind(), ErrorKind::Authorization);

    f.reg.redeem_eth_from_nft(&f.minter, id).unwrap();
    assert_eq!(f.reg.events().last().unwrap().topic(), "redeemed");
}

#[test]
fn test_immediate_redemption_by_creator() {
    let mut f = setup();
    let id = f.reg.mint(&f.minter, URI, ONE_ETH).unwrap();
    assert_eq!(f.reg.get_amount_stored_in_nft(id), 990_000_000_000_000_000);

    let payout = f.reg.redeem_eth_from_nft(&f.minter, id).unwrap();
    assert_eq!(payout, 980_100_000_000_000_000);

    let project = f.reg.token_details(id).unwrap();
    assert_eq!(project.escrowed_amount, 0);
    assert_eq!(project.status, ProjectStatus::Closed);
    assert_valid_status_transition(ProjectStatus::New, project.status);
    assert_all_invariants(&f.reg);
}

#[test]
fn test_redeems_correct_amount_of_eth() {
    let mut f = setup();
    let id = f.reg.mint(&f.minter, URI, ONE_ETH).unwrap();
    let (_, mint_royalty) = f.reg.royalty_info(id, ONE_ETH).unwrap();
    let escrowed = f.reg.get_amount_stored_in_nft(id);
    assert_eq!(escrowed, ONE_ETH - mint_royalty);

    let (_, redeem_royalty) = f.reg.royalty_info(id, escrowed).unwrap();
    let payout = f.reg.redeem_eth_from_nft(&f.minter, id).unwrap();
    assert_eq!(payout, escrowed - redeem_royalty);
    // payout = d * (1 - 1/100)^2
    assert_eq!(payout, ONE_ETH * 99 * 99 / (100 * 100));
}

#[test]
fn test_account_balances_are_correct() {
    let mut f = setup();
    let minter_start = f.reg.account_balance(&f.minter);
    let redeemer_start = f.reg.account_balance(&f.redeemer);
    assert_eq!(f.reg.account_balance(&f.royalty), 0);
    assert_eq!(f.reg.account_balance(f.reg.contract_address()), 0);

    let id = f.reg.mint(&f.minter, URI, ONE_ETH).unwrap();
    let (_, minted_royalty) = f.reg.royalty_info(id, ONE_ETH).unwrap();
    assert_eq!(minter_start - f.reg.account_balance(&f.minter), ONE_ETH);
    assert_eq!(
        f.reg.account_balance(f.reg.contract_address()),
        ONE_ETH - minted_royalty
    );
    assert_eq!(f.reg.account_balance(&f.royalty), minted_royalty);

    // Job done: the project record goes to the redeemer.
    f.reg
        .safe_transfer_from(&f.minter, &f.minter, &f.redeemer, id)
        .unwrap();
    assert_eq!(f.reg.owner_of(id).unwrap(), f.redeemer);

    let escrowed = f.reg.get_amount_stored_in_nft(id);
    let (_, redeemed_royalty) = f.reg.royalty_info(id, escrowed).unwrap();
    let payout = f.reg.redeem_eth_from_nft(&f.redeemer, id).unwrap();

    assert_eq!(f.reg.account_balance(&f.minter), minter_start - ONE_ETH);
    assert_eq!(f.reg.account_balance(&f.redeemer), redeemer_start + payout);
    assert_eq!(payout, ONE_ETH - minted_royalty - redeemed_royalty);
    assert_eq!(
        f.reg.account_balance(&f.royalty),
        minted_royalty + redeemed_royalty
    );
    assert_eq!(f.reg.account_balance(f.reg.contract_address()), 0);
    assert_all_invariants(&f.reg);
}

#[test]
fn test_redemption_happens_once() {
    let mut f = setup();
    let id = f.reg.mint(&f.minter, URI, ONE_ETH).unwrap();
    f.reg.redeem_eth_from_nft(&f.minter, id).unwrap();
    let balance = f.reg.account_balance(&f.minter);

    let err = f.reg.redeem_eth_from_nft(&f.minter, id).unwrap_err();
    assert_eq!(err, Error::ProjectClosed(id));
    assert_eq!(err.kind(), ErrorKind::TerminalState);
    assert_eq!(f.reg.account_balance(&f.minter), balance);
}

#[test]
fn test_totals_and_open_counts_after_partial_redemption() {
    let mut f = setup();
    for _ in 0..4 {
        f.reg.mint(&f.minter, URI, ONE_ETH).unwrap();
    }
    let mut escrowed_total = f.reg.get_total_bounty_amount();
    let mut paid_total = 0;

    for id in [1, 3] {
        f.reg
            .safe_transfer_from(&f.minter, &f.minter, &f.redeemer, id)
            .unwrap();
        let escrowed = f.reg.get_amount_stored_in_nft(id);
        let before = f.reg.get_total_eth_paid_out();
        let payout = f.reg.redeem_eth_from_nft(&f.redeemer, id).unwrap();
        assert_paid_out_monotonic(before, f.reg.get_total_eth_paid_out());
        paid_total += payout;
        escrowed_total -= escrowed;
    }

    assert_eq!(f.reg.get_total_eth_paid_out(), paid_total);
    assert_eq!(f.reg.get_total_bounty_amount(), escrowed_total);
    assert_eq!(f.reg.get_number_of_open_nfts_from_creator(&f.minter), 2);
    for id in 0..4 {
        assert_eq!(f.reg.get_nft_creator(id), f.minter);
    }
    assert_all_invariants(&f.reg);
}

#[test]
fn test_blocked_redeemer_rolls_back_everything() {
    let mut f = setup();
    let id = f.reg.mint(&f.minter, URI, ONE_ETH).unwrap();
    f.reg
        .transfer_from(&f.minter, &f.minter, &f.redeemer, id)
        .unwrap();
    let before = f.reg.token_details(id).unwrap();
    let royalty_before = f.reg.account_balance(&f.royalty);
    let events_before = f.reg.events().len();

    f.reg.block_recipient(&f.redeemer);
    let err = f.reg.redeem_eth_from_nft(&f.redeemer, id).unwrap_err();
    assert_eq!(err, Error::PaymentRejected(f.redeemer.clone()));
    assert_eq!(err.kind(), ErrorKind::Payment);

    assert_eq!(f.reg.token_details(id).unwrap(), before);
    assert_eq!(f.reg.account_balance(&f.royalty), royalty_before);
    assert_eq!(f.reg.events().len(), events_before);
    assert_eq!(f.reg.get_total_eth_paid_out(), 0);
    assert_all_invariants(&f.reg);

    f.reg.unblock_recipient(&f.redeemer);
    f.reg.redeem_eth_from_nft(&f.redeemer, id).unwrap();
    assert_eq!(f.reg.token_details(id).unwrap().status, ProjectStatus::Closed);
}

#[test]
fn test_blocked_royalty_receiver_blocks_mint_and_redeem() {
    let mut f = setup();
    let id = f.reg.mint(&f.minter, URI, ONE_ETH).unwrap();
    f.reg.block_recipient(&f.royalty);

    let balance = f.reg.account_balance(&f.minter);
    assert_eq!(
        f.reg.mint(&f.minter, URI, ONE_ETH),
        Err(Error::PaymentRejected(f.royalty.clone()))
    );
    assert_eq!(f.reg.account_balance(&f.minter), balance);
    assert_eq!(f.reg.total_supply(), 1);

    assert!(f.reg.redeem_eth_from_nft(&f.minter, id).is_err());
    assert_eq!(f.reg.token_details(id).unwrap().status, ProjectStatus::New);
}

#[test]
fn test_custom_royalty_fraction() {
    let minter = Address::new("0xminter");
    let config = RegistryConfig::new(minter.clone(), "0xcontract".into(), "0xroyalty".into())
        .with_royalty(RoyaltyFraction::new(5, 100).unwrap())
        .with_mint_policy(MintPolicy::Open);
    let mut reg = EscrowRegistry::new(config).unwrap();
    reg.credit(&minter, &minter, 10_000).unwrap();

    let id = reg.mint(&minter, URI, 10_000).unwrap();
    assert_eq!(reg.get_amount_stored_in_nft(id), 9_500);
    assert_eq!(reg.redeem_eth_from_nft(&minter, id).unwrap(), 9_025);
}
