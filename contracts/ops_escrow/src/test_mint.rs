use crate::invariants::assert_all_invariants;
use crate::{
    Address, Amount, Error, ErrorKind, EscrowRegistry, MintPolicy, ProjectStatus, RegistryConfig,
};

const ONE_ETH: Amount = 1_000_000_000_000_000_000;
const URI: &str = "https://my-nft.metadata/here-is-some-cool-metadata.json";

fn setup(policy: MintPolicy) -> (EscrowRegistry, Address, Address) {
    let admin = Address::new("0xadmin");
    let other = Address::new("0xother");
    let config = RegistryConfig::new(admin.clone(), "0xcontract".into(), "0xroyalty".into())
        .with_mint_policy(policy);
    let mut reg = EscrowRegistry::new(config).unwrap();
    reg.credit(&admin, &admin, 100 * ONE_ETH).unwrap();
    reg.credit(&admin, &other, 100 * ONE_ETH).unwrap();
    (reg, admin, other)
}

#[test]
fn test_mint_moves_deposit_into_escrow_and_royalty() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    let royalty = Address::new("0xroyalty");
    let before = reg.account_balance(&admin);

    let id = reg.mint(&admin, URI, ONE_ETH).unwrap();
    assert_eq!(id, 0);

    let (receiver, fee) = reg.royalty_info(id, ONE_ETH).unwrap();
    assert_eq!(receiver, royalty);
    assert_eq!(before - reg.account_balance(&admin), ONE_ETH);
    assert_eq!(reg.get_amount_stored_in_nft(id), ONE_ETH - fee);
    assert_eq!(reg.account_balance(&royalty), fee);
    assert_eq!(reg.account_balance(reg.contract_address()), ONE_ETH - fee);
    assert_all_invariants(&reg);
}

#[test]
fn test_mint_escrows_ninety_nine_percent() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    let id = reg.mint(&admin, URI, ONE_ETH).unwrap();
    let project = reg.token_details(id).unwrap();
    assert_eq!(project.escrowed_amount, 990_000_000_000_000_000);
    assert_eq!(project.status, ProjectStatus::New);
    assert_eq!(project.owner, admin);
    assert_eq!(project.creator, admin);
    assert_eq!(project.metadata_uri, URI);
    assert!(project.initialized);
    assert!(project.submissions.is_empty());
}

#[test]
fn test_cannot_escrow_non_positive_amount() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    assert_eq!(reg.mint(&admin, URI, -1), Err(Error::InvalidAmount(-1)));
    assert_eq!(reg.mint(&admin, URI, 0), Err(Error::InvalidAmount(0)));
    assert_eq!(reg.total_supply(), 0);
}

#[test]
fn test_cannot_escrow_more_than_balance() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    let balance = reg.account_balance(&admin);
    let err = reg.mint(&admin, URI, balance * 2).unwrap_err();
    assert_eq!(
        err,
        Error::DepositExceedsBalance {
            deposit: balance * 2,
            available: balance
        }
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(reg.account_balance(&admin), balance);
}

#[test]
fn test_empty_metadata_rejected() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    assert_eq!(reg.mint(&admin, "", ONE_ETH), Err(Error::EmptyMetadata));
}

#[test]
fn test_non_admin_cannot_mint_when_gated() {
    let (mut reg, admin, other) = setup(MintPolicy::AdminOnly);
    let err = reg.mint(&other, URI, ONE_ETH).unwrap_err();
    assert_eq!(err, Error::MintRestricted(other.clone()));
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(!reg.initialized());

    reg.mint(&admin, URI, ONE_ETH).unwrap();
    assert!(reg.initialized());
}

#[test]
fn test_anyone_can_mint_when_open() {
    let (mut reg, _, other) = setup(MintPolicy::Open);
    let id = reg.mint(&other, URI, ONE_ETH).unwrap();
    assert_eq!(reg.owner_of(id).unwrap(), other);
}

#[test]
fn test_token_id_properly_increments() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    assert_eq!(reg.token_details(0), Err(Error::ProjectNotFound(0)));
    assert_eq!(reg.token_details(1), Err(Error::ProjectNotFound(1)));

    reg.mint(&admin, URI, ONE_ETH).unwrap();
    assert!(reg.token_details(0).is_ok());
    assert_eq!(reg.token_details(1), Err(Error::ProjectNotFound(1)));

    reg.mint(&admin, URI, ONE_ETH).unwrap();
    assert!(reg.token_details(1).is_ok());
    assert_eq!(reg.total_supply(), 2);
}

#[test]
fn test_token_uri_and_creator() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    assert_eq!(reg.get_nft_creator(0), Address::zero());
    assert_eq!(reg.get_amount_stored_in_nft(0), 0);
    assert_eq!(reg.token_uri(0), Err(Error::ProjectNotFound(0)));

    reg.mint(&admin, URI, ONE_ETH).unwrap();
    assert_eq!(reg.token_uri(0).unwrap(), URI);
    assert_eq!(reg.get_nft_creator(0), admin);
}

#[test]
fn test_get_array_of_nfts_from_multiple_creators() {
    let (mut reg, admin, other) = setup(MintPolicy::Open);
    for _ in 0..4 {
        reg.mint(&admin, URI, ONE_ETH).unwrap();
    }
    for _ in 0..4 {
        reg.mint(&other, URI, ONE_ETH).unwrap();
    }
    assert_eq!(reg.get_array_of_nfts_from_creator(&admin), vec![0, 1, 2, 3]);
    assert_eq!(reg.get_array_of_nfts_from_creator(&other), vec![4, 5, 6, 7]);
    assert_eq!(reg.get_number_of_open_nfts_from_creator(&admin), 4);
    assert_eq!(reg.balance_of(&other).unwrap(), 4);
    assert_all_invariants(&reg);
}

#[test]
fn test_total_bounty_tracks_mints() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    let mut expected = 0;
    for _ in 0..4 {
        let id = reg.mint(&admin, URI, ONE_ETH).unwrap();
        expected += reg.get_amount_stored_in_nft(id);
    }
    assert_eq!(reg.get_total_bounty_amount(), expected);
    assert_eq!(reg.get_total_eth_paid_out(), 0);
}

#[test]
fn test_royalty_info_is_pure() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    reg.mint(&admin, URI, ONE_ETH).unwrap();
    let details = reg.token_details(0).unwrap();
    let events = reg.events().len();

    let first = reg.royalty_info(0, 12_345).unwrap();
    let second = reg.royalty_info(0, 12_345).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.1, 123);
    // Any id and any amount may be previewed.
    assert_eq!(reg.royalty_info(99, 10_000).unwrap().1, 100);

    assert_eq!(reg.token_details(0).unwrap(), details);
    assert_eq!(reg.events().len(), events);
}

#[test]
fn test_custody_account_cannot_mint_against_pooled_escrow() {
    let admin = Address::new("0xadmin");
    let alice = Address::new("0xalice");
    let contract = Address::new("0xcontract");
    let config = RegistryConfig::new(admin.clone(), contract.clone(), "0xroyalty".into())
        .with_mint_policy(MintPolicy::Open);
    let mut reg = EscrowRegistry::new(config).unwrap();
    reg.credit(&admin, &alice, 10_000).unwrap();
    let id = reg.mint(&alice, URI, 10_000).unwrap();
    assert_eq!(reg.account_balance(&contract), 9_900);

    let err = reg.mint(&contract, URI, 9_900).unwrap_err();
    assert_eq!(err, Error::CustodyAccount(contract.clone()));
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(reg.total_supply(), 1);
    assert_eq!(reg.account_balance(&contract), 9_900);

    assert_eq!(reg.redeem_eth_from_nft(&alice, id).unwrap(), 9_801);
    assert_all_invariants(&reg);
}

#[test]
fn test_custody_account_cannot_be_credited() {
    let (mut reg, admin, _) = setup(MintPolicy::AdminOnly);
    let contract = reg.contract_address().clone();
    assert_eq!(
        reg.credit(&admin, &contract, ONE_ETH),
        Err(Error::CustodyAccount(contract.clone()))
    );
    assert_eq!(reg.account_balance(&contract), 0);
    assert_all_invariants(&reg);
}

#[test]
fn test_admin_must_not_be_custody_account() {
    let config = RegistryConfig::new("0xcontract".into(), "0xcontract".into(), "0xroyalty".into());
    assert!(matches!(
        EscrowRegistry::new(config),
        Err(Error::InvalidConfig(_))
    ));
}
