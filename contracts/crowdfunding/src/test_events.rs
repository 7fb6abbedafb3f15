extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, Env, IntoVal, String, TryIntoVal, Val, Vec,
};

use crate::events::{
    CampaignCreated, CampaignFinished, ContributionReceived, ContributionRefunded, FundsCollected,
};
use crate::{CrowdfundingCampaign, CrowdfundingCampaignClient};

const ONE_UNIT: i128 = 10_000_000;

fn setup() -> (Env, CrowdfundingCampaignClient<'static>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(0);
    let contract_id = env.register(CrowdfundingCampaign, ());
    let client = CrowdfundingCampaignClient::new(&env, &contract_id);

    let token_admin = Address::generate(&env);
    let token = env
        .register_stellar_asset_contract_v2(token_admin)
        .address();
    let beneficiary = Address::generate(&env);
    client.init(
        &Address::generate(&env),
        &String::from_str(&env, "funding"),
        &token,
        &ONE_UNIT,
        &10,
        &beneficiary,
    );
    (env, client, token, beneficiary)
}

fn funded(env: &Env, token: &Address, amount: i128) -> Address {
    let account = Address::generate(env);
    token::StellarAssetClient::new(env, token).mint(&account, &amount);
    account
}

/// Last event published by the campaign; token transfers publish their own.
fn last_event(env: &Env, campaign: &Address) -> (Address, Vec<Val>, Val) {
    env.events()
        .all()
        .iter()
        .filter(|(contract, _, _)| contract == campaign)
        .last()
        .expect("No campaign events found")
}

#[test]
fn test_campaign_created_event() {
    let (env, client, token, beneficiary) = setup();

    let (contract, topics, data) = last_event(&env, &client.address);
    assert_eq!(contract, client.address);
    assert_eq!(topics, vec![&env, symbol_short!("created").into_val(&env)]);

    let event_data: CampaignCreated = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        CampaignCreated {
            beneficiary,
            token,
            target_amount: ONE_UNIT,
            funding_deadline: 600,
        }
    );
}

#[test]
fn test_contribution_received_event() {
    let (env, client, token, _) = setup();
    let contributor = funded(&env, &token, 3 * ONE_UNIT);

    client.contribute(&contributor, &ONE_UNIT);
    client.contribute(&contributor, &(2 * ONE_UNIT));

    let (contract, topics, data) = last_event(&env, &client.address);
    assert_eq!(contract, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("contrib").into_val(&env),
        contributor.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: ContributionReceived = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ContributionReceived {
            contributor: contributor.clone(),
            amount: 2 * ONE_UNIT,
            total_collected: 3 * ONE_UNIT,
        }
    );
}

#[test]
fn test_campaign_finished_event_on_success() {
    let (env, client, token, _) = setup();
    let contributor = funded(&env, &token, ONE_UNIT);
    client.contribute(&contributor, &ONE_UNIT);

    env.ledger().set_timestamp(601);
    client.finalize();

    let (contract, topics, data) = last_event(&env, &client.address);
    assert_eq!(contract, client.address);
    assert_eq!(topics, vec![&env, symbol_short!("finished").into_val(&env)]);

    let event_data: CampaignFinished = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        CampaignFinished {
            total_collected: ONE_UNIT,
            succeeded: true,
        }
    );
}

#[test]
fn test_campaign_finished_event_on_failure() {
    let (env, client, _, _) = setup();

    env.ledger().set_timestamp(601);
    client.finalize();

    let (_, topics, data) = last_event(&env, &client.address);
    assert_eq!(topics, vec![&env, symbol_short!("finished").into_val(&env)]);

    let event_data: CampaignFinished = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        CampaignFinished {
            total_collected: 0,
            succeeded: false,
        }
    );
}

#[test]
fn test_funds_collected_event() {
    let (env, client, token, beneficiary) = setup();
    let contributor = funded(&env, &token, ONE_UNIT);
    client.contribute(&contributor, &ONE_UNIT);
    env.ledger().set_timestamp(601);
    client.finalize();

    client.collect(&beneficiary);

    let (contract, topics, data) = last_event(&env, &client.address);
    assert_eq!(contract, client.address);
    assert_eq!(topics, vec![&env, symbol_short!("collected").into_val(&env)]);

    let event_data: FundsCollected = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FundsCollected {
            beneficiary: beneficiary.clone(),
            amount: ONE_UNIT,
        }
    );
}

#[test]
fn test_contribution_refunded_event() {
    let (env, client, token, _) = setup();
    let contributor = funded(&env, &token, ONE_UNIT);
    client.contribute(&contributor, &(ONE_UNIT - 100));
    env.ledger().set_timestamp(601);
    client.finalize();

    client.withdraw(&contributor);

    let (contract, topics, data) = last_event(&env, &client.address);
    assert_eq!(contract, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("refunded").into_val(&env),
        contributor.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: ContributionRefunded = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ContributionRefunded {
            contributor: contributor.clone(),
            amount: ONE_UNIT - 100,
        }
    );
}
