#![allow(dead_code)]

extern crate std;

use crate::types::{Campaign, CampaignStatus};

/// INV-1: Target amount must always be positive.
pub fn assert_target_positive(campaign: &Campaign) {
    assert!(
        campaign.target_amount > 0,
        "INV-1 violated: non-positive target ({})",
        campaign.target_amount
    );
}

/// INV-2: Totals are never negative.
pub fn assert_total_non_negative(campaign: &Campaign) {
    assert!(
        campaign.total_collected >= 0,
        "INV-2 violated: negative total ({})",
        campaign.total_collected
    );
}

/// INV-3: While Ongoing or Failed, the total equals the sum of the recorded
/// contributions.
pub fn assert_total_matches_contributions(campaign: &Campaign, contributions: &[i128]) {
    if matches!(
        campaign.status,
        CampaignStatus::Ongoing | CampaignStatus::Failed
    ) {
        let sum: i128 = contributions.iter().sum();
        assert_eq!(
            campaign.total_collected, sum,
            "INV-3 violated: total {} != sum of contributions {}",
            campaign.total_collected, sum
        );
    }
}

/// INV-4: Only forward transitions are allowed:
///   Ongoing   -> Failed | Succeeded
///   Succeeded -> PaidOut
///   Failed    -> (none)
///   PaidOut   -> (none)
pub fn assert_valid_status_transition(from: &CampaignStatus, to: &CampaignStatus) {
    let valid = from == to
        || matches!(
            (from, to),
            (CampaignStatus::Ongoing, CampaignStatus::Failed)
                | (CampaignStatus::Ongoing, CampaignStatus::Succeeded)
                | (CampaignStatus::Succeeded, CampaignStatus::PaidOut)
        );

    assert!(
        valid,
        "INV-4 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-5: Fields fixed at creation never change.
pub fn assert_immutable_fields(original: &Campaign, current: &Campaign) {
    assert_eq!(original.creator, current.creator, "INV-5 violated: creator changed");
    assert_eq!(original.name, current.name, "INV-5 violated: name changed");
    assert_eq!(original.token, current.token, "INV-5 violated: token changed");
    assert_eq!(
        original.target_amount, current.target_amount,
        "INV-5 violated: target_amount changed"
    );
    assert_eq!(
        original.funding_deadline, current.funding_deadline,
        "INV-5 violated: funding_deadline changed"
    );
    assert_eq!(
        original.beneficiary, current.beneficiary,
        "INV-5 violated: beneficiary changed"
    );
}

/// INV-6: Total is frozen from Succeeded on.
pub fn assert_total_frozen_after_success(before: &Campaign, after: &Campaign) {
    if matches!(
        before.status,
        CampaignStatus::Succeeded | CampaignStatus::PaidOut
    ) {
        assert_eq!(
            before.total_collected, after.total_collected,
            "INV-6 violated: total changed after success"
        );
    }
}

/// INV-7: contributor_count never decreases.
pub fn assert_contributor_count_monotonic(count_before: u32, count_after: u32) {
    assert!(
        count_after >= count_before,
        "INV-7 violated: contributor_count decreased from {} to {}",
        count_before,
        count_after
    );
}

/// Check every invariant that relates two consecutive snapshots.
pub fn assert_step_invariants(before: &Campaign, after: &Campaign) {
    assert_immutable_fields(before, after);
    assert_valid_status_transition(&before.status, &after.status);
    assert_total_frozen_after_success(before, after);
    assert_contributor_count_monotonic(before.contributor_count, after.contributor_count);
}

/// Run all stateless campaign invariants.
pub fn assert_all_campaign_invariants(campaign: &Campaign) {
    assert_target_positive(campaign);
    assert_total_non_negative(campaign);
}
