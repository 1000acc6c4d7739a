use chrono::NaiveDate;

use super::super::domain::UserSnapshot;
use super::TrustBreakdown;

const PROFILE_ITEM_POINTS: u32 = 5;

const ORDER_POINTS: u32 = 2;
const ORDER_POINTS_CAP: u32 = 14;
const HIGHLY_ACTIVE_DAYS: u8 = 15;
const HIGHLY_ACTIVE_POINTS: u32 = 6;
const ACTIVE_DAYS: u8 = 5;
const ACTIVE_POINTS: u32 = 3;

const RATING_MULTIPLIER: f32 = 3.0;
const RATING_POINTS_CAP: u32 = 15;
const ON_TIME_POINTS: f32 = 5.0;

const GIG_POINTS: u32 = 2;
const GIG_POINTS_CAP: u32 = 6;
const PORTFOLIO_POINTS_CAP: u32 = 4;

const FOLLOWERS_PER_POINT: u32 = 10;
const FOLLOWER_POINTS_CAP: u32 = 5;
const ENDORSEMENT_POINTS_CAP: u32 = 5;

const REPORT_PENALTY: u32 = 10;
const CANCELLATION_PENALTY: u32 = 3;
const DISPUTE_PENALTY: u32 = 8;

/// Raised when a snapshot carries values no sub-score can interpret.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub(crate) enum ScoringError {
    #[error("average rating {0} is outside 0-5")]
    RatingOutOfRange(f32),
    #[error("on-time delivery rate {0} is outside 0-1")]
    DeliveryRateOutOfRange(f32),
    #[error("account created on {created} which is after {today}")]
    AccountFromFuture { created: NaiveDate, today: NaiveDate },
}

pub(crate) fn score_snapshot(
    snapshot: &UserSnapshot,
    today: NaiveDate,
) -> Result<TrustBreakdown, ScoringError> {
    let profile = profile_points(snapshot);
    let longevity = longevity_points(snapshot.account_created_on, today)?;
    let activity = activity_points(snapshot);
    let quality = quality_points(snapshot)?;
    let content = content_points(snapshot);
    let social = social_points(snapshot);
    let penalty = penalty_points(snapshot);

    let earned = profile + longevity + activity + quality + content + social;
    let raw_total = i64::from(earned) - i64::from(penalty);

    Ok(TrustBreakdown {
        profile,
        longevity,
        activity,
        quality,
        content,
        social,
        penalty,
        raw_total,
    })
}

fn profile_points(snapshot: &UserSnapshot) -> u32 {
    let signals = &snapshot.profile;
    [
        signals.has_avatar,
        signals.has_bio,
        !signals.skills.is_empty(),
        signals.portfolio_items > 0,
        signals.phone_verified,
    ]
    .into_iter()
    .filter(|present| *present)
    .count() as u32
        * PROFILE_ITEM_POINTS
}

fn longevity_points(created: NaiveDate, today: NaiveDate) -> Result<u32, ScoringError> {
    let age_days = (today - created).num_days();
    if age_days < 0 {
        return Err(ScoringError::AccountFromFuture { created, today });
    }

    let points = match age_days {
        365.. => 15,
        180..=364 => 10,
        30..=179 => 5,
        7..=29 => 2,
        _ => 0,
    };
    Ok(points)
}

fn activity_points(snapshot: &UserSnapshot) -> u32 {
    let orders = snapshot
        .activity
        .completed_orders
        .saturating_mul(ORDER_POINTS)
        .min(ORDER_POINTS_CAP);

    let engagement = match snapshot.activity.active_days_last_30 {
        days if days >= HIGHLY_ACTIVE_DAYS => HIGHLY_ACTIVE_POINTS,
        days if days >= ACTIVE_DAYS => ACTIVE_POINTS,
        _ => 0,
    };

    orders + engagement
}

fn quality_points(snapshot: &UserSnapshot) -> Result<u32, ScoringError> {
    let signals = snapshot.quality;
    if !signals.average_rating.is_finite() || !(0.0..=5.0).contains(&signals.average_rating) {
        return Err(ScoringError::RatingOutOfRange(signals.average_rating));
    }
    if !signals.on_time_delivery_rate.is_finite()
        || !(0.0..=1.0).contains(&signals.on_time_delivery_rate)
    {
        return Err(ScoringError::DeliveryRateOutOfRange(
            signals.on_time_delivery_rate,
        ));
    }

    if signals.review_count == 0 {
        return Ok(0);
    }

    let rating = ((signals.average_rating * RATING_MULTIPLIER).round() as u32).min(RATING_POINTS_CAP);
    let delivery = (signals.on_time_delivery_rate * ON_TIME_POINTS).round() as u32;
    Ok(rating + delivery)
}

fn content_points(snapshot: &UserSnapshot) -> u32 {
    let gigs = snapshot
        .content
        .gigs_posted
        .saturating_mul(GIG_POINTS)
        .min(GIG_POINTS_CAP);
    let portfolio = snapshot.profile.portfolio_items.min(PORTFOLIO_POINTS_CAP);
    gigs + portfolio
}

fn social_points(snapshot: &UserSnapshot) -> u32 {
    let followers = (snapshot.social.followers / FOLLOWERS_PER_POINT).min(FOLLOWER_POINTS_CAP);
    let endorsements = snapshot.social.endorsements.min(ENDORSEMENT_POINTS_CAP);
    followers + endorsements
}

fn penalty_points(snapshot: &UserSnapshot) -> u32 {
    let penalties = snapshot.penalties;
    penalties
        .reports_upheld
        .saturating_mul(REPORT_PENALTY)
        .saturating_add(penalties.cancellations.saturating_mul(CANCELLATION_PENALTY))
        .saturating_add(penalties.disputes_lost.saturating_mul(DISPUTE_PENALTY))
}
