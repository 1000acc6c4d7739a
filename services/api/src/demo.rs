use crate::infra::{InMemoryContextProvider, InMemoryPublicationSink};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;
use gig_publish::config::AppConfig;
use gig_publish::error::AppError;
use gig_publish::workflows::publication::{
    DispatchOutcome, EligibilityReport, FlowView, GigSummary, PublicationMode, PublicationService,
    TrustAssessment, UserId, UserSnapshot, WizardAction,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EligibilityArgs {
    /// Path to a JSON user snapshot
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Number of gigs the user already has
    #[arg(long, default_value_t = 0)]
    pub(crate) existing_gigs: usize,
    /// Treat the user as still inside the free grace period
    #[arg(long)]
    pub(crate) grace_period: bool,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seeded seller to walk through the wizard (studio-nova, fresh-writer, pending-kyc)
    #[arg(long)]
    pub(crate) seller: Option<String>,
    /// Publication mode to pick: create, regular, or automatic. Defaults to the first allowed mode.
    #[arg(long, value_parser = parse_mode)]
    pub(crate) mode: Option<PublicationMode>,
    /// Days ahead to schedule an automatic publication
    #[arg(long, default_value_t = 3)]
    pub(crate) schedule_in_days: i64,
    /// Override the demo date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_eligibility_report(args: EligibilityArgs) -> Result<(), AppError> {
    let EligibilityArgs {
        snapshot,
        existing_gigs,
        grace_period,
        today,
    } = args;

    let raw = fs::read_to_string(&snapshot)?;
    let snapshot: UserSnapshot = serde_json::from_str(&raw)?;
    let policy = AppConfig::load()?.eligibility;
    let now = demo_clock(today);

    let report = EligibilityReport::build(&policy, &snapshot, existing_gigs, grace_period, now);
    render_report(&report, now.date_naive());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seller,
        mode,
        schedule_in_days,
        today,
    } = args;

    let now = demo_clock(today);
    let user_id = UserId(seller.unwrap_or_else(|| "studio-nova".to_string()));
    let policy = AppConfig::load()?.eligibility;

    let provider = Arc::new(InMemoryContextProvider::seeded());
    let sink = Arc::new(InMemoryPublicationSink::default());
    let service = PublicationService::new(provider.clone(), sink.clone(), policy);

    println!("Gig publication demo for {} ({})", user_id.0, now.date_naive());
    let (session_id, view) = service.open_session(user_id.clone(), now)?;
    println!("- Opened flow {}", session_id.0);

    let report = match view {
        FlowView::Ready { report, .. } => report,
        FlowView::Loading { .. } => {
            println!("  Account data is still loading; eligibility deferred");
            return Ok(());
        }
        FlowView::Closed => {
            println!("  Flow closed before it could render");
            return Ok(());
        }
    };
    render_report(&report, now.date_naive());

    let Some(mode) = mode.or_else(|| report.available_modes.first().copied()) else {
        println!("\nNo publication mode is available; the wizard stops at eligibility.");
        service.close_session(&session_id);
        return Ok(());
    };

    let mut actions = vec![
        WizardAction::Continue,
        WizardAction::SelectOption { mode },
    ];
    if mode == PublicationMode::Automatic {
        actions.push(WizardAction::SelectDate {
            date: now + Duration::days(schedule_in_days),
        });
    }
    actions.push(WizardAction::Continue);

    println!("\nWizard walkthrough");
    for action in actions {
        match service.apply(&session_id, action.clone(), now) {
            Ok(view) => println!("- {:?} -> {}", action, describe_step(&view)),
            Err(err) => {
                println!("- {:?} rejected: {}", action, err);
                service.close_session(&session_id);
                return Ok(());
            }
        }
    }

    println!("\nSubmitting '{}'", mode.label());
    match service.submit(&session_id, None, now) {
        Ok(DispatchOutcome::Dispatched { request }) => {
            println!(
                "- Dispatched {} for {} at {}",
                request.mode.label(),
                request.user_id.0,
                request.publish_at
            );
            provider.record_gig(
                &request.user_id,
                GigSummary {
                    gig_id: format!("{}-draft-{}", request.user_id.0, sink.published().len()),
                    title: "Demo gig".to_string(),
                },
            );
        }
        Ok(DispatchOutcome::AlreadyInFlight) => {
            println!("- A submission is already in flight; nothing sent");
        }
        Err(err) => println!("- Submission blocked: {}", err),
    }
    service.close_session(&session_id);

    let published = sink.published();
    if published.is_empty() {
        println!("Publication sink: no requests received");
    } else {
        println!("Publication sink:");
        for request in &published {
            match serde_json::to_string(request) {
                Ok(json) => println!("  {}", json),
                Err(err) => println!("  payload unavailable: {}", err),
            }
        }
    }

    let after = service.eligibility(&user_id, now)?;
    println!(
        "Modes available after publishing: {} ({})",
        mode_list(&after.available_modes),
        inputs_line(&after)
    );

    Ok(())
}

fn render_report(report: &EligibilityReport, today: NaiveDate) {
    println!("Eligibility for {} on {}", report.user_id.0, today);
    println!("  Inputs: {}", inputs_line(report));
    render_trust(&report.trust);

    let flags = &report.eligibility;
    println!(
        "  Trust thresholds: basic {} | regular {} | automatic {}",
        yes_no(flags.has_min_trust_for_basic),
        yes_no(flags.has_min_trust_for_regular),
        yes_no(flags.has_min_trust_for_automatic)
    );
    println!("  Can create more gigs: {}", yes_no(flags.can_create_more_gigs));
    for mode in PublicationMode::ALL {
        println!("  - {}: {}", mode.label(), yes_no(flags.allows(mode)));
    }

    if report.notices.is_empty() {
        println!("  Notices: none");
    } else {
        println!("  Notices:");
        for notice in &report.notices {
            println!("    - {}", notice);
        }
    }
}

fn render_trust(trust: &TrustAssessment) {
    match &trust.breakdown {
        Some(breakdown) => {
            println!(
                "  Trust score {} (raw {})",
                trust.score.value(),
                breakdown.raw_total
            );
            println!(
                "    profile {} | longevity {} | activity {} | quality {} | content {} | social {} | penalty -{}",
                breakdown.profile,
                breakdown.longevity,
                breakdown.activity,
                breakdown.quality,
                breakdown.content,
                breakdown.social,
                breakdown.penalty
            );
        }
        None => println!(
            "  Trust score {} (fallback; snapshot could not be scored)",
            trust.score.value()
        ),
    }
}

fn describe_step(view: &FlowView) -> String {
    match view {
        FlowView::Ready { wizard, .. } | FlowView::Loading { wizard } => {
            let mut line = wizard.step_label.to_string();
            if let Some(mode) = wizard.active_option {
                line.push_str(&format!(" [{}]", mode.label()));
            }
            if let Some(date) = wizard.selected_date {
                line.push_str(&format!(" scheduled {}", date));
            }
            line
        }
        FlowView::Closed => "closed".to_string(),
    }
}

fn inputs_line(report: &EligibilityReport) -> String {
    format!(
        "{} existing gigs | grace period {}",
        report.existing_gig_count,
        if report.in_grace_period {
            "active"
        } else {
            "inactive"
        }
    )
}

fn mode_list(modes: &[PublicationMode]) -> String {
    if modes.is_empty() {
        return "none".to_string();
    }
    modes
        .iter()
        .map(|mode| mode.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn demo_clock(today: Option<NaiveDate>) -> DateTime<Utc> {
    match today {
        Some(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
        None => Utc::now(),
    }
}

pub(crate) fn parse_mode(raw: &str) -> Result<PublicationMode, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "create" | "now" => Ok(PublicationMode::Create),
        "regular" | "draft" => Ok(PublicationMode::Regular),
        "automatic" | "schedule" => Ok(PublicationMode::Automatic),
        other => Err(format!(
            "unknown publication mode '{other}' (expected create, regular, or automatic)"
        )),
    }
}
