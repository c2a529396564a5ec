//! Confirmed, best-effort single-field updates over a list of activities, and
//! the gear assignment workflow built on them.

use std::future::Future;
use std::time::Duration;

use crate::gear::{self, describe_gear};
use crate::{
    AccessToken, Activity, ActivityQuery, ActivityUpdate, Prompt, StravaClient, StravaConfig,
    StravaError, dates,
};

/// Activity type the gear workflow targets.
pub const RUN: &str = "Run";

/// Activities of `activity_type` that have no gear attached yet, in input order.
pub fn gear_candidates(activities: &[Activity], activity_type: &str) -> Vec<Activity> {
    activities
        .iter()
        .filter(|activity| activity.activity_type == activity_type && !activity.has_gear())
        .cloned()
        .collect()
}

pub fn describe_activity(activity: &Activity) -> String {
    format!(
        "{} (ID: {}, Date: {})",
        activity.name,
        activity.id,
        activity.start_date.to_rfc3339()
    )
}

pub fn list_activities(activities: &[Activity]) {
    for (index, activity) in activities.iter().enumerate() {
        println!("{}. {}", index + 1, describe_activity(activity));
    }
}

/// Only the exact word `yes`, in any case, confirms.
pub fn is_confirmed(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("yes")
}

#[derive(Debug)]
pub enum BulkReport {
    /// No activity in the range needed an update; nothing was asked or sent.
    NothingToUpdate,
    /// The user declined; nothing was sent.
    Cancelled,
    Completed {
        succeeded: Vec<u64>,
        failed: Vec<StravaError>,
    },
}

impl BulkReport {
    pub fn update_count(&self) -> usize {
        match self {
            Self::NothingToUpdate | Self::Cancelled => 0,
            Self::Completed { succeeded, failed } => succeeded.len() + failed.len(),
        }
    }
}

/// Shows the plan, asks for confirmation, then updates each activity in order.
///
/// A failed update is reported and skipped; it never stops the pass.
pub async fn bulk_update<P>(
    client: &StravaClient,
    prompt: &mut P,
    activities: &[Activity],
    update: &ActivityUpdate,
) -> Result<BulkReport, StravaError>
where
    P: Prompt + ?Sized,
{
    println!("\nStarting bulk edit of activities...");
    println!("\nThe following activities will be updated:");
    list_activities(activities);

    let answer = prompt.ask("\nDo you want to proceed with the bulk edit? (yes/no): ")?;
    if !is_confirmed(&answer) {
        println!("\nBulk edit canceled by the user.");
        return Ok(BulkReport::Cancelled);
    }

    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for activity in activities {
        match client.update_activity(activity.id, update).await {
            Ok(_) => {
                println!(
                    "Successfully updated activity: {} (ID: {})",
                    activity.name, activity.id
                );
                succeeded.push(activity.id);
            }
            Err(err) => {
                let failure = StravaError::PerItemUpdateFailure {
                    activity_id: activity.id,
                    name: activity.name.clone(),
                    payload: failure_payload(err),
                };
                eprintln!("{failure}");
                tracing::debug!(
                    activity_id = activity.id,
                    field = update.field(),
                    "update failed"
                );
                failed.push(failure);
            }
        }
    }

    println!("\nBulk edit completed.");
    Ok(BulkReport::Completed { succeeded, failed })
}

fn failure_payload(err: StravaError) -> String {
    match err {
        StravaError::HttpStatus { status, body } if !body.is_empty() => {
            format!("{status} {body}")
        }
        other => other.to_string(),
    }
}

/// Assigns one pair of shoes to every run in a prompted date range that has
/// no gear yet.
///
/// The range is prompted and validated before `authorize` runs, so a bad range
/// never reaches the network.
pub async fn run<P, A, Fut>(
    config: &StravaConfig,
    prompt: &mut P,
    authorize: A,
) -> Result<BulkReport, StravaError>
where
    P: Prompt + ?Sized,
    A: FnOnce() -> Fut,
    Fut: Future<Output = Result<AccessToken, StravaError>>,
{
    let range = dates::prompt_date_range(prompt)?;

    let token = authorize().await?;
    let client = StravaClient::new(config, token)?;

    let gear_id = gear::select_gear(&client, prompt).await?;

    println!("\nFetching running activities...");
    let (after, before) = range.epoch_window();
    let activities = client
        .fetch_activities(&ActivityQuery::window(after, before))
        .await?;
    let candidates = gear_candidates(&activities, RUN);
    if candidates.is_empty() {
        println!(
            "\nNo running activities found within the specified date range that need gear updates."
        );
        return Ok(BulkReport::NothingToUpdate);
    }

    println!("\nRunning Activities (without gear):");
    list_activities(&candidates);

    let update = ActivityUpdate::Gear(gear_id);
    let report = bulk_update(&client, prompt, &candidates, &update).await?;
    if let BulkReport::Completed { .. } = report {
        show_gear_mileage(&client, config.settle_delay).await?;
    }
    Ok(report)
}

/// Waits `settle_delay`, then prints each shoe's mileage as the API now reports it.
pub async fn show_gear_mileage(
    client: &StravaClient,
    settle_delay: Duration,
) -> Result<(), StravaError> {
    if !settle_delay.is_zero() {
        println!(
            "\nWaiting {} seconds to ensure updates are reflected...",
            settle_delay.as_secs()
        );
        tokio::time::sleep(settle_delay).await;
    }

    let athlete = client.get_athlete().await?;
    if !athlete.shoes.is_empty() {
        println!("\nUpdated Running Shoes Mileage:");
        for item in &athlete.shoes {
            println!("{}", describe_gear(item));
        }
    }
    Ok(())
}
