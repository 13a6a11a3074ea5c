use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::program::Program;
use crate::program::PROGRAM;
use crate::program::calendar::{ProgramPosition, program_position};
use crate::store::{AppData, StateStore};

pub async fn start_scheduler(store: Arc<StateStore>, cron: &str) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let store_clone = Arc::clone(&store);

    scheduler
        .add(Job::new_async(cron, move |_uuid, _l| {
            let store = Arc::clone(&store_clone);
            Box::pin(async move {
                if let Err(e) = run_reminder(&store, Local::now().date_naive()).await {
                    tracing::error!(error = %e, "cron.reminder_failed");
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!(%cron, "cron.scheduled");
    Ok(scheduler)
}

/// Label of today's session when a reminder should go out, `None` otherwise.
pub fn reminder_due(program: &Program, data: &AppData, today: NaiveDate) -> Option<String> {
    let start = data.start_date?;
    let ProgramPosition::Active {
        week_number,
        day_index,
    } = program_position(start, today)
    else {
        return None;
    };

    let day = program.day(week_number, day_index)?;
    if day.is_rest_day
        || data.workout_logs.contains_key(&today)
        || data.last_reminder_date == Some(today)
    {
        return None;
    }
    Some(day.label.clone())
}

pub async fn run_reminder(store: &StateStore, today: NaiveDate) -> anyhow::Result<()> {
    let data = store.snapshot().await;
    let Some(label) = reminder_due(&PROGRAM, &data, today) else {
        tracing::debug!(%today, "reminder.skipped");
        return Ok(());
    };

    store
        .update(|data| {
            let mut next = data.clone();
            next.last_reminder_date = Some(today);
            Ok((next, ()))
        })
        .await?;

    tracing::info!(%today, day_label = %label, "reminder.workout_day");
    Ok(())
}
