//! Daily late-loan notification job

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::{config::NotificationConfig, error::AppResult};

use super::{email::Mailer, loans::LoansService};

#[derive(Clone)]
pub struct LateLoanNotifier {
    loans: LoansService,
    mailer: Arc<dyn Mailer>,
    config: NotificationConfig,
}

impl LateLoanNotifier {
    pub fn new(loans: LoansService, mailer: Arc<dyn Mailer>, config: NotificationConfig) -> Self {
        Self {
            loans,
            mailer,
            config,
        }
    }

    /// Email every customer holding a late loan. Returns the number of recipients.
    pub async fn notify_late_loans(&self) -> AppResult<usize> {
        let late_loans = self.loans.get_all_late_loans().await?;

        let recipients: Vec<String> = late_loans
            .into_iter()
            .filter_map(|loan| loan.email)
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if recipients.is_empty() {
            tracing::debug!("No late loans to notify");
            return Ok(0);
        }

        self.mailer
            .send_mail(&self.config.message, &recipients)
            .await?;

        Ok(recipients.len())
    }

    /// Scheduler loop, runs once a day at the configured hour (UTC)
    pub async fn run(self) {
        if !self.config.enabled {
            tracing::info!("Late-loan notifications disabled");
            return;
        }

        loop {
            let wait = duration_until_next_run(Utc::now(), self.config.hour);
            tracing::debug!(seconds = wait.num_seconds(), "Next late-loan notification scheduled");
            tokio::time::sleep(wait.to_std().unwrap_or_default()).await;

            match self.notify_late_loans().await {
                Ok(count) => tracing::info!(recipients = count, "Late-loan notification run completed"),
                Err(e) => tracing::error!("Late-loan notification run failed: {}", e),
            }
        }
    }
}

/// Time left until the next occurrence of `hour`:00 UTC, strictly in the future.
/// `hour` is checked by `NotificationConfig::validate`.
pub fn duration_until_next_run(now: DateTime<Utc>, hour: u32) -> Duration {
    let at = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default();
    let mut next = now.date_naive().and_time(at).and_utc();
    if next <= now {
        next += Duration::days(1);
    }
    next - now
}
