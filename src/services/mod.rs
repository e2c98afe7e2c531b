//! Business logic services

pub mod books;
pub mod email;
pub mod loans;
pub mod notifications;

use std::sync::Arc;

use crate::{
    config::{EmailConfig, NotificationConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub books: books::BooksService,
    pub loans: loans::LoansService,
    pub notifier: notifications::LateLoanNotifier,
}

impl Services {
    /// Create all services with the given repository and the SMTP mailer
    pub fn new(
        repository: Repository,
        email_config: EmailConfig,
        notification_config: NotificationConfig,
    ) -> Self {
        Self::with_mailer(
            repository,
            Arc::new(email::EmailService::new(email_config)),
            notification_config,
        )
    }

    pub fn with_mailer(
        repository: Repository,
        mailer: Arc<dyn email::Mailer>,
        notification_config: NotificationConfig,
    ) -> Self {
        let loans = loans::LoansService::new(repository.clone(), notification_config.late_after_days);
        Self {
            books: books::BooksService::new(repository.clone()),
            notifier: notifications::LateLoanNotifier::new(loans.clone(), mailer, notification_config),
            loans,
            repository,
        }
    }
}
