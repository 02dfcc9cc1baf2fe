//! No-op notifier, used when notifications are disabled

use async_trait::async_trait;

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

#[derive(Debug, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(
        &self,
        _title: &str,
        _message: &str,
        _icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_returns_ok() {
        let notifier = NoOpNotifier;
        assert!(notifier
            .notify("vibecam", "saved", NotificationIcon::Saved)
            .await
            .is_ok());
    }
}
