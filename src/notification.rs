use crate::export::PublishReport;

const APP_NAME: &str = "sketchlog";

pub trait Notifier {
    fn notify(&self, summary: &str, body: &str);
}

/// Desktop notifications through the session's notification daemon.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, summary: &str, body: &str) {
        if let Err(err) = notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(summary)
            .body(body)
            .show()
        {
            tracing::warn!("system notification failed: {err}");
        }
    }
}

/// Sends exactly one notification describing `report`.
pub fn report_publish(notifier: &dyn Notifier, report: &PublishReport) {
    match report {
        PublishReport::Published { hash, transaction } => notifier.notify(
            "Drawing published",
            &format!("IPFS hash {hash} recorded in transaction {transaction}"),
        ),
        PublishReport::Failed { stage, message } => {
            notifier.notify("Publish failed", &format!("{stage} step failed: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::export::PublishStage;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: RefCell<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, summary: &str, body: &str) {
            self.sent
                .borrow_mut()
                .push((summary.to_string(), body.to_string()));
        }
    }

    #[test]
    fn published_report_mentions_hash() {
        let notifier = RecordingNotifier::default();
        report_publish(
            &notifier,
            &PublishReport::Published {
                hash: "QmAbc".into(),
                transaction: "0x12".into(),
            },
        );

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "Drawing published");
        assert!(sent[0].1.contains("QmAbc"));
    }

    #[test]
    fn failed_report_names_stage() {
        let notifier = RecordingNotifier::default();
        report_publish(
            &notifier,
            &PublishReport::Failed {
                stage: PublishStage::Upload,
                message: "connection refused".into(),
            },
        );

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "upload step failed: connection refused");
    }
}
