use std::{sync::mpsc::Sender, thread};

use crate::{
    adapter::load_issues_from_jira,
    app::{FetchRequest, FetchResult},
};

/// Runs one search on its own thread and posts the result back. Requests are
/// neither coalesced nor cancelled: overlapping fetches all report, and the
/// app applies whichever result arrives last.
pub fn spawn_fetch(request: FetchRequest, result_tx: Sender<FetchResult>) {
    thread::spawn(move || {
        let result = load_issues_from_jira(&request.settings);
        if result_tx
            .send(FetchResult {
                generation: request.generation,
                result,
            })
            .is_err()
        {
            tracing::debug!(
                generation = request.generation,
                "dashboard closed before fetch finished"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, time::Duration};

    use jiratab_config::Settings;
    use jiratab_jira::FetchError;

    use super::spawn_fetch;
    use crate::app::FetchRequest;

    #[test]
    fn delivers_result_with_request_generation() {
        let (tx, rx) = mpsc::channel();
        spawn_fetch(
            FetchRequest {
                generation: 7,
                settings: Settings::default(),
            },
            tx,
        );

        let message = rx.recv_timeout(Duration::from_secs(5)).expect("result");
        assert_eq!(message.generation, 7);
        assert!(matches!(message.result, Err(FetchError::NotConfigured(_))));
    }
}
