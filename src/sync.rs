use poise::serenity_prelude::{CreateEmbed, CreateMessage, Http};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    error::QuoteError,
    reconcile::reconcile,
    remote::{accept_remote, RemoteSource},
    storage::Slot,
    store::QuoteStore,
    Data, Error,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncReport {
    pub remote: usize,
    pub kept_local: usize,
    pub overwritten: Vec<i64>,
    pub changed: usize,
}

impl SyncReport {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "quotes synced with the server: {} from the server, {} local quotes kept.",
            self.remote, self.kept_local
        );

        if !self.overwritten.is_empty() {
            summary += &format!(
                "\nconflicts resolved: the server's copy replaced {} local quotes sharing an id ({} of them differed).",
                self.overwritten.len(),
                self.changed
            );
        }

        summary
    }
}

/// runs one reconciliation cycle.
///
/// the fetch happens without holding the store lock. a failed fetch leaves the
/// store untouched; a successful one is merged into whatever the store holds
/// by the time the lock is acquired, then persisted.
#[tracing::instrument(skip_all)]
pub async fn sync_quotes<S, R>(
    store: &Mutex<QuoteStore<S>>,
    remote: &R,
) -> Result<SyncReport, QuoteError>
where
    S: Slot,
    R: RemoteSource + ?Sized,
{
    let fetched = remote.fetch_remote().await.inspect_err(
        |e| tracing::warn!(err = %e, "couldn't fetch remote quotes, skipping this sync"),
    )?;
    let fetched = accept_remote(fetched);

    let mut store = store.lock().await;
    let merged = reconcile(store.quotes(), fetched);

    let report = SyncReport {
        remote: merged.remote,
        kept_local: merged.kept_local,
        overwritten: merged.overwritten,
        changed: merged.changed,
    };

    store.replace(merged.quotes).await.inspect_err(
        |e| tracing::error!(err = %e, "an error occurred when persisting synced quotes"),
    )?;

    tracing::info!(
        remote = report.remote,
        kept_local = report.kept_local,
        overwritten = report.overwritten.len(),
        changed = report.changed,
        "finished syncing quotes"
    );

    Ok(report)
}

/// runs a sync cycle against the configured remote and records when it succeeded.
pub async fn sync_now(data: &Data) -> Result<SyncReport, QuoteError> {
    let report = sync_quotes(&*data.store, &data.remote).await?;

    *data.last_sync.lock().await = Some(OffsetDateTime::now_utc());

    Ok(report)
}

/// the periodic sync task. reports the outcome to the sync channel, if one is set.
#[tracing::instrument(skip_all)]
pub async fn quote_sync(http: &Http, data: &Data) -> Result<(), Error> {
    tracing::info!("started syncing quotes with the server!");

    let embed = match sync_now(data).await {
        Ok(report) => CreateEmbed::default()
            .title("quotes synced")
            .description(report.summary()),
        Err(e) => CreateEmbed::default()
            .title("quote sync failed")
            .description(e.to_string()),
    };

    if let Some(channel_id) = data.quote_sync_channel_id {
        channel_id
            .send_message(http, CreateMessage::new().add_embed(embed))
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending message"))?;
    }

    Ok(())
}
