use async_trait::async_trait;

/// Append-only external tabular store. One call appends one row atomically or fails.
#[async_trait]
pub trait TabularStore: Send + Sync {
    async fn append_row(&self, row: &[String; 3]) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: TabularStore + ?Sized> TabularStore for std::sync::Arc<T> {
    async fn append_row(&self, row: &[String; 3]) -> anyhow::Result<()> {
        (**self).append_row(row).await
    }
}

#[async_trait]
impl<T: TabularStore + ?Sized> TabularStore for Box<T> {
    async fn append_row(&self, row: &[String; 3]) -> anyhow::Result<()> {
        (**self).append_row(row).await
    }
}

/// Store used when no spreadsheet is configured: the row is only written to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingStore;

#[async_trait]
impl TabularStore for TracingStore {
    async fn append_row(&self, row: &[String; 3]) -> anyhow::Result<()> {
        tracing::info!(
            name = %row[0],
            affiliation = %row[1],
            timestamp = %row[2],
            "no spreadsheet configured, row not persisted"
        );
        Ok(())
    }
}
