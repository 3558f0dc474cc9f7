use async_trait::async_trait;
use wgmon_types::SortedBuckets;

/// Dispatch surface consumed by the orchestrator.
///
/// Implementations report partial failures through logging; the single
/// returned boolean is all the scheduler needs to decide whether the report
/// counted.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Deliver one report. Returns overall success.
    async fn dispatch(&self, body: &str, cycle: u64, buckets: &SortedBuckets) -> bool;
}

#[cfg(any(test, feature = "mocks"))]
mockall::mock! {
    pub Notify { }

    #[async_trait]
    impl Notify for Notify {
        async fn dispatch(&self, body: &str, cycle: u64, buckets: &SortedBuckets) -> bool;
    }
}
