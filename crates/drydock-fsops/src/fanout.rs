//! Scatter/await-all helper for independent per-path operations.
//!
//! Every task is issued up front and polled concurrently on the current task; the
//! aggregate resolves only after all of them have finished, successful or not.

use std::future::Future;

use futures_util::future::join_all;

/// Per-task outcomes in the order the tasks were issued.
#[derive(Debug)]
pub struct Outcomes<K, T, E> {
    entries: Vec<(K, Result<T, E>)>,
}

impl<K, T, E> Outcomes<K, T, E> {
    /// Number of tasks that were issued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tasks were issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every failed task with its key.
    pub fn failures(&self) -> impl Iterator<Item = (&K, &E)> {
        self.entries
            .iter()
            .filter_map(|(key, result)| result.as_ref().err().map(|err| (key, err)))
    }

    /// Collapse into the successful values, or the first failure in issue order.
    ///
    /// # Errors
    ///
    /// Returns the key and error of the earliest issued task that failed.
    pub fn into_result(self) -> Result<Vec<(K, T)>, (K, E)> {
        self.entries
            .into_iter()
            .map(|(key, result)| match result {
                Ok(value) => Ok((key, value)),
                Err(err) => Err((key, err)),
            })
            .collect()
    }
}

/// Issue `op` for every key concurrently and wait for all of them.
pub async fn await_all<K, T, E, F, Fut>(keys: impl IntoIterator<Item = K>, op: F) -> Outcomes<K, T, E>
where
    K: Clone,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let keys: Vec<K> = keys.into_iter().collect();
    let results = join_all(keys.iter().cloned().map(op)).await;
    Outcomes {
        entries: keys.into_iter().zip(results).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn await_all_runs_every_task_after_a_failure() {
        let completed = Arc::new(AtomicUsize::new(0));
        let outcomes = await_all(0_u32..4, |key| {
            let completed = Arc::clone(&completed);
            async move {
                tokio::time::sleep(Duration::from_millis(u64::from(key) * 5)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                if key == 1 { Err("boom") } else { Ok(key * 10) }
            }
        })
        .await;

        assert_eq!(completed.load(Ordering::SeqCst), 4);
        assert_eq!(outcomes.len(), 4);
        let failed: Vec<u32> = outcomes.failures().map(|(key, _)| *key).collect();
        assert_eq!(failed, vec![1]);
        assert_eq!(outcomes.into_result().err(), Some((1, "boom")));
    }

    #[tokio::test]
    async fn into_result_reports_earliest_issued_failure() {
        let outcomes = await_all(["slow", "fast"], |key| async move {
            let delay = if key == "slow" { 20 } else { 0 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Err::<(), _>(key)
        })
        .await;

        assert_eq!(outcomes.failures().count(), 2);
        assert_eq!(outcomes.into_result().err(), Some(("slow", "slow")));
    }

    #[tokio::test]
    async fn empty_input_resolves_immediately() {
        let outcomes = await_all(Vec::<u8>::new(), |key| async move { Ok::<_, ()>(key) }).await;
        assert!(outcomes.is_empty());
        assert_eq!(outcomes.into_result(), Ok(Vec::new()));
    }

    #[tokio::test]
    async fn successes_keep_issue_order() {
        let outcomes = await_all([3_u8, 1, 2], |key| async move {
            tokio::time::sleep(Duration::from_millis(u64::from(key))).await;
            Ok::<_, ()>(key * 2)
        })
        .await;
        assert_eq!(outcomes.into_result(), Ok(vec![(3, 6), (1, 2), (2, 4)]));
    }
}
