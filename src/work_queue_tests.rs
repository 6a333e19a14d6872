// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `work_queue.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn fast_backoff() -> ItemBackoff {
        ItemBackoff {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(20),
            ..ItemBackoff::default()
        }
        .without_jitter()
    }

    #[tokio::test]
    async fn test_add_deduplicates_waiting_keys() {
        let queue = WorkQueue::new();
        queue.add("ns1/svcA~1");
        queue.add("ns1/svcA~1");
        queue.add("ns1/svcB~1");

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.get().await.as_deref(), Some("ns1/svcA~1"));
        assert_eq!(queue.get().await.as_deref(), Some("ns1/svcB~1"));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_flags_are_distinct_keys() {
        let queue = WorkQueue::new();
        queue.add("ns1/svcA~1");
        queue.add("ns1/svcA~resync");

        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_key_added_while_processing_is_requeued_on_done() {
        let queue = WorkQueue::new();
        queue.add("Service~ns1/svcA");

        let key = queue.get().await.unwrap();
        queue.add("Service~ns1/svcA");
        assert!(queue.is_empty(), "processing key must not be handed out twice");

        queue.done(&key);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get().await.as_deref(), Some("Service~ns1/svcA"));
    }

    #[tokio::test]
    async fn test_done_without_readd_drops_key() {
        let queue = WorkQueue::new();
        queue.add("Service~ns1/svcA");

        let key = queue.get().await.unwrap();
        queue.done(&key);

        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_get_waits_for_add() {
        let queue = Arc::new(WorkQueue::new());

        let worker = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.get().await })
        };

        tokio::task::yield_now().await;
        queue.add("ConfigMap~kube-system/cm1");

        let key = timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker should be woken")
            .unwrap();
        assert_eq!(key.as_deref(), Some("ConfigMap~kube-system/cm1"));
    }

    #[tokio::test]
    async fn test_shut_down_drains_then_returns_none() {
        let queue = WorkQueue::new();
        queue.add("ns1/svcA");
        queue.shut_down();
        queue.add("ns1/svcB");

        assert_eq!(queue.get().await.as_deref(), Some("ns1/svcA"));
        assert_eq!(queue.get().await, None);
        assert!(queue.is_shutting_down());
    }

    #[tokio::test]
    async fn test_shut_down_wakes_waiting_workers() {
        let queue = Arc::new(WorkQueue::new());

        let worker = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.get().await })
        };

        tokio::task::yield_now().await;
        queue.shut_down();

        let key = timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker should be woken by shutdown")
            .unwrap();
        assert_eq!(key, None);
    }

    #[tokio::test]
    async fn test_add_rate_limited_counts_and_requeues() {
        let queue = Arc::new(WorkQueue::with_backoff(fast_backoff()));

        queue.add_rate_limited("ns1/svcA");
        queue.add_rate_limited("ns1/svcA");
        assert_eq!(queue.num_requeues("ns1/svcA"), 2);

        let key = timeout(Duration::from_secs(1), queue.get())
            .await
            .expect("rate-limited key should come back");
        assert_eq!(key.as_deref(), Some("ns1/svcA"));

        queue.forget("ns1/svcA");
        assert_eq!(queue.num_requeues("ns1/svcA"), 0);
    }

    #[tokio::test]
    async fn test_add_after_zero_delay_is_immediate() {
        let queue = Arc::new(WorkQueue::new());
        queue.add_after("ns1/svcA", Duration::ZERO);
        assert_eq!(queue.len(), 1);
    }
}
