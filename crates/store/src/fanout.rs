//! Concurrent multi-key reads and writes.
//!
//! All keys of one operation are issued together and joined; every per-key
//! outcome is collected before the operation resolves.

use bytes::Bytes;
use futures::future::join_all;
use tracing::trace;

use crate::keys::StorageKey;
use crate::lookup::{FanOutReport, Lookup};
use crate::object_store::ObjectStore;

/// Write every `(key, body)` pair and report which ones landed
pub(crate) async fn put_all(
    store: &dyn ObjectStore,
    writes: Vec<(StorageKey, Bytes)>,
) -> FanOutReport {
    let results = join_all(writes.into_iter().map(|(key, body)| async move {
        let result = store.put(&key, body).await;
        (key, result)
    }))
    .await;

    let mut report = FanOutReport::default();
    for (key, result) in results {
        match result {
            Ok(()) => report.succeeded.push(key),
            Err(e) => report.failed.push((key, e)),
        }
    }
    report
}

/// Read every key, in order.
///
/// Any failure other than not-found makes the whole read `Failed`; otherwise
/// a single missing key makes it `Absent`.
pub(crate) async fn get_all(store: &dyn ObjectStore, keys: &[StorageKey]) -> Lookup<Vec<Bytes>> {
    let results = join_all(keys.iter().map(|key| store.get(key))).await;

    let mut bodies = Vec::with_capacity(results.len());
    let mut missing: Option<&StorageKey> = None;

    for (key, result) in keys.iter().zip(results) {
        match result {
            Ok(body) => bodies.push(body),
            Err(e) if e.is_not_found() => {
                missing.get_or_insert(key);
            }
            Err(e) => return Lookup::Failed(e.into()),
        }
    }

    if let Some(key) = missing {
        trace!(key = %key, total = keys.len(), "Object missing, treating lookup as absent");
        return Lookup::Absent;
    }

    Lookup::Found(bodies)
}
