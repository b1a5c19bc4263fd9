//! Deterministic sharding of a list across parallel jobs.

use tracing::debug;

/// Returns the contiguous shard of `items` assigned to job `job` of `count`.
///
/// The first `items.len() % count` jobs receive one extra item, so shard
/// sizes differ by at most one and the shards of jobs `0..count`, taken in
/// order, reproduce `items` exactly. A zero `count` or a `job` outside
/// `0..count` yields an empty shard.
///
/// ```
/// use tbk_workdir::partition;
///
/// let items = ["a", "b", "c", "d", "e"];
/// assert_eq!(partition(&items, 0, 2), ["a", "b", "c"]);
/// assert_eq!(partition(&items, 1, 2), ["d", "e"]);
/// assert!(partition(&items, 2, 2).is_empty());
/// ```
#[must_use]
pub fn partition<T>(items: &[T], job: usize, count: usize) -> &[T] {
    let len = items.len();
    let (Some(base), Some(extra)) = (len.checked_div(count), len.checked_rem(count)) else {
        debug!(target: "tbk_workdir::partition", job, count, "zero job count, empty shard");
        return &[];
    };
    if job >= count {
        debug!(target: "tbk_workdir::partition", job, count, "job index out of range, empty shard");
        return &[];
    }

    let (start, size) = if job < extra {
        (job * (base + 1), base + 1)
    } else {
        (extra * (base + 1) + (job - extra) * base, base)
    };
    debug!(
        target: "tbk_workdir::partition",
        job,
        count,
        start,
        size,
        total = len,
        "computed shard"
    );
    items.get(start..start + size).unwrap_or(&[])
}
