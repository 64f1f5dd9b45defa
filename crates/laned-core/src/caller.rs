use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// The stable identity token used both by the thread-affinity strategy and
/// by the transaction pin table: the current platform thread's id, hashed to
/// a plain `u64`.
///
/// If the caller migrates across identities mid-transaction (a task hopping
/// executor threads), affinity breaks silently — documented as a limitation,
/// not a defect (§4.4). A richer mechanism (an explicit transaction handle
/// the caller carries across hops) is the correct fix in async models and is
/// out of scope here.
pub fn current_identity() -> u64 {
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_thread_same_identity() {
        assert_eq!(current_identity(), current_identity());
    }

    #[test]
    fn distinct_threads_usually_differ() {
        let here = current_identity();
        let there = std::thread::spawn(current_identity).join().unwrap();
        assert_ne!(here, there);
    }
}
