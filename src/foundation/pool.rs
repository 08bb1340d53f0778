use crate::foundation::error::{DeckError, DeckResult};

/// Dedicated rayon pool for per-file and per-page work.
pub(crate) fn build_thread_pool(threads: Option<usize>) -> DeckResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(DeckError::validation(
            "engine 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| DeckError::planning(format!("failed to build rayon thread pool: {e}")))
}
