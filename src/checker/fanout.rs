use rayon::prelude::*;

/// Runs `work` for every item in parallel and returns the results in item
/// order.
///
/// Every slot is written by exactly one worker; `None` marks an item whose
/// work produced nothing (e.g. an unreadable file).
pub fn fan_out_indexed<T, R, F>(items: &[T], work: F) -> Vec<Option<R>>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> Option<R> + Sync,
{
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();
    slots
        .par_iter_mut()
        .zip(items.par_iter())
        .enumerate()
        .for_each(|(index, (slot, item))| *slot = work(index, item));
    slots
}
