#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
const PARALLEL_THRESHOLD: usize = 1024;

/// Per-element map over a slice; parallel for large slices on native targets.
///
/// Only for independent post-processing. Grid accumulation stays on the
/// calling thread.
pub fn for_each_indexed_mut<T, F>(slice: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if slice.len() >= PARALLEL_THRESHOLD {
            slice
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, value)| f(idx, value));
            return;
        }
    }

    for (idx, value) in slice.iter_mut().enumerate() {
        f(idx, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_every_index_once() {
        for len in [3usize, 5000] {
            let mut values = vec![0usize; len];
            for_each_indexed_mut(&mut values, |idx, slot| *slot += idx + 1);
            assert!(values.iter().enumerate().all(|(idx, v)| *v == idx + 1));
        }
    }
}
