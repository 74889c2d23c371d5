use rayon::prelude::*;

/// Copy `src` into `dst`.
/// `chunk_size` is break the work into tasks for multi-threading.
pub fn copy<T: Copy + Send + Sync>(
    src: &[T],
    dst: &mut [T],
    chunk_size: usize,
) {
    debug_assert_eq!(src.len(), dst.len());
    dst.par_chunks_mut(chunk_size)
        .zip(src.par_chunks(chunk_size))
        .for_each(|(d_chunk, s_chunk)| {
            d_chunk.copy_from_slice(s_chunk);
        });
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn copy_test() {
        {
            let a = vec![0, 1, 2, 3, 4, 5];
            let mut b = vec![7; 6];
            copy(&a, &mut b, 4);
            assert_eq!(a, b);
        }

        {
            let n = 1000;
            let a: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let mut b = vec![0.0; n];
            copy(&a, &mut b, 10);
            assert_eq!(a, b);
        }
    }
}
