//! 入力を連続したチャンクに分け、並列に写像してから元の順序で連結する。
use std::num::NonZeroUsize;

use anyhow::{Context, Result};
use rayon::prelude::*;

/// 長さ `len` を最大 `parts` 個の連続区間に分けたときのチャンク長（切り上げ）。
#[must_use]
pub fn chunk_len(len: usize, parts: NonZeroUsize) -> usize {
    len.div_ceil(parts.get()).max(1)
}

/// `items` を最大 `workers` 個の連続チャンクに分割し、各チャンクを専用プールで並列に処理する。
///
/// 結果は入力と同じ順序で連結される。どれか 1 つでも失敗すればバッチ全体が失敗する。
///
/// # Errors
/// スレッドプールを構築できない場合、または `map` がエラーを返した場合。
pub fn partitioned_map<T, U, F>(items: &[T], workers: NonZeroUsize, map: F) -> Result<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> Result<U> + Sync,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.get())
        .thread_name(|index| format!("partition-{index}"))
        .build()
        .context("failed to build partition worker pool")?;

    let chunks: Vec<Vec<U>> = pool.install(|| {
        items
            .par_chunks(chunk_len(items.len(), workers))
            .map(|chunk| chunk.iter().map(&map).collect::<Result<Vec<U>>>())
            .collect::<Result<Vec<_>>>()
    })?;

    Ok(chunks.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    #[rstest]
    #[case(10, 4, 3)]
    #[case(8, 4, 2)]
    #[case(3, 4, 1)]
    #[case(0, 4, 1)]
    fn chunks_round_up(#[case] len: usize, #[case] parts: usize, #[case] expected: usize) {
        assert_eq!(chunk_len(len, workers(parts)), expected);
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    #[case(16)]
    fn preserves_input_order(#[case] n: usize) {
        let items: Vec<usize> = (0..103).collect();
        let doubled = partitioned_map(&items, workers(n), |item| Ok(item * 2)).expect("map");
        let expected: Vec<usize> = items.iter().map(|item| item * 2).collect();
        assert_eq!(doubled, expected);
    }

    #[test]
    fn any_failure_fails_the_batch() {
        let items: Vec<usize> = (0..20).collect();
        let result = partitioned_map(&items, workers(4), |&item| {
            anyhow::ensure!(item != 13, "unlucky item");
            Ok(item)
        });
        assert!(result.is_err());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let items: Vec<String> = Vec::new();
        let mapped = partitioned_map(&items, workers(4), |item| Ok(item.len())).expect("map");
        assert!(mapped.is_empty());
    }
}
