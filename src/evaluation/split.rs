//! シード固定の層化ホールドアウト分割。
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::classification::Label;
use crate::error::DataError;

/// 学習用・評価用の行番号（いずれも昇順）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratifiedSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// ラベルの比率を保ったまま `test_ratio` の割合を評価用に取り分ける。
///
/// 評価用の件数は `ceil(test_ratio * n)` をクラス比で按分（最大剰余法）し、
/// 各クラスが両側に最低 1 件残るよう `[1, n_c - 1]` に丸める。丸めで生じた過不足は
/// 他のクラスで調整するので、評価用の総数は `ceil(test_ratio * n)` のまま保たれる。
/// ただし 2 クラスとも 1 件ずつ必要なため、総数が 1 のときだけ 2 件になる。
///
/// # Errors
/// いずれかのクラスが 2 件未満の場合は [`DataError::StratificationInfeasible`]。
pub fn stratified_split(
    labels: &[Label],
    test_ratio: f64,
    seed: u64,
) -> Result<StratifiedSplit, DataError> {
    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (index, label) in labels.iter().enumerate() {
        by_class[label.index()].push(index);
    }
    for label in Label::ALL {
        let count = by_class[label.index()].len();
        if count < 2 {
            return Err(DataError::StratificationInfeasible { label, count });
        }
    }

    let n = labels.len();
    let n_test = ((test_ratio.clamp(0.0, 1.0) * n as f64).ceil() as usize).clamp(1, n - 1);
    let allocation = allocate(&by_class.each_ref().map(Vec::len), n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (indices, take) in by_class.iter_mut().zip(allocation) {
        indices.shuffle(&mut rng);
        test.extend_from_slice(&indices[..take]);
        train.extend_from_slice(&indices[take..]);
    }
    train.sort_unstable();
    test.sort_unstable();

    Ok(StratifiedSplit { train, test })
}

fn allocate(class_sizes: &[usize; 2], n_test: usize) -> [usize; 2] {
    let n: usize = class_sizes.iter().sum();
    let quotas = class_sizes.map(|size| size as f64 * n_test as f64 / n as f64);
    let mut allocation = quotas.map(|quota| quota.floor() as usize);

    let mut remainder = n_test.saturating_sub(allocation.iter().sum());
    let mut order = [0, 1];
    order.sort_by(|&a, &b| {
        let fraction = |class: usize| quotas[class] - quotas[class].floor();
        fraction(b).total_cmp(&fraction(a)).then(a.cmp(&b))
    });
    for class in order.into_iter().cycle() {
        if remainder == 0 {
            break;
        }
        allocation[class] += 1;
        remainder -= 1;
    }

    for (take, &size) in allocation.iter_mut().zip(class_sizes) {
        *take = (*take).clamp(1, size - 1);
    }

    // 丸めで総数がずれた分を、余裕のあるクラスで吸収する
    let mut total: usize = allocation.iter().sum();
    while total > n_test {
        let Some(class) = (0..2)
            .filter(|&class| allocation[class] > 1)
            .max_by_key(|&class| allocation[class])
        else {
            break;
        };
        allocation[class] -= 1;
        total -= 1;
    }
    while total < n_test {
        let Some(class) = (0..2)
            .filter(|&class| allocation[class] + 1 < class_sizes[class])
            .max_by_key(|&class| class_sizes[class] - 1 - allocation[class])
        else {
            break;
        };
        allocation[class] += 1;
        total += 1;
    }
    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn labels(hoax: usize, valid: usize) -> Vec<Label> {
        let mut labels = vec![Label::Hoax; hoax];
        labels.extend(vec![Label::Valid; valid]);
        labels
    }

    #[rstest]
    #[case(10, 10, 2, 2)]
    #[case(80, 20, 16, 4)]
    #[case(3, 3, 1, 1)]
    #[case(2, 50, 1, 10)]
    #[case(50, 2, 10, 1)]
    #[case(2, 2, 1, 1)]
    fn allocates_test_rows_per_class(
        #[case] hoax: usize,
        #[case] valid: usize,
        #[case] hoax_test: usize,
        #[case] valid_test: usize,
    ) {
        let labels = labels(hoax, valid);
        let split = stratified_split(&labels, 0.2, 42).expect("split");
        let count = |rows: &[usize], label: Label| rows.iter().filter(|&&i| labels[i] == label).count();

        assert_eq!(count(&split.test, Label::Hoax), hoax_test);
        assert_eq!(count(&split.test, Label::Valid), valid_test);
        assert_eq!(split.train.len() + split.test.len(), labels.len());
        let expected_test = ((0.2 * labels.len() as f64).ceil() as usize).max(2);
        assert_eq!(split.test.len(), expected_test);
    }

    #[test]
    fn partitions_are_disjoint_and_deterministic() {
        let labels = labels(12, 9);
        let first = stratified_split(&labels, 0.2, 42).expect("split");
        let second = stratified_split(&labels, 0.2, 42).expect("split");
        assert_eq!(first, second);
        assert!(first.test.iter().all(|index| !first.train.contains(index)));
    }

    #[test]
    fn class_with_one_example_is_infeasible() {
        match stratified_split(&labels(1, 10), 0.2, 42) {
            Err(DataError::StratificationInfeasible { label, count }) => {
                assert_eq!(label, Label::Hoax);
                assert_eq!(count, 1);
            }
            other => panic!("expected infeasible split, got {other:?}"),
        }
    }
}
