//! The partitioned merge sort engine.
//!
//! Every rank of a process group runs [`sort`] over its own endpoint: the
//! coordinator scatters balanced shards, each rank sorts its shard with a
//! local engine, the sorted shards are gathered back in plan order and the
//! coordinator folds them into a single run.

use crate::cluster::{Collective, PartitionPlan, TransportError};
use crate::engines::merging;

/// Sort the coordinator's `input` across the process group behind
/// `endpoint`.
///
/// `input` must be `Some` exactly on the coordinator and match
/// `plan.total_len()`. `local_sort` sorts one shard in place; handing in
/// the task parallel engine here gives a hybrid run. The coordinator gets
/// back `Some` of the sorted sequence, every other rank `None`.
///
/// A transport failure on any rank aborts the whole computation. There is
/// no partial result mode and no dynamic rebalancing: the plan fixed at
/// group creation is the plan that runs.
pub fn sort<C, F>(
    endpoint: &C,
    plan: &PartitionPlan,
    input: Option<Vec<i32>>,
    local_sort: F,
) -> Result<Option<Vec<i32>>, TransportError>
where
    C: Collective,
    F: Fn(&mut [i32]),
{
    let mut shard = endpoint.scatter(input, plan)?;
    local_sort(&mut shard);

    let Some(mut output) = endpoint.gather(shard, plan)? else {
        return Ok(None);
    };

    fold_merge(&mut output, plan);
    Ok(Some(output))
}

/// Left-fold the gathered shards into one sorted run: merge shard 1 into
/// the sorted prefix, then shard 2, and so on, `worker_count - 1` merges in
/// total. The fold keeps the recombination deterministic; a k-way merge
/// would touch each element once instead but needs a heap to do it.
fn fold_merge(output: &mut [i32], plan: &PartitionPlan) {
    let mut scratch = vec![0; output.len()];

    for rank in 1..plan.worker_count() {
        let merged = plan.offset(rank) + plan.count(rank);
        merging::merge_adjacent(&mut output[..merged], plan.offset(rank), &mut scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use crate::cluster::{self, COORDINATOR};
    use crate::engines::{parallel, sequential};

    const RUNS: usize = 10;
    const TEST_SIZE: usize = 5000;

    /// Run the engine over an in-process group and return the
    /// coordinator's output.
    fn distributed_sort(values: Vec<i32>, workers: usize) -> Vec<i32> {
        let plan = PartitionPlan::balanced(values.len(), workers);
        let input = Mutex::new(Some(values));

        let mut results = cluster::run_group(workers, |endpoint| {
            let input = (endpoint.rank() == COORDINATOR)
                .then(|| input.lock().unwrap().take())
                .flatten();
            sort(&endpoint, &plan, input, sequential::sort)
        });

        results.swap_remove(COORDINATOR).unwrap().unwrap()
    }

    #[test]
    fn six_elements_over_two_workers() {
        assert_eq!(
            distributed_sort(vec![5, 3, 8, 1, 9, 2], 2),
            vec![1, 2, 3, 5, 8, 9]
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(distributed_sort(vec![], 3), vec![]);
    }

    #[test]
    fn single_element() {
        assert_eq!(distributed_sort(vec![42], 2), vec![42]);
    }

    #[test]
    fn more_workers_than_elements() {
        assert_eq!(distributed_sort(vec![3, 1, 2], 5), vec![1, 2, 3]);
    }

    #[test]
    fn already_sorted_is_untouched() {
        let values: Vec<i32> = (0..100).collect();
        assert_eq!(distributed_sort(values.clone(), 4), values);
    }

    #[test]
    fn random() {
        let mut rng = crate::test::test_rng();

        for _ in 0..RUNS {
            let values = crate::test::random_values(TEST_SIZE, &mut rng);
            let original = values.clone();

            let sorted = distributed_sort(values, 4);

            crate::test::assert_sorted_permutation(&original, &sorted);
        }
    }

    #[test]
    fn worker_count_does_not_change_output() {
        let mut rng = crate::test::test_rng();
        let values = crate::test::random_values(TEST_SIZE, &mut rng);

        let mut expected = values.clone();
        sequential::sort(&mut expected);

        for workers in [1, 2, 3, 4, 8] {
            let sorted = distributed_sort(values.clone(), workers);
            assert_eq!(sorted, expected, "{workers} workers changed the output");
        }
    }

    #[test]
    fn duplicate_heavy() {
        let mut rng = crate::test::test_rng();

        for _ in 0..RUNS {
            let values = crate::test::duplicate_heavy_values(TEST_SIZE, &mut rng);
            let original = values.clone();

            let sorted = distributed_sort(values, 3);

            crate::test::assert_sorted_permutation(&original, &sorted);
        }
    }

    #[test]
    fn only_the_coordinator_receives_output() {
        let plan = PartitionPlan::balanced(12, 3);
        let input = Mutex::new(Some((0..12).rev().collect::<Vec<i32>>()));

        let results = cluster::run_group(3, |endpoint| {
            let input = (endpoint.rank() == COORDINATOR)
                .then(|| input.lock().unwrap().take())
                .flatten();
            sort(&endpoint, &plan, input, sequential::sort)
        });

        let outputs: Vec<_> = results.into_iter().map(|result| result.unwrap()).collect();
        assert_eq!(outputs[COORDINATOR], Some((0..12).collect::<Vec<i32>>()));
        assert_eq!(outputs[1], None);
        assert_eq!(outputs[2], None);
    }

    #[test]
    fn task_parallel_local_sort_matches() {
        let mut rng = crate::test::test_rng();
        // Large enough that each shard forks at least once
        let values = crate::test::random_values(4 * parallel::SEQUENTIAL_THRESHOLD, &mut rng);

        let mut expected = values.clone();
        sequential::sort(&mut expected);

        let plan = PartitionPlan::balanced(values.len(), 2);
        let input = Mutex::new(Some(values));

        let mut results = cluster::run_group(2, |endpoint| {
            let input = (endpoint.rank() == COORDINATOR)
                .then(|| input.lock().unwrap().take())
                .flatten();
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(2)
                .build()
                .unwrap();
            sort(&endpoint, &plan, input, |shard| parallel::sort(&pool, shard))
        });

        assert_eq!(
            results.swap_remove(COORDINATOR).unwrap(),
            Some(expected)
        );
    }
}
