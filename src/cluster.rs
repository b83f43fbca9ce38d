//! Process group scaffolding for the distributed engine.

pub mod plan;
pub mod transport;

pub use plan::PartitionPlan;
pub use transport::{COORDINATOR, Collective, Endpoint, TransportError, process_group};

use std::thread;

/// Run `body` once per rank of a fresh `world_size` process group and
/// return the results in rank order.
///
/// The coordinator runs on the calling thread, every other rank on its own
/// thread. The call only returns once the whole group has finished; if any
/// rank panics, the panic resurfaces on the caller and no result exists.
pub fn run_group<T, F>(world_size: usize, body: F) -> Vec<T>
where
    T: Send,
    F: Fn(Endpoint) -> T + Sync,
{
    let mut endpoints = process_group(world_size);
    let coordinator = endpoints.remove(COORDINATOR);

    thread::scope(|scope| {
        let body = &body;
        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|endpoint| scope.spawn(move || body(endpoint)))
            .collect();

        let mut results = vec![body(coordinator)];
        for handle in handles {
            match handle.join() {
                Ok(result) => results.push(result),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }

        results
    })
}
