//! Message passing between the ranks of a process group.
//!
//! Ranks share no memory: each one exclusively owns an [`Endpoint`] and all
//! data moves through the two collectives of the [`Collective`] trait. The
//! in-process realization here runs every rank on its own thread and backs
//! the exchanges with unbounded channels.

use std::sync::mpsc::{self, Receiver, Sender};

use thiserror::Error;

use crate::cluster::plan::PartitionPlan;

/// The coordinating rank. It supplies the input to the distribute step,
/// collects every sorted shard and produces the final sequence.
pub const COORDINATOR: usize = 0;

/// The failures the exchange steps can surface. Every one of them is fatal
/// to the whole computation: no partial result exists anywhere afterwards.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// A rank went away before the exchange completed.
    #[error("rank {rank} disconnected before the exchange completed")]
    Disconnected { rank: usize },
    /// A gathered shard does not have the size the plan assigns its rank.
    #[error("rank {rank} sent {actual} elements where the plan assigns {expected}")]
    ShardSizeMismatch {
        rank: usize,
        expected: usize,
        actual: usize,
    },
    /// The scattered input does not have the length the plan covers.
    #[error("the input holds {actual} elements, the plan covers {expected}")]
    InputSizeMismatch { expected: usize, actual: usize },
}

/// The collective exchange operations of a process group.
///
/// Both operations are group-wide: every rank has to enter them, and they
/// preserve rank order, so shard boundaries in the reassembled sequence
/// line up with [`PartitionPlan::range`].
pub trait Collective {
    /// This endpoint's rank within the group.
    fn rank(&self) -> usize;

    /// The number of ranks in the group.
    fn world_size(&self) -> usize;

    /// Distribute the coordinator's `input` and return the calling rank's
    /// shard.
    ///
    /// `input` must be `Some` exactly on the coordinator, with its length
    /// matching the plan. The input is consumed: after the call every rank,
    /// the coordinator included, owns nothing but its own shard.
    fn scatter(
        &self,
        input: Option<Vec<i32>>,
        plan: &PartitionPlan,
    ) -> Result<Vec<i32>, TransportError>;

    /// Collect one shard per rank at the coordinator.
    ///
    /// Shards land at their plan offsets regardless of arrival order. The
    /// coordinator gets back `Some` of the reassembled sequence, every
    /// other rank `None`.
    fn gather(
        &self,
        shard: Vec<i32>,
        plan: &PartitionPlan,
    ) -> Result<Option<Vec<i32>>, TransportError>;
}

/// What distinguishes the coordinator's channel ends from a worker's.
enum Role {
    Coordinator {
        /// One sender per rank for the distribute step, in rank order.
        scatter_txs: Vec<Sender<Vec<i32>>>,
        /// The inbox shards return through. The coordinator deliberately
        /// holds no sender for it, so the channel closes as soon as any
        /// worker drops out and the collect step can fail instead of hang.
        gather_rx: Receiver<(usize, Vec<i32>)>,
    },
    Worker {
        /// The route back to the coordinator for the collect step.
        gather_tx: Sender<(usize, Vec<i32>)>,
    },
}

/// One rank's private end of the group's channels.
pub struct Endpoint {
    rank: usize,
    world_size: usize,
    /// Where this rank's shard arrives during the distribute step.
    shard_rx: Receiver<Vec<i32>>,
    role: Role,
}

/// Wire up the endpoints of a `world_size` rank group, in rank order.
///
/// # Panics
///
/// Panics when `world_size` is zero.
pub fn process_group(world_size: usize) -> Vec<Endpoint> {
    assert!(world_size > 0, "A process group needs at least one rank");

    let (gather_tx, gather_rx) = mpsc::channel();
    let (scatter_txs, mut shard_rxs): (Vec<_>, Vec<_>) =
        (0..world_size).map(|_| mpsc::channel()).unzip();

    let mut endpoints = vec![Endpoint {
        rank: COORDINATOR,
        world_size,
        shard_rx: shard_rxs.remove(0),
        role: Role::Coordinator {
            scatter_txs,
            gather_rx,
        },
    }];
    endpoints.extend(
        shard_rxs
            .into_iter()
            .zip(1..)
            .map(|(shard_rx, rank)| Endpoint {
                rank,
                world_size,
                shard_rx,
                role: Role::Worker {
                    gather_tx: gather_tx.clone(),
                },
            }),
    );

    endpoints
}

impl Collective for Endpoint {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn scatter(
        &self,
        input: Option<Vec<i32>>,
        plan: &PartitionPlan,
    ) -> Result<Vec<i32>, TransportError> {
        assert_eq!(
            plan.worker_count(),
            self.world_size,
            "Plan and process group disagree on the worker count"
        );

        match &self.role {
            Role::Coordinator { scatter_txs, .. } => {
                let Some(input) = input else {
                    panic!("The coordinator supplies the input to scatter");
                };
                if input.len() != plan.total_len() {
                    return Err(TransportError::InputSizeMismatch {
                        expected: plan.total_len(),
                        actual: input.len(),
                    });
                }

                for (rank, sender) in scatter_txs.iter().enumerate() {
                    let shard = input[plan.range(rank)].to_vec();
                    sender
                        .send(shard)
                        .map_err(|_| TransportError::Disconnected { rank })?;
                }
            }
            Role::Worker { .. } => {
                assert!(input.is_none(), "Only the coordinator supplies input");
            }
        }

        self.shard_rx
            .recv()
            .map_err(|_| TransportError::Disconnected { rank: COORDINATOR })
    }

    fn gather(
        &self,
        shard: Vec<i32>,
        plan: &PartitionPlan,
    ) -> Result<Option<Vec<i32>>, TransportError> {
        assert_eq!(
            plan.worker_count(),
            self.world_size,
            "Plan and process group disagree on the worker count"
        );

        match &self.role {
            Role::Worker { gather_tx } => {
                gather_tx
                    .send((self.rank, shard))
                    .map_err(|_| TransportError::Disconnected { rank: COORDINATOR })?;
                Ok(None)
            }
            Role::Coordinator { gather_rx, .. } => {
                let mut output = vec![0; plan.total_len()];
                let mut received = vec![false; self.world_size];

                place_shard(&mut output, &mut received, self.rank, shard, plan)?;
                while let Some(missing) = received.iter().position(|&done| !done) {
                    let (rank, shard) = gather_rx
                        .recv()
                        .map_err(|_| TransportError::Disconnected { rank: missing })?;
                    place_shard(&mut output, &mut received, rank, shard, plan)?;
                }

                Ok(Some(output))
            }
        }
    }
}

/// Copy one gathered shard to its plan offset, rejecting sizes the plan
/// does not assign.
fn place_shard(
    output: &mut [i32],
    received: &mut [bool],
    rank: usize,
    shard: Vec<i32>,
    plan: &PartitionPlan,
) -> Result<(), TransportError> {
    if shard.len() != plan.count(rank) {
        return Err(TransportError::ShardSizeMismatch {
            rank,
            expected: plan.count(rank),
            actual: shard.len(),
        });
    }

    output[plan.range(rank)].copy_from_slice(&shard);
    received[rank] = true;
    Ok(())
}
