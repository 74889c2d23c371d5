use super::*;
use crate::error::Error;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// How often a blocked receive checks whether the group was aborted.
const ABORT_POLL: Duration = Duration::from_millis(20);

struct Envelope {
    source: Rank,
    tag: Tag,
    payload: Vec<f64>,
}

/// Shared by every rank of one group.
#[derive(Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One rank of an in-process group.
/// Each rank has a single inbox; envelopes that do not match the
/// receive being waited on are parked until a matching receive comes.
/// Order is kept per `(source, tag)`.
pub struct ThreadComm {
    rank: Rank,
    outboxes: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    unmatched: RefCell<VecDeque<Envelope>>,
    abort_handle: AbortHandle,
}

impl ThreadComm {
    /// Build `size` connected ranks, index `r` is rank `r`.
    pub fn group(size: usize) -> Vec<ThreadComm> {
        let abort_handle = AbortHandle::default();
        let (outboxes, inboxes): (Vec<_>, Vec<_>) =
            (0..size).map(|_| mpsc::channel()).unzip();
        inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| ThreadComm {
                rank,
                outboxes: outboxes.clone(),
                inbox,
                unmatched: RefCell::new(VecDeque::new()),
                abort_handle: abort_handle.clone(),
            })
            .collect()
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort_handle.clone()
    }

    fn check_rank(&self, rank: Rank) -> Result<()> {
        if rank >= self.size() {
            return Err(Error::InvalidRank {
                rank,
                size: self.size(),
            });
        }
        Ok(())
    }

    fn post(&self, dest: Rank, tag: Tag, payload: Vec<f64>) -> Result<()> {
        self.check_rank(dest)?;
        if self.abort_handle.is_aborted() {
            return Err(Error::Aborted);
        }
        let envelope = Envelope {
            source: self.rank,
            tag,
            payload,
        };
        self.outboxes[dest]
            .send(envelope)
            .map_err(|_| Error::Disconnected { peer: dest })
    }

    fn receive(&self, source: Rank, tag: Tag) -> Result<Vec<f64>> {
        let matches = |e: &Envelope| e.source == source && e.tag == tag;
        {
            let mut unmatched = self.unmatched.borrow_mut();
            if let Some(i) = unmatched.iter().position(matches) {
                if let Some(envelope) = unmatched.remove(i) {
                    return Ok(envelope.payload);
                }
            }
        }
        loop {
            match self.inbox.recv_timeout(ABORT_POLL) {
                Ok(envelope) if matches(&envelope) => {
                    return Ok(envelope.payload)
                }
                Ok(envelope) => self.unmatched.borrow_mut().push_back(envelope),
                Err(RecvTimeoutError::Timeout) => {
                    if self.abort_handle.is_aborted() {
                        return Err(Error::Aborted);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::Disconnected { peer: source })
                }
            }
        }
    }

    fn receive_scalar(&self, source: Rank, tag: Tag) -> Result<f64> {
        let payload = self.receive(source, tag)?;
        match payload[..] {
            [value] => Ok(value),
            _ => Err(Error::MessageSize {
                expected: 1,
                actual: payload.len(),
            }),
        }
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.outboxes.len()
    }

    /// The send is eager, its payload is copied out before `work`
    /// starts, so only the receive is waited on.
    fn exchange<R>(
        &self,
        exchange: Exchange<'_>,
        work: impl FnOnce() -> R,
    ) -> Result<R> {
        let Exchange {
            peer,
            send,
            send_tag,
            recv,
            recv_tag,
        } = exchange;
        self.post(peer, send_tag, send.to_vec())?;
        let result = work();

        profiling::scope!("comm::wait_recv");
        let payload = self.receive(peer, recv_tag)?;
        if payload.len() != recv.len() {
            return Err(Error::MessageSize {
                expected: recv.len(),
                actual: payload.len(),
            });
        }
        recv.copy_from_slice(&payload);
        Ok(result)
    }

    fn all_reduce_max(&self, value: f64) -> Result<f64> {
        profiling::scope!("comm::all_reduce_max");
        if self.rank == ROOT {
            let mut result = value;
            for source in (0..self.size()).filter(|r| *r != ROOT) {
                result = result.max(self.receive_scalar(source, Tag::Reduce)?);
            }
            for dest in (0..self.size()).filter(|r| *r != ROOT) {
                self.post(dest, Tag::Broadcast, vec![result])?;
            }
            Ok(result)
        } else {
            self.post(ROOT, Tag::Reduce, vec![value])?;
            self.receive_scalar(ROOT, Tag::Broadcast)
        }
    }

    fn gather(&self, buffer: &[f64], root: Rank) -> Result<Option<Vec<f64>>> {
        profiling::scope!("comm::gather");
        self.check_rank(root)?;
        if self.rank != root {
            self.post(root, Tag::Gather, buffer.to_vec())?;
            return Ok(None);
        }

        let values = buffer.len() * self.size();
        let mut result = Vec::new();
        result
            .try_reserve_exact(values)
            .map_err(|_| Error::Allocation { values })?;
        for source in 0..self.size() {
            if source == root {
                result.extend_from_slice(buffer);
                continue;
            }
            let payload = self.receive(source, Tag::Gather)?;
            if payload.len() != buffer.len() {
                return Err(Error::MessageSize {
                    expected: buffer.len(),
                    actual: payload.len(),
                });
            }
            result.extend_from_slice(&payload);
        }
        Ok(Some(result))
    }

    fn abort(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.abort_handle.abort();
        }
    }
}

/// Run `f` once per rank on its own scoped thread and collect the
/// results in rank order.
/// A rank that fails or panics aborts the group so the others stop
/// instead of blocking forever; the first root cause error is returned.
pub fn run_group<T, F>(size: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(ThreadComm) -> Result<T> + Sync,
{
    let comms = ThreadComm::group(size);
    let Some(abort_handle) = comms.first().map(|c| c.abort_handle()) else {
        return Ok(Vec::new());
    };

    std::thread::scope(|s| {
        let mut handles = Vec::with_capacity(size);
        let mut spawn_error = None;
        for comm in comms {
            let rank = comm.rank();
            let f = &f;
            let spawned = std::thread::Builder::new()
                .name(format!("rank_{}", rank))
                .spawn_scoped(s, move || {
                    let abort_handle = comm.abort_handle();
                    let result = f(comm);
                    if result.is_err() {
                        abort_handle.abort();
                    }
                    result
                });
            match spawned {
                Ok(handle) => handles.push((rank, handle)),
                Err(e) => {
                    abort_handle.abort();
                    spawn_error = Some(Error::Spawn(e));
                    break;
                }
            }
        }

        let mut results = Vec::with_capacity(size);
        let mut first_error = spawn_error;
        let mut aborted = false;
        for (rank, handle) in handles {
            match handle.join() {
                Ok(Ok(value)) => results.push(value),
                Ok(Err(Error::Aborted)) => aborted = true,
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(_) => {
                    first_error.get_or_insert(Error::WorkerPanicked { rank });
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None if aborted => Err(Error::Aborted),
            None => Ok(results),
        }
    })
}
