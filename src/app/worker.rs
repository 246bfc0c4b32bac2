use std::sync::mpsc;
use std::time::Duration;

pub const ACTION_RESULT_POLL_INTERVAL: Duration = Duration::from_millis(24);

#[derive(Debug, PartialEq, Eq)]
pub enum WorkerPoll<T> {
    Pending,
    Ready(T),
    /// The worker thread ended without sending a result.
    Lost,
}

/// Receiving end of a background action started by [`spawn_worker_action`].
///
/// Dropping it discards the result once the worker finishes.
#[derive(Debug)]
pub struct PendingAction<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> PendingAction<T> {
    pub fn poll(&self) -> WorkerPoll<T> {
        match self.rx.try_recv() {
            Ok(result) => WorkerPoll::Ready(result),
            Err(mpsc::TryRecvError::Empty) => WorkerPoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => WorkerPoll::Lost,
        }
    }

    /// Blocks the caller, polling at the action interval, until the worker
    /// resolves.
    pub fn wait(&self) -> Option<T> {
        loop {
            match self.poll() {
                WorkerPoll::Ready(result) => return Some(result),
                WorkerPoll::Lost => return None,
                WorkerPoll::Pending => std::thread::sleep(ACTION_RESULT_POLL_INTERVAL),
            }
        }
    }
}

pub fn spawn_worker_action<T, W>(work: W) -> PendingAction<T>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();
    std::thread::spawn(move || {
        let result = work();
        let _ = tx.send(result);
    });
    PendingAction { rx }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_result_is_delivered_once() {
        let pending = spawn_worker_action(|| 7_u32);
        assert_eq!(pending.wait(), Some(7));
        assert!(matches!(pending.poll(), WorkerPoll::Lost));
    }

    #[test]
    fn panicking_worker_reports_lost() {
        let pending = spawn_worker_action(|| -> u32 { panic!("worker failure") });
        assert_eq!(pending.wait(), None);
    }

    #[test]
    fn slow_worker_is_pending_until_released() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let pending = spawn_worker_action(move || {
            let _ = gate_rx.recv();
            "done"
        });
        assert!(matches!(pending.poll(), WorkerPoll::Pending));
        gate_tx.send(()).expect("gate");
        assert_eq!(pending.wait(), Some("done"));
    }
}
