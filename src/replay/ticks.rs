use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Source of replay ticks. `wait_tick` blocks until the next tick is due and
/// returns `false` once the source is exhausted.
pub trait TickSource {
    fn wait_tick(&mut self) -> bool;
}

/// Fixed-cadence ticks produced by a timer thread over a channel.
#[derive(Debug)]
pub struct IntervalTicks {
    receiver: mpsc::Receiver<Instant>,
    stop: Arc<AtomicBool>,
    timer: Option<JoinHandle<()>>,
}

impl IntervalTicks {
    pub fn spawn(interval: Duration) -> Self {
        let (sender, receiver) = mpsc::channel::<Instant>();
        let stop = Arc::new(AtomicBool::new(false));
        let timer_stop = Arc::clone(&stop);
        let timer = std::thread::spawn(move || {
            while !timer_stop.load(Ordering::Relaxed) {
                std::thread::sleep(interval);
                if sender.send(Instant::now()).is_err() {
                    break;
                }
            }
        });
        Self {
            receiver,
            stop,
            timer: Some(timer),
        }
    }
}

impl TickSource for IntervalTicks {
    fn wait_tick(&mut self) -> bool {
        self.receiver.recv().is_ok()
    }
}

impl Drop for IntervalTicks {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(timer) = self.timer.take() {
            let _ = timer.join();
        }
    }
}

/// Immediate ticks, at most `remaining` of them. Used for headless rendering
/// and for stepping a replay a known number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountedTicks {
    remaining: usize,
}

impl CountedTicks {
    pub const fn new(count: usize) -> Self {
        Self { remaining: count }
    }

    pub const fn unbounded() -> Self {
        Self::new(usize::MAX)
    }
}

impl TickSource for CountedTicks {
    fn wait_tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
