use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{ReplayState, TickSource};
use crate::session::{Session, SessionResult};
use crate::surface::RasterSurface;

/// Shared flag that requests cancellation at the next tick boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// What the event loop sees after each tick.
#[derive(Debug, Clone, Copy)]
pub struct ReplayFrame<'a> {
    pub applied: usize,
    pub total: usize,
    pub state: ReplayState,
    pub surface: &'a RasterSurface,
}

/// Starts a replay on `session` and ticks it once per tick from `ticks`.
///
/// The replay ends `Finished` after the last action, or `Cancelled` when
/// `cancel` fires or the tick source runs dry first.
pub fn drive_replay<T, F>(
    session: &mut Session,
    ticks: &mut T,
    cancel: &CancelToken,
    mut on_frame: F,
) -> SessionResult<ReplayState>
where
    T: TickSource,
    F: FnMut(ReplayFrame<'_>),
{
    session.start_replay()?;
    loop {
        if cancel.is_cancelled() || !ticks.wait_tick() || cancel.is_cancelled() {
            let state = session.cancel_replay()?;
            let (applied, total) = session.replay_progress();
            tracing::info!(applied, total, "replay cancelled");
            return Ok(state);
        }

        let state = session.tick_replay();
        let (applied, total) = session.replay_progress();
        on_frame(ReplayFrame {
            applied,
            total,
            state,
            surface: session.surface(),
        });
        if state.is_terminal() {
            tracing::info!(applied, total, state = ?state, "replay ended");
            return Ok(state);
        }
    }
}

/// Like [`drive_replay`], but cancels once `stop_after` actions are applied.
/// A limit of zero cancels before the first tick.
pub fn drive_replay_until<T: TickSource>(
    session: &mut Session,
    ticks: &mut T,
    stop_after: Option<usize>,
) -> SessionResult<ReplayState> {
    let cancel = CancelToken::new();
    if stop_after == Some(0) {
        cancel.cancel();
    }
    drive_replay(session, ticks, &cancel, |frame| {
        tracing::debug!(applied = frame.applied, total = frame.total, "replay tick");
        if stop_after.is_some_and(|limit| frame.applied >= limit) {
            cancel.cancel();
        }
    })
}
