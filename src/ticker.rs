//! Background countdown driver.
//!
//! The ticker thread only receives start/stop commands and sends tick
//! notifications; the timer engine stays on the UI thread.

use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, warn};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Stop,
    Shutdown,
}

pub struct Ticker {
    commands: Sender<Command>,
    ticks: Receiver<()>,
    handle: Option<JoinHandle<()>>,
    running: bool,
}

impl Ticker {
    pub fn spawn() -> Self {
        Self::with_interval(TICK_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (tick_tx, tick_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("ticker".into())
            .spawn(move || run(interval, cmd_rx, tick_tx))
            .map_err(|e| warn!(error = %e, "failed to spawn ticker thread"))
            .ok();

        Self {
            commands: cmd_tx,
            ticks: tick_rx,
            handle,
            running: false,
        }
    }

    pub fn start(&mut self) {
        if self.commands.send(Command::Start).is_ok() {
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        let _ = self.commands.send(Command::Stop);
        self.running = false;
        // Ticks already queued belong to the interval that was just stopped.
        while self.ticks.try_recv().is_ok() {}
    }

    /// Start or stop so the ticker matches `running`.
    pub fn sync(&mut self, running: bool) {
        match (self.running, running) {
            (false, true) => self.start(),
            (true, false) => self.stop(),
            _ => {}
        }
    }

    /// Number of ticks received since the last call.
    pub fn drain(&self) -> u32 {
        let mut count = 0;
        loop {
            match self.ticks.try_recv() {
                Ok(()) => count += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        count
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(interval: Duration, commands: Receiver<Command>, ticks: Sender<()>) {
    let mut next_tick: Option<Instant> = None;

    loop {
        let received = match next_tick {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                commands.recv_timeout(wait)
            }
            None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Command::Start) => {
                debug!("ticker started");
                next_tick = Some(Instant::now() + interval);
            }
            Ok(Command::Stop) => {
                debug!("ticker stopped");
                next_tick = None;
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if ticks.send(()).is_err() {
                    break;
                }
                // Schedule from the previous deadline so delays do not accumulate.
                next_tick = next_tick.map(|deadline| deadline + interval);
            }
        }
    }
}
