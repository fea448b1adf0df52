use std::io::{BufRead, BufReader, Read};
use std::process::{Child, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::warn;

use crate::workflow::PreparedRun;

/// Emitted after the last command of an uninterrupted run.
pub const FINISHED_SENTINEL: &str = "============Process finished============";

/// Emitted in place of the sentinel when a run is cancelled.
pub const INTERRUPTED_LINE: &str = "Process has been interrupted.";

const EVENT_BUFFER: usize = 1024;

/// What the consuming side sees while a run executes. Events arrive in
/// log order: a command's output is complete before the next command
/// starts.
#[derive(Debug)]
pub enum RunEvent {
    /// The `command: ...` echo emitted before a command spawns.
    CommandStarted(String),
    /// A command could not be built; the message explains why.
    CommandSkipped(String),
    /// One output line that survived throttling.
    Line(String),
    /// A command's process exited.
    CommandExited(ExitStatus),
    /// The run was cancelled before completing.
    Interrupted,
    /// Every command ran; the sentinel should be logged.
    Finished,
}

#[derive(Debug, Default, Clone)]
struct ChildSlot {
    inner: Arc<Mutex<Option<Child>>>,
}

impl ChildSlot {
    fn put(&self, child: Child) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(child);
        }
    }

    fn take(&self) -> Option<Child> {
        self.inner.lock().ok().and_then(|mut guard| guard.take())
    }

    fn kill_current(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            if let Some(child) = guard.as_mut() {
                if let Err(e) = child.kill() {
                    warn!("Failed to kill running process: {e}");
                }
            }
        }
    }
}

/// Reaps whatever child is still in the slot when the worker unwinds,
/// so no exit path leaks a process.
struct SlotReaper(ChildSlot);

impl Drop for SlotReaper {
    fn drop(&mut self) {
        if let Some(mut child) = self.0.take() {
            if let Err(e) = child.kill() {
                warn!("Failed to kill leftover process: {e}");
            }
            if let Err(e) = child.wait() {
                warn!("Failed to reap leftover process: {e}");
            }
        }
    }
}

/// Shared cancellation control for a run in flight. Cancelling skips
/// every pending command and kills the one currently running.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    slot: ChildSlot,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.slot.kill_current();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A run executing on a background worker thread.
pub struct RunnerHandle {
    events: Receiver<RunEvent>,
    cancel: CancelHandle,
    worker: JoinHandle<()>,
}

impl RunnerHandle {
    pub fn events(&self) -> Receiver<RunEvent> {
        self.events.clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Wait for the worker thread to finish.
    pub fn join(self) {
        match self.worker.join() {
            Ok(()) => {}
            Err(e) => {
                warn!("Failed to join runner task: {e:?}");
            }
        }
    }
}

/// Start executing a prepared run. Commands run strictly in order on a
/// background thread; command i+1 never spawns before command i's exit
/// status was observed.
pub fn start(run: PreparedRun) -> RunnerHandle {
    let (send_events, recv_events) = bounded(EVENT_BUFFER);
    let slot = ChildSlot::default();
    let flag = Arc::new(AtomicBool::new(false));
    let cancel = CancelHandle {
        flag: flag.clone(),
        slot: slot.clone(),
    };

    let worker_slot = slot.clone();
    let worker = thread::spawn(move || run_worker(run, worker_slot, flag, send_events));

    RunnerHandle {
        events: recv_events,
        cancel,
        worker,
    }
}

fn run_worker(
    run: PreparedRun,
    slot: ChildSlot,
    flag: Arc<AtomicBool>,
    events: Sender<RunEvent>,
) {
    let _reaper = SlotReaper(slot.clone());

    for note in run.notes {
        if events.send(RunEvent::CommandSkipped(note)).is_err() {
            return;
        }
    }

    for spec in run.commands {
        if flag.load(Ordering::SeqCst) {
            let _ = events.send(RunEvent::Interrupted);
            return;
        }

        if events
            .send(RunEvent::CommandStarted(spec.echo_line()))
            .is_err()
        {
            return;
        }

        let mut command = spec.to_command();
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                let text = format!("Failed to start {}: {e}", spec.program());
                warn!("{text}");
                if events.send(RunEvent::Line(text)).is_err() {
                    return;
                }
                continue;
            }
        };

        let (send_lines, recv_lines) = bounded::<String>(EVENT_BUFFER);
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, send_lines.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, send_lines.clone()));
        }
        drop(send_lines);
        slot.put(child);

        let mut throttle = spec.throttle();
        for line in recv_lines.iter() {
            if throttle.admit(&line) && events.send(RunEvent::Line(line)).is_err() {
                return;
            }
        }

        for reader in readers {
            if let Err(e) = reader.join() {
                warn!("Failed to join output reader: {e:?}");
            }
        }

        if let Some(mut child) = slot.take() {
            match child.wait() {
                Ok(status) => {
                    if events.send(RunEvent::CommandExited(status)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("Failed to wait on {}: {e}", spec.program());
                }
            }
        }

        if flag.load(Ordering::SeqCst) {
            let _ = events.send(RunEvent::Interrupted);
            return;
        }
    }

    let _ = events.send(RunEvent::Finished);
}

fn spawn_reader<R: Read + Send + 'static>(
    stream: R,
    sender: Sender<String>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    })
}
