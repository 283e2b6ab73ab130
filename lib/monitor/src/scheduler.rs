use crate::error::MonitorError;
use crossbeam::channel::{self, Receiver, Sender};
use crtmon_config::ON_DEMAND_REFERENCE_RATE;
use std::{
    sync::{Mutex, PoisonError},
    thread::JoinHandle,
    time::{Duration, Instant},
};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
/// When the scheduler hands frames to the renderer
pub enum RefreshMode {
    /// Present on a fixed period regardless of the signal's timing
    ///
    /// Without a period nothing is presented unless asked for explicitly
    FixedRate(Option<Duration>),
    /// Present as soon as a frame completes, or again after the timeout if none does
    OnDemand { timeout: Duration },
}

impl RefreshMode {
    /// Negative rates select on demand presentation
    pub fn from_rate(rate: f64) -> Self {
        if rate < 0.0 {
            return RefreshMode::OnDemand {
                timeout: Duration::from_secs_f64(2.0 / ON_DEMAND_REFERENCE_RATE),
            };
        }

        if rate > 0.0 && rate.is_finite() {
            RefreshMode::FixedRate(Some(Duration::from_secs_f64(1.0 / rate)))
        } else {
            RefreshMode::FixedRate(None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SchedulerState {
    Idle,
    Running,
    Paused,
    /// Final, the worker thread is gone
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Run,
    Pause,
    Terminate,
}

#[derive(Debug)]
/// Worker thread presenting frames on its own schedule
pub struct RefreshScheduler {
    mode: RefreshMode,
    state: Mutex<SchedulerState>,
    control: Sender<Control>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    /// Start the worker in [`SchedulerState::Idle`]
    ///
    /// `present` performs one hand-off and returns false once there is nothing left to
    /// present to, which stops the worker
    pub fn spawn(
        mode: RefreshMode,
        frame_ready: Receiver<()>,
        present: impl FnMut() -> bool + Send + 'static,
    ) -> Result<Self, MonitorError> {
        let (control, control_receiver) = channel::unbounded();

        let thread = std::thread::Builder::new()
            .name("monitor-refresh".to_string())
            .spawn(move || run(mode, control_receiver, frame_ready, present))
            .map_err(MonitorError::Scheduler)?;

        tracing::debug!("Refresh scheduler started in {:?} mode", mode);

        Ok(Self {
            mode,
            state: Mutex::new(SchedulerState::Idle),
            control,
            thread: Mutex::new(Some(thread)),
        })
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idle or paused to running
    pub fn power_on(&self) -> bool {
        self.transition(Control::Run, |state| {
            matches!(state, SchedulerState::Idle | SchedulerState::Paused)
                .then_some(SchedulerState::Running)
        })
    }

    /// Running to paused
    pub fn power_off(&self) -> bool {
        self.transition(Control::Pause, |state| {
            (state == SchedulerState::Running).then_some(SchedulerState::Paused)
        })
    }

    /// Stop the worker for good and wait for it to exit
    pub fn terminate(&self) {
        let transitioned = self.transition(Control::Terminate, |state| {
            (state != SchedulerState::Terminated).then_some(SchedulerState::Terminated)
        });

        if !transitioned {
            return;
        }

        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            // A worker cannot join itself
            if handle.thread().id() != std::thread::current().id() && handle.join().is_err() {
                tracing::error!("Refresh scheduler panicked");
            }
        }
    }

    fn transition(
        &self,
        control: Control,
        next: impl FnOnce(SchedulerState) -> Option<SchedulerState>,
    ) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(next_state) = next(*state) else {
            return false;
        };

        tracing::debug!("Refresh scheduler {} -> {}", *state, next_state);
        *state = next_state;

        // The worker only goes away after Terminate, which is the last message ever sent
        let _ = self.control.send(control);

        true
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn run(
    mode: RefreshMode,
    control: Receiver<Control>,
    frame_ready: Receiver<()>,
    mut present: impl FnMut() -> bool,
) {
    let ticker = match mode {
        RefreshMode::FixedRate(Some(period)) => channel::tick(period),
        _ => channel::never::<Instant>(),
    };
    let mut running = false;

    loop {
        if !running {
            match control.recv() {
                Ok(Control::Run) => running = true,
                Ok(Control::Pause) => {}
                Ok(Control::Terminate) | Err(_) => break,
            }

            continue;
        }

        match mode {
            RefreshMode::FixedRate(_) => {
                channel::select! {
                    recv(control) -> message => match message {
                        Ok(Control::Run) => {}
                        Ok(Control::Pause) => running = false,
                        Ok(Control::Terminate) | Err(_) => break,
                    },
                    recv(ticker) -> _ => {
                        if !present() {
                            break;
                        }
                    }
                }
            }
            RefreshMode::OnDemand { timeout } => {
                if !present() {
                    break;
                }

                channel::select! {
                    recv(control) -> message => match message {
                        Ok(Control::Run) => {}
                        Ok(Control::Pause) => running = false,
                        Ok(Control::Terminate) | Err(_) => break,
                    },
                    recv(frame_ready) -> message => {
                        // The producer side is gone, nothing will ever complete again
                        if message.is_err() {
                            break;
                        }
                    }
                    default(timeout) => {}
                }
            }
        }
    }

    tracing::debug!("Refresh scheduler exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    fn counting_scheduler(mode: RefreshMode) -> (RefreshScheduler, Sender<()>, Arc<AtomicU32>) {
        let (frame_ready_sender, frame_ready) = channel::bounded(1);
        let presentations = Arc::new(AtomicU32::new(0));
        let counter = presentations.clone();

        let scheduler = RefreshScheduler::spawn(mode, frame_ready, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .unwrap();

        (scheduler, frame_ready_sender, presentations)
    }

    #[test]
    fn rate_selects_mode() {
        assert!(matches!(
            RefreshMode::from_rate(-1.0),
            RefreshMode::OnDemand { .. }
        ));
        assert_eq!(
            RefreshMode::from_rate(4.0),
            RefreshMode::FixedRate(Some(Duration::from_millis(250)))
        );
        assert_eq!(RefreshMode::from_rate(0.0), RefreshMode::FixedRate(None));
        assert_eq!(RefreshMode::from_rate(f64::NAN), RefreshMode::FixedRate(None));
    }

    #[test]
    fn state_machine() {
        let (scheduler, _frame_ready, _) = counting_scheduler(RefreshMode::FixedRate(None));

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(!scheduler.power_off());

        assert!(scheduler.power_on());
        assert!(!scheduler.power_on());
        assert_eq!(scheduler.state(), SchedulerState::Running);

        assert!(scheduler.power_off());
        assert_eq!(scheduler.state(), SchedulerState::Paused);

        assert!(scheduler.power_on());
        scheduler.terminate();
        assert_eq!(scheduler.state(), SchedulerState::Terminated);

        assert!(!scheduler.power_on());
        assert!(!scheduler.power_off());
        assert_eq!(scheduler.state(), SchedulerState::Terminated);
    }

    #[test]
    fn idle_scheduler_presents_nothing() {
        let (scheduler, _frame_ready, presentations) =
            counting_scheduler(RefreshMode::FixedRate(Some(Duration::from_millis(1))));

        std::thread::sleep(Duration::from_millis(30));
        scheduler.terminate();

        assert_eq!(presentations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fixed_rate_presents_periodically() {
        let (scheduler, _frame_ready, presentations) =
            counting_scheduler(RefreshMode::FixedRate(Some(Duration::from_millis(2))));

        scheduler.power_on();
        std::thread::sleep(Duration::from_millis(100));
        scheduler.terminate();

        assert!(presentations.load(Ordering::SeqCst) >= 5);
    }

    #[test]
    fn on_demand_falls_back_to_timeout() {
        let (scheduler, _frame_ready, presentations) = counting_scheduler(RefreshMode::OnDemand {
            timeout: Duration::from_millis(5),
        });

        scheduler.power_on();
        std::thread::sleep(Duration::from_millis(100));
        scheduler.terminate();

        // Nothing completed, yet the worker kept re-presenting instead of hanging
        assert!(presentations.load(Ordering::SeqCst) >= 3);
    }

    #[test]
    fn on_demand_wakes_on_frame() {
        let (scheduler, frame_ready, presentations) = counting_scheduler(RefreshMode::OnDemand {
            timeout: Duration::from_secs(60),
        });

        scheduler.power_on();
        std::thread::sleep(Duration::from_millis(20));
        let before = presentations.load(Ordering::SeqCst);
        assert_eq!(before, 1);

        frame_ready.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(presentations.load(Ordering::SeqCst), 2);
        scheduler.terminate();
    }
}
