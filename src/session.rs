//! Coordination session: the tick loop that drives announcements.
//!
//! Single-threaded and cooperative. One session owns its event, announcer
//! and clock exclusively; every tick reads the clock, queries the timing
//! engine and feeds each pending action to the announcement machine. Hosts
//! that background/foreground must stop and restart the loop rather than
//! touch session state from another thread.

use crate::announce::backend::AudioBackend;
use crate::announce::machine::{Announcement, Announcer, TickContext};
use crate::defaults;
use crate::event::Event;
use crate::timing;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Per-tick time source.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time. Live sessions use this.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Practice-mode clock: simulated time runs `speed`× faster than wall
/// time from a chosen origin, so a rehearsal sweeps the timeline quickly
/// while announcement pacing stays meaningful.
pub struct PracticeClock {
    anchor: Instant,
    origin: DateTime<Utc>,
    speed: f64,
}

impl PracticeClock {
    pub fn new(origin: DateTime<Utc>, speed: f64) -> Self {
        Self {
            anchor: Instant::now(),
            origin,
            speed,
        }
    }
}

impl Clock for PracticeClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed_us = self.anchor.elapsed().as_micros() as f64 * self.speed;
        self.origin + ChronoDuration::microseconds(elapsed_us as i64)
    }
}

/// Everything a host UI needs to observe from a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started { at: DateTime<Utc> },
    Announced(Announcement),
    Finished,
    Stopped,
}

/// Cheap cloneable handle for stopping a running session from outside the
/// tick loop.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    stop: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// One coordination run (live or practice) over one event.
pub struct Session {
    event: Event,
    announcer: Announcer,
    clock: Box<dyn Clock>,
    ctx: TickContext,
    events_tx: Option<Sender<SessionEvent>>,
    stop: Arc<AtomicBool>,
}

impl Session {
    pub fn new(
        event: Event,
        backend: Box<dyn AudioBackend>,
        clock: Box<dyn Clock>,
        speed_multiplier: f64,
    ) -> Self {
        let speed = speed_multiplier.clamp(
            defaults::MIN_SPEED_MULTIPLIER,
            defaults::MAX_SPEED_MULTIPLIER,
        );
        let ctx = TickContext::from_event(&event, speed);
        Self {
            event,
            announcer: Announcer::new(backend),
            clock,
            ctx,
            events_tx: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Live run: wall clock, speed forced to 1.0.
    pub fn live(event: Event, backend: Box<dyn AudioBackend>) -> Self {
        Self::new(event, backend, Box::new(SystemClock), 1.0)
    }

    /// Practice run from `origin` at `speed` (clamped to 1.0–5.0).
    pub fn practice(
        event: Event,
        backend: Box<dyn AudioBackend>,
        origin: DateTime<Utc>,
        speed: f64,
    ) -> Self {
        let speed = speed.clamp(
            defaults::MIN_SPEED_MULTIPLIER,
            defaults::MAX_SPEED_MULTIPLIER,
        );
        Self::new(
            event,
            backend,
            Box::new(PracticeClock::new(origin, speed)),
            speed,
        )
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn announcer(&mut self) -> &mut Announcer {
        &mut self.announcer
    }

    /// Subscribe to session events. Call before `run`.
    pub fn events(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = unbounded();
        self.events_tx = Some(tx);
        rx
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Activate the announcer and announce the session start.
    pub fn start(&mut self) {
        self.announcer.start();
        let at = self.clock.now();
        info!(title = %self.event.title, %at, speed = self.ctx.speed_multiplier, "session started");
        self.emit(SessionEvent::Started { at });
    }

    /// One pass of the tick loop at the given instant. Returns true when
    /// the event window is over.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let pending = timing::pending_actions(
            &self.event.timeline,
            now,
            self.event.time_window_seconds,
        );
        let mut announced = Vec::new();
        for action in pending {
            let seconds = timing::seconds_until(action, now);
            if let Some(announcement) = self.announcer.process(action, seconds, &self.ctx) {
                announced.push(announcement);
            }
        }
        for announcement in announced {
            debug!(action = %announcement.action_id, phase = ?announcement.phase, "announced");
            self.emit(SessionEvent::Announced(announcement));
        }
        now > self.event.end_time
    }

    /// Drive the tick loop at ~60 Hz until the event ends or the handle
    /// stops it. The loop never awaits audio completion; backend calls are
    /// fire-and-forget.
    pub async fn run(&mut self) {
        self.start();
        let mut interval =
            tokio::time::interval(Duration::from_millis(defaults::TICK_INTERVAL_MS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if self.stop.load(Ordering::Relaxed) {
                self.announcer.stop();
                info!(title = %self.event.title, "session stopped");
                self.emit(SessionEvent::Stopped);
                break;
            }
            let now = self.clock.now();
            if self.tick(now) {
                self.announcer.stop();
                info!(title = %self.event.title, "session finished");
                self.emit(SessionEvent::Finished);
                break;
            }
        }
    }

    /// Forget announcement state so the event can run again from scratch.
    pub fn reset(&mut self) {
        self.announcer.reset();
        self.stop.store(false, Ordering::Relaxed);
    }

    /// Release the audio backend and force idle.
    pub fn shutdown(&mut self) {
        self.announcer.shutdown();
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events_tx
            && tx.send(event).is_err()
        {
            debug!("session event receiver dropped");
        }
    }
}
