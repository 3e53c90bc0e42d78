//! The engine's command surface.
//!
//! [`TimerService`] owns the registry, the tick cadences, the daily-reset
//! state, a [`Store`] and a [`Clock`]. Presentation code calls commands on
//! it (or sends a [`Command`] through [`TimerService::dispatch`]), drives
//! time with [`TimerService::pump`], and drains [`Event`]s for display.
//!
//! Every mutation and every pump that ticked something saves the snapshot.
//! If that save fails the in-memory change stands and the error is
//! returned once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::daily_reset::{DailyReset, ResetZone};
use crate::error::{CoreError, Result};
use crate::events::{Change, Event};
use crate::notify::{Notifier, NullNotifier};
use crate::persistence;
use crate::registry::Registry;
use crate::scheduler::TickScheduler;
use crate::storage::{Config, Store, NEXT_RESET_KEY, THEME_KEY};
use crate::theme::Theme;
use crate::timer::{
    parse_minutes, Completion, Timer, TimerId, TimerMode, TimerView, DEFAULT_WORK_MIN,
};

/// Knobs taken from [`Config`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub default_duration_min: u32,
    pub daily_reset_enabled: bool,
    pub zone: ResetZone,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            default_duration_min: DEFAULT_WORK_MIN,
            daily_reset_enabled: true,
            zone: ResetZone::Local,
        }
    }
}

impl ServiceOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_duration_min: config.timer.default_duration_min,
            daily_reset_enabled: config.daily_reset.enabled,
            zone: ResetZone::from_offset_minutes(config.daily_reset.utc_offset_minutes),
        }
    }
}

/// A presentation-layer request, as raw as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Create,
    Start { id: TimerId },
    Pause { id: TimerId },
    Toggle { id: TimerId },
    Reset { id: TimerId },
    Delete { id: TimerId },
    Rename { id: TimerId, text: String },
    SetDuration { id: TimerId, minutes: String },
    SetMode { id: TimerId, mode: TimerMode },
}

pub struct TimerService<S, C> {
    store: S,
    clock: C,
    registry: Registry,
    scheduler: TickScheduler,
    daily: DailyReset,
    notifier: Box<dyn Notifier>,
    events: Vec<Event>,
    options: ServiceOptions,
    theme: Theme,
}

impl<S: Store, C: Clock> TimerService<S, C> {
    /// Load state from `store` with no completion sink.
    pub fn open(store: S, clock: C, options: ServiceOptions) -> Result<Self> {
        Self::open_with_notifier(store, clock, options, Box::new(NullNotifier))
    }

    /// Load state from `store`: apply catch-up, fire completions that
    /// happened while closed, run the daily-reset check, and resume the
    /// cadence of every timer still running.
    pub fn open_with_notifier(
        store: S,
        clock: C,
        options: ServiceOptions,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        let now = clock.now();
        let loaded = persistence::load(&store, now)?;

        let next_reset_at = store
            .get(NEXT_RESET_KEY)?
            .and_then(|raw| match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(at) => Some(at.with_timezone(&Utc)),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable next reset instant");
                    None
                }
            });
        let theme = store
            .get(THEME_KEY)?
            .and_then(|raw| raw.parse::<Theme>().ok())
            .unwrap_or_default();

        let mut service = Self {
            store,
            clock,
            registry: loaded.registry,
            scheduler: TickScheduler::default(),
            daily: DailyReset::new(options.zone, next_reset_at),
            notifier,
            events: Vec::new(),
            options,
            theme,
        };

        for (id, _secs) in &loaded.caught_up {
            service.emit_change(*id, Change::CaughtUp, now);
        }
        for completion in &loaded.completions {
            service.fire_completion(completion, now);
        }
        for (id, anchor) in &loaded.anchors {
            service.scheduler.resume(*id, *anchor);
        }
        info!(
            timers = service.registry.len(),
            running = service.scheduler.len(),
            "timer state loaded"
        );

        if service.options.daily_reset_enabled {
            service.check_daily_reset()?;
        }
        service.persist()?;
        Ok(service)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn next_reset_at(&self) -> Option<DateTime<Utc>> {
        self.daily.next_reset_at()
    }

    pub fn zone(&self) -> ResetZone {
        self.daily.zone()
    }

    pub fn view(&self, id: TimerId) -> Result<TimerView> {
        self.registry
            .view(id, self.clock.now())
            .ok_or(CoreError::NotFound { id })
    }

    pub fn list(&self) -> Vec<TimerView> {
        self.registry.views(self.clock.now())
    }

    /// Take every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Route a raw command to its typed handler.
    pub fn dispatch(&mut self, command: Command) -> Result<TimerView> {
        match command {
            Command::Create => self.create(),
            Command::Start { id } => self.start(id),
            Command::Pause { id } => self.pause(id),
            Command::Toggle { id } => self.toggle(id),
            Command::Reset { id } => self.reset(id),
            Command::Delete { id } => self.delete(id),
            Command::Rename { id, text } => self.rename(id, &text),
            Command::SetDuration { id, minutes } => {
                self.timer(id)?;
                let minutes = parse_minutes(&minutes)?;
                self.set_duration(id, minutes)
            }
            Command::SetMode { id, mode } => self.set_mode(id, mode),
        }
    }

    /// Append a new paused countdown timer with the configured work length.
    pub fn create(&mut self) -> Result<TimerView> {
        let now = self.clock.now();
        let id = self.registry.next_id(now);
        let timer = Timer::with_duration(id, now, self.options.default_duration_min);
        self.registry.insert(timer);
        info!(timer = %id, "timer created");
        self.commit(id, Change::Created, now)
    }

    pub fn start(&mut self, id: TimerId) -> Result<TimerView> {
        let now = self.clock.now();
        if self.timer_mut(id)?.start() {
            self.scheduler.schedule(id, now);
        }
        self.commit(id, Change::Started, now)
    }

    pub fn pause(&mut self, id: TimerId) -> Result<TimerView> {
        let now = self.clock.now();
        self.timer_mut(id)?.pause();
        self.scheduler.cancel(id);
        self.commit(id, Change::Paused, now)
    }

    /// Start if paused, pause if running.
    pub fn toggle(&mut self, id: TimerId) -> Result<TimerView> {
        if self.timer(id)?.is_running() {
            self.pause(id)
        } else {
            self.start(id)
        }
    }

    pub fn reset(&mut self, id: TimerId) -> Result<TimerView> {
        let now = self.clock.now();
        self.timer_mut(id)?.reset();
        self.scheduler.cancel(id);
        self.commit(id, Change::Reset, now)
    }

    /// Remove a timer for good. Returns its last view.
    pub fn delete(&mut self, id: TimerId) -> Result<TimerView> {
        let now = self.clock.now();
        let view = self.view(id)?;
        self.scheduler.cancel(id);
        self.registry.remove(id);
        info!(timer = %id, "timer deleted");
        self.events.push(Event::TimerDeleted {
            id,
            title: view.title.clone(),
            at: now,
        });
        self.persist()?;
        Ok(view)
    }

    pub fn rename(&mut self, id: TimerId, text: &str) -> Result<TimerView> {
        let now = self.clock.now();
        self.timer_mut(id)?.rename(text);
        self.commit(id, Change::Renamed, now)
    }

    /// Set the work length in minutes. Rejected values change nothing.
    pub fn set_duration(&mut self, id: TimerId, minutes: i64) -> Result<TimerView> {
        let now = self.clock.now();
        self.timer_mut(id)?.set_custom_duration(minutes)?;
        self.commit(id, Change::DurationChanged, now)
    }

    pub fn set_mode(&mut self, id: TimerId, mode: TimerMode) -> Result<TimerView> {
        let now = self.clock.now();
        if self.timer_mut(id)?.set_mode(mode) {
            self.scheduler.cancel(id);
        }
        self.commit(id, Change::ModeChanged, now)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<Theme> {
        let now = self.clock.now();
        self.theme = theme;
        self.events.push(Event::ThemeChanged { theme, at: now });
        self.store.set(THEME_KEY, theme.as_str())?;
        Ok(theme)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.set_theme(self.theme.toggled())
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Apply every tick owed at the current time. Returns how many ticks
    /// were applied. Saves once if anything ticked.
    pub fn pump(&mut self) -> Result<usize> {
        let now = self.clock.now();
        let mut applied = 0usize;
        let mut ticked = Vec::new();
        let mut completions = Vec::new();

        for (id, owed) in self.scheduler.due(now) {
            let Some(timer) = self.registry.get_mut(id) else {
                self.scheduler.cancel(id);
                continue;
            };
            for _ in 0..owed {
                if !timer.is_running() {
                    break;
                }
                applied += 1;
                if let Some(completion) = timer.tick() {
                    completions.push(completion);
                    break;
                }
            }
            if !timer.is_running() {
                self.scheduler.cancel(id);
            }
            ticked.push(id);
        }

        if ticked.is_empty() {
            return Ok(0);
        }
        debug!(ticks = applied, timers = ticked.len(), "pumped");

        for id in &ticked {
            if !completions.iter().any(|c| c.id == *id) {
                self.emit_change(*id, Change::Ticked, now);
            }
        }
        for completion in &completions {
            self.fire_completion(completion, now);
        }
        self.persist()?;
        Ok(applied)
    }

    /// Run the midnight rollover if it is due. Returns whether it ran.
    pub fn check_daily_reset(&mut self) -> Result<bool> {
        let now = self.clock.now();
        if !self.daily.check_and_reset(&mut self.registry, now) {
            return Ok(false);
        }
        self.finish_daily_reset(now)?;
        Ok(true)
    }

    /// Full reset of every timer right now, and a fresh next-midnight instant.
    pub fn force_daily_reset(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.daily.reset_now(&mut self.registry, now);
        self.finish_daily_reset(now)
    }

    /// Stop cadences, announce the rollover and store the next instant.
    fn finish_daily_reset(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.scheduler.clear();
        for id in self.registry.ids() {
            self.emit_change(id, Change::DailyReset, now);
        }
        let next = self.daily.next_reset_at().unwrap_or(now);
        self.events.push(Event::DailyReset {
            timers: self.registry.len(),
            next_reset_at: next,
            at: now,
        });
        self.store.set(NEXT_RESET_KEY, &next.to_rfc3339())?;
        self.persist()
    }

    /// Write the timer snapshot now.
    ///
    /// Running timers are stamped with their last tick, paused ones with now.
    pub fn persist(&mut self) -> Result<()> {
        let now = self.clock.now();
        let scheduler = &self.scheduler;
        persistence::save_stamped(&mut self.store, &self.registry, |timer| {
            if timer.is_running() {
                scheduler.last_tick_at(timer.id()).unwrap_or(now)
            } else {
                now
            }
        })
        .inspect_err(|e| {
            warn!(error = %e, "failed to save timer state");
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn timer(&self, id: TimerId) -> Result<&Timer> {
        self.registry.get(id).ok_or(CoreError::NotFound { id })
    }

    fn timer_mut(&mut self, id: TimerId) -> Result<&mut Timer> {
        self.registry.get_mut(id).ok_or(CoreError::NotFound { id })
    }

    fn emit_change(&mut self, id: TimerId, change: Change, at: DateTime<Utc>) {
        if let Some(timer) = self.registry.view(id, at) {
            self.events.push(Event::TimerChanged { change, timer, at });
        }
    }

    fn fire_completion(&mut self, completion: &Completion, at: DateTime<Utc>) {
        info!(
            timer = %completion.id,
            finished = %completion.finished,
            next = %completion.next,
            sessions = completion.sessions_completed,
            "phase completed"
        );
        self.notifier.notify(completion);
        if let Some(timer) = self.registry.view(completion.id, at) {
            self.events.push(Event::TimerCompleted {
                completion: *completion,
                timer,
                at,
            });
        }
    }

    /// Record a change notification, save, and hand back the fresh view.
    fn commit(&mut self, id: TimerId, change: Change, at: DateTime<Utc>) -> Result<TimerView> {
        let view = self.view(id)?;
        self.events.push(Event::TimerChanged {
            change,
            timer: view.clone(),
            at,
        });
        self.persist()?;
        Ok(view)
    }
}
