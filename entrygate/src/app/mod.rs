use crate::app::counter::DailyCounter;
use crate::app::gate_control::GateControl;
use crate::app::reporter::{Status, StatusReporter};
use crate::app::transit::{Outcome, Readings, TransitAttempt};
use crate::config::GateConfig;
use crate::hal::barrier::Position;
use crate::hal::presence::Zone;
use crate::hal::Platform;
use crate::svc::{CounterStore, Date, EventRecord, GateEvent, Instant};

pub mod counter;
pub mod gate_control;
pub mod reporter;
pub mod transit;

#[derive(Copy, Clone, Eq, PartialEq, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Idle,
    Transit,
    Closing,
    Warning,
    Override,
}

/// Snapshot of the gate, e.g. for a status page.
#[derive(Clone, Eq, PartialEq, Debug, serde::Serialize)]
pub struct GateState {
    pub position: Position,
    pub daily_count: u32,
    pub last_reset_date: Date,
    pub mode: Mode,
}

struct Services<'a> {
    platform: &'a dyn Platform,
    config: GateConfig,
    gate: GateControl<'a>,
    counter: DailyCounter,
    reporter: StatusReporter,
}

impl<'a> Services<'a> {
    fn store(&self) -> Option<&'a dyn CounterStore> {
        let platform: &'a dyn Platform = self.platform;
        platform.counter_store()
    }

    fn emit(&self, event: GateEvent) {
        let record = EventRecord {
            timestamp: self.platform.wall_clock().now(),
            event,
        };
        self.platform.event_sink().emit(&record);
    }

    fn readings(&self) -> Readings {
        let entry = self.platform.presence(Zone::Entry).is_present();
        let exit = self.platform.presence(Zone::Exit).is_present();
        Readings { entry, exit }
    }

    fn override_engaged(&self) -> bool {
        self.platform
            .override_lever()
            .map_or(false, |lever| lever.is_on())
    }

    fn open_gate(&mut self, now: Instant) {
        self.gate.open(now);
        self.emit(GateEvent::GateOpened);
    }

    fn close_gate(&mut self, now: Instant) {
        self.gate.close(now);
        self.emit(GateEvent::GateClosed);
    }

    /// Forces the barrier open and hands control to the lever, dropping
    /// whatever the automatic machinery was doing.
    fn engage_override(&mut self, now: Instant) -> AppState {
        self.emit(GateEvent::OverrideEngaged);
        self.open_gate(now);
        AppState::Override(OverrideState)
    }

    fn record_success(&mut self) -> u32 {
        let store = self.store();
        self.counter.record_success(store)
    }

    fn check_day_boundary(&mut self) {
        let today = self.platform.wall_clock().current_date();
        let store = self.store();
        if self.counter.roll_over(today, store) {
            self.emit(GateEvent::DailyReset { date: today });
        }
    }

    fn report(&mut self, now: Instant, status: Status) {
        if let Some(status) = self.reporter.poll(now, status) {
            self.emit(GateEvent::Status { status });
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum AppState {
    Idle(IdleState),
    Transit(TransitState),
    Closing(ClosingState),
    Warning(WarningState),
    Override(OverrideState),
}

impl Default for AppState {
    fn default() -> Self {
        AppState::Idle(IdleState)
    }
}

impl AppState {
    fn mode(&self) -> Mode {
        match self {
            AppState::Idle(_) => Mode::Idle,
            AppState::Transit(_) => Mode::Transit,
            AppState::Closing(_) => Mode::Closing,
            AppState::Warning(_) => Mode::Warning,
            AppState::Override(_) => Mode::Override,
        }
    }
}

/// The gate controller. Call [`App::update`] from a fixed-period loop; it
/// samples the inputs once, advances the state machine by one step and
/// returns without waiting.
pub struct App<'a> {
    services: Services<'a>,
    state: AppState,
}

impl<'a> App<'a> {
    pub fn new(platform: &'a dyn Platform, config: GateConfig) -> Self {
        let now = platform.clock().now();
        let today = platform.wall_clock().current_date();

        let gate = GateControl::new(
            platform.barrier(),
            platform.status_led(),
            config.actuator_settle,
        );
        let counter = DailyCounter::restore(platform.counter_store(), today);
        let reporter = StatusReporter::new(config.status_interval);

        let mut services = Services {
            platform,
            config,
            gate,
            counter,
            reporter,
        };

        services.emit(GateEvent::Startup {
            daily_count: services.counter.count(),
        });

        // Whatever the arm was doing before boot, start from a known position
        services.close_gate(now);

        Self {
            services,
            state: AppState::default(),
        }
    }

    pub fn update(&mut self) {
        let now = self.services.platform.clock().now();

        let new_state = match self.state {
            AppState::Idle(mut state) => state.update(now, &mut self.services),
            AppState::Transit(mut state) => state.update(now, &mut self.services),
            AppState::Closing(mut state) => state.update(now, &mut self.services),
            AppState::Warning(mut state) => state.update(now, &mut self.services),
            AppState::Override(mut state) => state.update(now, &mut self.services),
        };

        if new_state != self.state {
            log::debug!("{:?}", &new_state);
            self.state = new_state;
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn position(&self) -> Position {
        self.services.gate.position()
    }

    pub fn daily_count(&self) -> u32 {
        self.services.counter.count()
    }

    pub fn snapshot(&self) -> GateState {
        GateState {
            position: self.position(),
            daily_count: self.daily_count(),
            last_reset_date: self.services.counter.last_reset_date(),
            mode: self.mode(),
        }
    }
}

#[derive(Default, Copy, Clone, Eq, PartialEq, Debug)]
struct IdleState;

impl IdleState {
    fn update(&mut self, now: Instant, services: &mut Services) -> AppState {
        services.check_day_boundary();

        if services.override_engaged() {
            return services.engage_override(now);
        }

        let vehicle_present = services.platform.presence(Zone::Entry).is_present();
        let request_pressed = services.platform.request_button().is_on();
        let ready = services.gate.position() == Position::Closed && services.gate.is_settled(now);

        if ready && vehicle_present && request_pressed {
            services.emit(GateEvent::TransitAdmitted {
                ticket: services.counter.next_ticket(),
            });
            services.open_gate(now);
            return AppState::Transit(TransitState {
                attempt: TransitAttempt::admit(now),
            });
        }

        services.report(now, Status::idle(vehicle_present, request_pressed));
        AppState::Idle(*self)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct TransitState {
    attempt: TransitAttempt,
}

impl TransitState {
    fn update(&mut self, now: Instant, services: &mut Services) -> AppState {
        if services.override_engaged() {
            log::info!("Transit abandoned, override engaged");
            return services.engage_override(now);
        }

        // Readings are meaningless while the arm is still swinging
        if !services.gate.is_settled(now) {
            return AppState::Transit(*self);
        }

        let phase = self.attempt.phase();
        let readings = services.readings();
        let timeout = services.config.operation_timeout;

        match self.attempt.poll(now, readings, timeout) {
            Outcome::Pending => {
                if self.attempt.phase() != phase {
                    services.emit(GateEvent::EntryCleared);
                }
                AppState::Transit(*self)
            }
            Outcome::Success => {
                let daily_count = services.record_success();
                services.emit(GateEvent::TransitCompleted { daily_count });
                AppState::Closing(ClosingState {
                    close_at: now + services.config.exit_settle,
                })
            }
            Outcome::Timeout => {
                services.emit(GateEvent::TransitTimedOut);
                AppState::Warning(WarningState {
                    remaining: services.config.warning_beeps,
                    next_beep_at: now,
                })
            }
            Outcome::Fraud => {
                services.emit(GateEvent::FraudDetected);
                services.close_gate(now);
                AppState::Idle(IdleState)
            }
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct ClosingState {
    close_at: Instant,
}

impl ClosingState {
    fn update(&mut self, now: Instant, services: &mut Services) -> AppState {
        if services.override_engaged() {
            return services.engage_override(now);
        }

        if now < self.close_at {
            return AppState::Closing(*self);
        }

        services.close_gate(now);
        AppState::Idle(IdleState)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct WarningState {
    remaining: u8,
    next_beep_at: Instant,
}

impl WarningState {
    fn update(&mut self, now: Instant, services: &mut Services) -> AppState {
        if services.override_engaged() {
            return services.engage_override(now);
        }

        if now < self.next_beep_at {
            return AppState::Warning(*self);
        }

        if self.remaining == 0 {
            services.close_gate(now);
            return AppState::Idle(IdleState);
        }

        let beep = services.config.beep_duration;
        services.platform.buzzer().beep(beep);
        self.remaining -= 1;
        services.emit(GateEvent::WarningBeep {
            remaining: self.remaining,
        });
        self.next_beep_at = now + beep + services.config.beep_gap;

        AppState::Warning(*self)
    }
}

#[derive(Default, Copy, Clone, Eq, PartialEq, Debug)]
struct OverrideState;

impl OverrideState {
    fn update(&mut self, now: Instant, services: &mut Services) -> AppState {
        if !services.override_engaged() {
            services.emit(GateEvent::OverrideReleased);
            services.close_gate(now);
            return AppState::Idle(IdleState);
        }

        services.check_day_boundary();
        services.report(now, Status::OverrideActive);
        AppState::Override(*self)
    }
}
