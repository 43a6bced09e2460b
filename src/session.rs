// StrikeBox - Session Controller
//
// Top-level state machine: Menu -> Countdown -> Active -> Results -> Menu.
//
// The controller owns every piece of mutable session state (duration,
// strike count, press states, timers). Button edges and timer expiries are
// delivered to it as events from `poll`, one control-loop iteration at a
// time, so the phase alone decides which mutations are legal:
//   Menu    - press classifier adjusts the duration, chord starts a session
//   Active  - strike sampler counts strikes and paces the duration
//   Results - any fresh press resets and returns to Menu

use anyhow::Context;

use crate::classifier::{PressClassifier, RepeatTimer};
use crate::config::{SessionConfig, CHORD_HOLD_MS, POLL_INTERVAL_MS};
use crate::duration::DurationStore;
use crate::events::{AccelSample, AdjustIntent, ButtonId, Edge, PressEvent, SessionPhase};
use crate::hal::{Board, Clock, MotionSensor, NumericDisplay, PixelStrip, RawButtons, OFF, PALETTE};
use crate::input::ButtonBank;
use crate::sequences;
use crate::strike::{StrikeCount, StrikeSampler};
use crate::timers::{TimerId, TimerSet};

pub struct SessionController<S, D, P, B, C> {
    board: Board<S, D, P, B, C>,
    config: SessionConfig,

    phase: SessionPhase,
    duration: DurationStore,
    strikes: StrikeCount,

    buttons: ButtonBank,
    classifier: PressClassifier,
    timers: TimerSet,
    // Present only while Active.
    sampler: Option<StrikeSampler>,
    // When both buttons were first seen down together.
    chord_since: Option<u32>,
}

impl<S, D, P, B, C> SessionController<S, D, P, B, C>
where
    S: MotionSensor,
    D: NumericDisplay,
    P: PixelStrip,
    B: RawButtons,
    C: Clock,
{
    pub fn new(board: Board<S, D, P, B, C>, config: SessionConfig) -> Self {
        Self {
            board,
            buttons: ButtonBank::new(config.polarity, config.settle_ms),
            config,
            phase: SessionPhase::Menu,
            duration: DurationStore::new(),
            strikes: StrikeCount::default(),
            classifier: PressClassifier::new(),
            timers: TimerSet::new(),
            sampler: None,
            chord_since: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn duration(&self) -> u16 {
        self.duration.seconds()
    }

    pub fn strikes(&self) -> u16 {
        self.strikes.get()
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn board(&self) -> &Board<S, D, P, B, C> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<S, D, P, B, C> {
        &mut self.board
    }

    /// Greeting and self test, then the menu with the default duration.
    pub fn power_on(&mut self) -> anyhow::Result<AccelSample> {
        let sample = sequences::run_greeting(&mut self.board, self.config.brightness)?;
        self.board.display.show_number(self.duration.seconds())?;
        log::info!("Menu ready ({} s)", self.duration.seconds());
        Ok(sample)
    }

    /// Control loop. Only returns on a collaborator fault.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.poll()?;
            self.board.clock.delay_ms(POLL_INTERVAL_MS);
        }
    }

    /// One control-loop iteration.
    pub fn poll(&mut self) -> anyhow::Result<()> {
        let now = self.board.clock.now_ms();
        let edges = self.buttons.sample(&mut self.board.buttons, now);

        match self.phase {
            SessionPhase::Menu => self.poll_menu(edges, now),
            SessionPhase::Active => self.poll_active(now),
            SessionPhase::Results => self.poll_results(edges),
            // Runs to completion inside `start_countdown`.
            SessionPhase::Countdown => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Menu
    // -----------------------------------------------------------------------

    fn poll_menu(&mut self, edges: [Option<PressEvent>; 2], now: u32) -> anyhow::Result<()> {
        if self.buttons.chord() {
            match self.chord_since {
                None => {
                    log::debug!("Chord down, holding for {} ms", CHORD_HOLD_MS);
                    self.chord_since = Some(now);
                    // Neither button's press counts as an adjustment any more.
                    self.classifier.abort_all();
                    self.cancel_repeats();
                }
                Some(since) if now.wrapping_sub(since) >= CHORD_HOLD_MS => {
                    return self.start_countdown();
                }
                Some(_) => {}
            }
            return Ok(());
        }

        if self.chord_since.take().is_some() {
            log::debug!("Chord released early, staying in menu");
        }

        // Edges before timers: a release disarms its repeat before it can fire.
        for event in edges.into_iter().flatten() {
            let action = self.classifier.on_event(event);
            let timer = TimerId::Repeat(event.button);
            match action.repeat {
                RepeatTimer::Arm { period_ms } => self.timers.arm(timer, now, period_ms),
                RepeatTimer::Disarm => self.timers.cancel(timer),
                RepeatTimer::Unchanged => {}
            }
            if let Some(intent) = action.intent {
                self.apply(intent)?;
            }
        }

        while let Some(id) = self.timers.pop_due(now) {
            if let TimerId::Repeat(button) = id {
                if let Some(intent) = self.classifier.handle_long_press(button, now) {
                    self.apply(intent)?;
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, intent: AdjustIntent) -> anyhow::Result<()> {
        let seconds = self.duration.adjust(intent.delta());
        log::debug!("{:?} {:?} -> {} s", intent.button, intent.step, seconds);
        self.board.display.show_number(seconds)
    }

    fn cancel_repeats(&mut self) {
        for button in ButtonId::ALL {
            self.timers.cancel(TimerId::Repeat(button));
        }
    }

    // -----------------------------------------------------------------------
    // Countdown
    // -----------------------------------------------------------------------

    fn start_countdown(&mut self) -> anyhow::Result<()> {
        self.chord_since = None;
        self.classifier.abort_all();
        self.cancel_repeats();
        self.enter(SessionPhase::Countdown);

        sequences::run_countdown(&mut self.board, self.config.countdown, self.duration.seconds())?;

        let now = self.board.clock.now_ms();
        self.sampler = Some(StrikeSampler::new(&self.config));
        self.timers.arm(TimerId::Sampler, now, self.config.sampling.period_ms());
        self.enter(SessionPhase::Active);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Active
    // -----------------------------------------------------------------------

    fn poll_active(&mut self, now: u32) -> anyhow::Result<()> {
        while let Some(id) = self.timers.pop_due(now) {
            if id == TimerId::Sampler && self.sample_tick(now)? {
                break;
            }
        }
        Ok(())
    }

    /// Returns true once the session has ended.
    fn sample_tick(&mut self, now: u32) -> anyhow::Result<bool> {
        let Some(sampler) = self.sampler.as_mut() else {
            return Ok(false);
        };

        let reading = self
            .board
            .sensor
            .read_acceleration()
            .context("motion sensor read failed")?;
        let sample = AccelSample::from(reading);

        let outcome = sampler.tick(&sample, now, &mut self.strikes, &mut self.duration);

        if let Some(count) = outcome.strike {
            let cue = PALETTE[usize::from(count.get()) % PALETTE.len()];
            self.board.pixels.fill(cue)?;
        }
        if let Some(remaining) = outcome.remaining {
            self.board.display.show_number(remaining)?;
        }
        if outcome.expired {
            self.finish_active()?;
        }
        Ok(outcome.expired)
    }

    fn finish_active(&mut self) -> anyhow::Result<()> {
        self.timers.cancel_all();
        self.sampler = None;
        self.enter(SessionPhase::Results);

        log::info!("Session over: {} strikes", self.strikes.get());
        sequences::run_results_attention(&mut self.board, self.strikes.get())
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    fn poll_results(&mut self, edges: [Option<PressEvent>; 2]) -> anyhow::Result<()> {
        let pressed = edges.iter().flatten().any(|e| e.edge == Edge::Pressed);
        if pressed {
            self.return_to_menu()?;
        }
        Ok(())
    }

    fn return_to_menu(&mut self) -> anyhow::Result<()> {
        self.duration.reset();
        self.strikes = StrikeCount::default();
        self.classifier.abort_all();
        self.timers.cancel_all();
        self.chord_since = None;
        self.enter(SessionPhase::Menu);

        self.board.pixels.fill(OFF)?;
        self.board.display.clear()?;
        self.board.display.show_number(self.duration.seconds())
    }

    fn enter(&mut self, next: SessionPhase) {
        debug_assert!(
            self.phase.can_enter(next),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        log::info!("{:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingMode;
    use crate::events::ButtonId::{Decrement, Increment};
    use crate::sim::{self, Shown, SimBoard};

    type Sim = SessionController<
        sim::ScriptedSensor,
        sim::RecordingDisplay,
        sim::RecordingPixels,
        sim::ScriptedButtons,
        sim::FakeClock,
    >;

    fn controller() -> Sim {
        SessionController::new(sim::board(), SessionConfig::default())
    }

    fn script(ctl: &mut Sim) -> &mut SimBoard {
        ctl.board_mut()
    }

    /// Poll every 10 ms until the clock passes `until`.
    fn run_until(ctl: &mut Sim, until: u32) {
        while ctl.board().clock.now_ms() < until {
            ctl.poll().unwrap();
            ctl.board_mut().clock.delay_ms(POLL_INTERVAL_MS);
        }
    }

    /// Chord at `start`, quiet session, press to dismiss. Returns the end time.
    fn run_cycle(ctl: &mut Sim, start: u32) -> u32 {
        script(ctl).buttons.hold(Increment, start, start + 700);
        script(ctl).buttons.hold(Decrement, start, start + 700);
        run_until(ctl, start + 600);
        assert_eq!(ctl.phase(), SessionPhase::Active);

        let active_from = ctl.board().clock.now_ms();
        let seconds = u32::from(ctl.duration());
        run_until(ctl, active_from + seconds * 1_000 + 100);
        assert_eq!(ctl.phase(), SessionPhase::Results);

        let press = ctl.board().clock.now_ms() + 100;
        script(ctl).buttons.hold(Decrement, press, press + 80);
        run_until(ctl, press + 200);
        assert_eq!(ctl.phase(), SessionPhase::Menu);
        ctl.board().clock.now_ms()
    }

    #[test]
    fn tap_increments_by_one() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Increment, 100, 220);
        run_until(&mut ctl, 1_000);

        assert_eq!(ctl.duration(), 61);
        assert_eq!(ctl.board().display.numbers(), vec![61]);
        assert_eq!(ctl.timers().armed_count(), 0);
    }

    #[test]
    fn taps_outlasting_a_repeat_period_still_count_once() {
        for release in [350, 400, 550] {
            let mut ctl = controller();
            script(&mut ctl).buttons.hold(Increment, 100, release);
            run_until(&mut ctl, 1_000);

            let held = release - 100;
            assert_eq!(ctl.duration(), 61, "tap held {held} ms");
            assert_eq!(ctl.board().display.numbers(), vec![61], "tap held {held} ms");
            assert_eq!(ctl.timers().armed_count(), 0);
        }
    }

    #[test]
    fn decrement_tap_of_450_ms_counts_once() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Decrement, 100, 550);
        run_until(&mut ctl, 1_000);

        assert_eq!(ctl.duration(), 59);
        assert_eq!(ctl.board().display.numbers(), vec![59]);
    }

    #[test]
    fn contact_bounce_changes_nothing() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Increment, 100, 115);
        script(&mut ctl).buttons.hold(Decrement, 300, 310);
        run_until(&mut ctl, 1_000);

        assert_eq!(ctl.duration(), 60);
        assert!(ctl.board().display.log.is_empty());
    }

    #[test]
    fn long_hold_repeats_and_escalates_to_coarse_steps() {
        let mut ctl = controller();
        // Press seen at 100, repeats every 200 ms from 320. The ticks at 320
        // and 520 fall inside the tap window and change nothing.
        script(&mut ctl).buttons.hold(Increment, 100, 3_250);
        run_until(&mut ctl, 4_000);

        let expected: Vec<u16> = (61..=72).chain([77]).collect();
        assert_eq!(ctl.board().display.numbers(), expected);
        assert_eq!(ctl.duration(), 77);
    }

    #[test]
    fn holding_decrement_saturates_at_zero() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Decrement, 0, 20_000);
        run_until(&mut ctl, 20_100);

        assert_eq!(ctl.duration(), 0);
        assert_eq!(ctl.board().display.numbers().last(), Some(&0));
    }

    #[test]
    fn chord_released_early_stays_in_menu() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Increment, 100, 400);
        script(&mut ctl).buttons.hold(Decrement, 100, 400);
        run_until(&mut ctl, 2_000);

        assert_eq!(ctl.phase(), SessionPhase::Menu);
        assert_eq!(ctl.duration(), 60);
        assert_eq!(ctl.timers().armed_count(), 0);
    }

    #[test]
    fn chord_cancels_repeat_of_the_first_button() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Increment, 100, 2_000);
        script(&mut ctl).buttons.hold(Decrement, 250, 2_000);
        // Decrement settles at 270, before Increment's first repeat (320).
        run_until(&mut ctl, 300);

        assert_eq!(ctl.phase(), SessionPhase::Menu);
        assert!(!ctl.timers().is_armed(TimerId::Repeat(Increment)));
        assert!(!ctl.timers().is_armed(TimerId::Repeat(Decrement)));
        assert_eq!(ctl.duration(), 60);
    }

    #[test]
    fn full_session_without_strikes_returns_to_defaults() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Increment, 100, 700);
        script(&mut ctl).buttons.hold(Decrement, 100, 700);

        // Chord confirmed at 620, countdown blocks for 4.5 s.
        run_until(&mut ctl, 630);
        assert_eq!(ctl.phase(), SessionPhase::Active);
        assert_eq!(ctl.board().clock.now_ms(), 5_130);
        assert!(ctl.timers().is_armed(TimerId::Sampler));
        assert_eq!(&ctl.board().display.numbers()[..4], &[3, 2, 1, 60]);

        // Sampler armed at 5_120; tick 1_200 lands on 65_120.
        run_until(&mut ctl, 65_110);
        assert_eq!(ctl.phase(), SessionPhase::Active);
        assert_eq!(ctl.duration(), 1);
        run_until(&mut ctl, 65_130);
        assert_eq!(ctl.phase(), SessionPhase::Results);
        assert_eq!(ctl.duration(), 0);
        assert_eq!(ctl.strikes(), 0);
        assert_eq!(ctl.timers().armed_count(), 0);
        assert_eq!(ctl.board().display.last(), Some(Shown::Number(0)));

        // Results wait until a fresh press.
        run_until(&mut ctl, 80_000);
        assert_eq!(ctl.phase(), SessionPhase::Results);
        script(&mut ctl).buttons.hold(Increment, 80_000, 80_100);
        run_until(&mut ctl, 81_000);

        assert_eq!(ctl.phase(), SessionPhase::Menu);
        assert_eq!(ctl.duration(), 60);
        assert_eq!(ctl.strikes(), 0);
        assert_eq!(ctl.board().display.last(), Some(Shown::Number(60)));
        assert_eq!(ctl.board().pixels.lit(), Some(OFF));
    }

    #[test]
    fn strikes_are_counted_with_refractory_spacing() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Increment, 100, 700);
        script(&mut ctl).buttons.hold(Decrement, 100, 700);
        run_until(&mut ctl, 630);
        let t = ctl.board().clock.now_ms();

        // One punch spanning three samples, then a second punch 400 ms later,
        // then a double spike 100 ms apart that must count once.
        script(&mut ctl).sensor.spike(t + 1_000, t + 1_150, 48.0);
        script(&mut ctl).sensor.spike(t + 1_550, t + 1_600, 35.0);
        script(&mut ctl).sensor.spike(t + 3_000, t + 3_050, 60.0);
        script(&mut ctl).sensor.spike(t + 3_100, t + 3_150, 60.0);
        run_until(&mut ctl, t + 5_000);

        assert_eq!(ctl.strikes(), 3);
        assert_eq!(ctl.board().pixels.lit(), Some(PALETTE[0]));
        let cues = &ctl.board().pixels.flushed;
        assert_eq!(&cues[cues.len() - 3..], &[PALETTE[1], PALETTE[2], PALETTE[0]]);
    }

    #[test]
    fn presses_during_active_do_not_touch_the_duration() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Increment, 100, 700);
        script(&mut ctl).buttons.hold(Decrement, 100, 700);
        run_until(&mut ctl, 630);
        let t = ctl.board().clock.now_ms();

        script(&mut ctl).buttons.hold(Increment, t + 100, t + 2_000);
        run_until(&mut ctl, t + 2_500);

        assert_eq!(ctl.phase(), SessionPhase::Active);
        // 2.5 s of pacing, nothing else.
        assert_eq!(ctl.duration(), 58);
        assert!(!ctl.timers().is_armed(TimerId::Repeat(Increment)));
    }

    #[test]
    fn zero_duration_session_ends_on_first_tick() {
        let mut ctl = controller();
        ctl.duration.adjust(-60);
        script(&mut ctl).buttons.hold(Increment, 100, 700);
        script(&mut ctl).buttons.hold(Decrement, 100, 700);
        run_until(&mut ctl, 5_200);

        assert_eq!(ctl.phase(), SessionPhase::Results);
        assert_eq!(ctl.board().sensor.reads, 1);
    }

    #[test]
    fn once_per_second_sampling_reads_once_per_decrement() {
        let config = SessionConfig { sampling: SamplingMode::OncePerSecond, ..SessionConfig::default() };
        let mut ctl = SessionController::new(sim::board(), config);
        ctl.duration.adjust(10 - 60);
        script(&mut ctl).buttons.hold(Increment, 100, 700);
        script(&mut ctl).buttons.hold(Decrement, 100, 700);
        run_until(&mut ctl, 20_000);

        assert_eq!(ctl.phase(), SessionPhase::Results);
        assert_eq!(ctl.board().sensor.reads, 10);
    }

    #[test]
    fn sensor_fault_is_fatal_and_surfaced() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Increment, 100, 700);
        script(&mut ctl).buttons.hold(Decrement, 100, 700);
        run_until(&mut ctl, 630);
        let t = ctl.board().clock.now_ms();
        script(&mut ctl).sensor.fail_from(t + 500);

        let err = loop {
            if let Err(e) = ctl.poll() {
                break e;
            }
            ctl.board_mut().clock.delay_ms(POLL_INTERVAL_MS);
        };
        assert!(format!("{err:#}").contains("motion sensor read failed"));
        assert_eq!(ctl.strikes(), 0);
    }

    #[test]
    fn repeated_cycles_end_in_identical_state() {
        let mut ctl = controller();
        script(&mut ctl).buttons.hold(Increment, 100, 3_250);
        run_until(&mut ctl, 4_000);
        assert_eq!(ctl.duration(), 77);

        let end = run_cycle(&mut ctl, 5_000);
        let first = (ctl.duration(), ctl.strikes(), ctl.board().display.last(), ctl.board().pixels.lit());

        run_cycle(&mut ctl, end + 1_000);
        let second = (ctl.duration(), ctl.strikes(), ctl.board().display.last(), ctl.board().pixels.lit());

        assert_eq!(first, second);
        assert_eq!(first.0, 60);
    }
}
