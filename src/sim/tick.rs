//! Reveal animator tick
//!
//! Advances the picker by one display frame. The host calls `tick` from its
//! frame callback while `PickerState::wants_frame()` is true.

use super::sampler::pick_one;
use super::state::{DisplayCard, PickerState, SpinPhase};
use crate::consts::*;
use crate::{ease_in_cubic, redisplay_interval_ms};

/// Clock readings for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    /// Monotonic frame time (ms), drives the animation
    pub now_ms: f64,
    /// Unix time (ms), stamped on history records
    pub wall_ms: f64,
}

impl Frame {
    pub fn new(now_ms: f64, wall_ms: f64) -> Self {
        Self { now_ms, wall_ms }
    }

    /// Frame where both clocks read the same (tests, simple hosts)
    pub fn at(ms: f64) -> Self {
        Self::new(ms, ms)
    }
}

/// Advance the animator by one frame
pub fn tick(state: &mut PickerState, frame: &Frame) {
    match state.animation.phase {
        SpinPhase::Idle => {}
        SpinPhase::Running => advance_running(state, frame),
        SpinPhase::Settled => advance_settle_pulse(state, frame.now_ms),
    }
}

fn advance_running(state: &mut PickerState, frame: &Frame) {
    let now = frame.now_ms;
    let start = *state.animation.start_time.get_or_insert(now);
    let elapsed = (now - start).max(0.0);

    if elapsed < SPIN_DURATION_MS {
        let progress = elapsed / SPIN_DURATION_MS;
        let interval = redisplay_interval_ms(ease_in_cubic(progress));
        let due = state
            .animation
            .last_tick_time
            .is_none_or(|last| now - last > interval);

        if due {
            // Decorative only: drawn from the live pool, not the winners
            if let Some(entry) = pick_one(state.pool.entries(), &mut state.rng) {
                state.animation.display = DisplayCard::entry(entry);
                state.animation.scale = state.settings.effective_scale(FLICKER_PULSE_SCALE);
            }
            state.animation.last_tick_time = Some(now);
        } else {
            state.animation.scale = (state.animation.scale - FLICKER_SCALE_DECAY).max(1.0);
        }
        return;
    }

    // Time is up; settling needs a winner set, otherwise keep flickering frames
    let Some(winners) = state
        .pending
        .as_ref()
        .map(|p| &p.winners)
        .filter(|w| !w.is_empty())
    else {
        if !state.animation.overdue {
            log::warn!("Spin timed out without winners, still running");
            state.animation.overdue = true;
        }
        return;
    };

    state.animation.display = DisplayCard::for_winners(winners);
    state.animation.phase = SpinPhase::Settled;
    state.animation.scale = state.settings.effective_scale(SETTLE_PULSE_SCALE);
    state.animation.settle_pulse_until = Some(now + SETTLE_PULSE_MS);
    state.complete_spin(frame.wall_ms);
}

fn advance_settle_pulse(state: &mut PickerState, now: f64) {
    if let Some(until) = state.animation.settle_pulse_until
        && now >= until
    {
        state.animation.scale = 1.0;
        state.animation.settle_pulse_until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::BatchId;
    use crate::platform::{Clock, ManualClock};
    use crate::sim::state::PickerEvent;
    use crate::sim::Entry;
    use proptest::prelude::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn picker(labels: &[&str]) -> PickerState {
        PickerState::new(99999).with_labels(labels.iter().copied())
    }

    /// Run frames at 60 Hz until the spin settles; returns frames run
    fn run_to_settle(state: &mut PickerState, clock: &ManualClock) -> usize {
        let mut frames = 0;
        while state.phase() == SpinPhase::Running {
            tick(state, &Frame::new(clock.monotonic_ms(), clock.wall_ms()));
            clock.advance(FRAME_MS);
            frames += 1;
            assert!(frames < 10_000, "spin never settled");
        }
        frames
    }

    fn completions(events: &[PickerEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, PickerEvent::SpinComplete { .. }))
            .count()
    }

    #[test]
    fn test_tick_idle_is_noop() {
        let mut state = picker(&["A", "B"]);
        tick(&mut state, &Frame::at(5000.0));
        assert_eq!(state.phase(), SpinPhase::Idle);
        assert_eq!(state.display(), &DisplayCard::standby());
        assert!(!state.wants_frame());
    }

    #[test]
    fn test_tick_running_to_settled() {
        let mut state = picker(&["Tacos", "Pizza", "Sushi"]);
        assert!(state.request_spin(1));
        let winner = state.pending.as_ref().unwrap().winners[0].clone();

        tick(&mut state, &Frame::at(1000.0));
        assert_eq!(state.phase(), SpinPhase::Running);
        tick(&mut state, &Frame::at(4999.0));
        assert_eq!(state.phase(), SpinPhase::Running);
        assert!(state.history().is_empty());

        tick(&mut state, &Frame::at(5000.0));
        assert_eq!(state.phase(), SpinPhase::Settled);
        assert_eq!(state.display(), &DisplayCard::entry(&winner));
        assert_eq!(state.winners(), &[winner]);
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_first_frame_redisplays() {
        let mut state = picker(&["A", "B"]);
        state.request_spin(1);
        tick(&mut state, &Frame::at(0.0));
        assert_ne!(state.display().label, STANDBY_LABEL);
        assert_eq!(state.scale(), FLICKER_PULSE_SCALE);
        assert_eq!(state.animation().last_tick_time, Some(0.0));
    }

    #[test]
    fn test_cadence_slows_down() {
        let mut state = picker(&["A", "B", "C", "D"]);
        state.request_spin(1);
        tick(&mut state, &Frame::at(0.0));

        // Early on, a redisplay happens once 16ms have passed
        tick(&mut state, &Frame::at(16.0));
        assert_eq!(state.animation().last_tick_time, Some(0.0));
        assert!((state.scale() - (FLICKER_PULSE_SCALE - FLICKER_SCALE_DECAY)).abs() < 1e-6);
        tick(&mut state, &Frame::at(17.0));
        assert_eq!(state.animation().last_tick_time, Some(17.0));

        // Near the end a 540ms gap is not enough (3840ms -> interval ~547ms)
        tick(&mut state, &Frame::at(3300.0));
        assert_eq!(state.animation().last_tick_time, Some(3300.0));
        tick(&mut state, &Frame::at(3840.0));
        assert_eq!(state.animation().last_tick_time, Some(3300.0));
        // 3900ms -> interval ~572ms, gap 600ms
        tick(&mut state, &Frame::at(3900.0));
        assert_eq!(state.animation().last_tick_time, Some(3900.0));
    }

    #[test]
    fn test_scale_decays_to_baseline() {
        let mut state = picker(&["A", "B"]);
        state.request_spin(1);
        tick(&mut state, &Frame::at(0.0));
        tick(&mut state, &Frame::at(3000.0));
        assert_eq!(state.scale(), FLICKER_PULSE_SCALE);
        // Interval is large here, so frames only decay the pulse
        for i in 1..20 {
            tick(&mut state, &Frame::at(3000.0 + i as f64));
        }
        assert_eq!(state.scale(), 1.0);
    }

    #[test]
    fn test_settle_pulse() {
        let mut state = picker(&["A", "B"]);
        state.request_spin(1);
        tick(&mut state, &Frame::at(0.0));
        tick(&mut state, &Frame::at(4000.0));
        assert_eq!(state.phase(), SpinPhase::Settled);
        assert_eq!(state.scale(), SETTLE_PULSE_SCALE);
        assert!(state.wants_frame());

        tick(&mut state, &Frame::at(4299.0));
        assert_eq!(state.scale(), SETTLE_PULSE_SCALE);
        tick(&mut state, &Frame::at(4300.0));
        assert_eq!(state.scale(), 1.0);
        assert!(!state.wants_frame());
    }

    #[test]
    fn test_reduced_motion_skips_pulses() {
        let mut state = picker(&["A", "B"]);
        state.settings.reduced_motion = true;
        state.request_spin(1);
        tick(&mut state, &Frame::at(0.0));
        assert_eq!(state.scale(), 1.0);
        tick(&mut state, &Frame::at(4000.0));
        assert_eq!(state.phase(), SpinPhase::Settled);
        assert_eq!(state.scale(), 1.0);
    }

    #[test]
    fn test_multi_winner_summary() {
        let mut state = picker(&["A", "B", "C", "D"]);
        state.request_spin(3);
        tick(&mut state, &Frame::at(0.0));
        tick(&mut state, &Frame::at(4000.0));
        assert_eq!(state.display().label, "3 WINNERS SELECTED");
        assert_eq!(state.display().color, SUCCESS_COLOR);
        assert_eq!(state.winners().len(), 3);
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let clock = ManualClock::new(0.0, 1_700_000_000_000.0);
        let mut state = picker(&["A", "B", "C"]);
        state.request_spin(2);
        let frames = run_to_settle(&mut state, &clock);
        // 4000ms at 60 Hz
        assert!((240..=242).contains(&frames), "frames = {frames}");

        // Keep ticking and calling the host hook; nothing more may happen
        for _ in 0..30 {
            tick(&mut state, &Frame::new(clock.monotonic_ms(), clock.wall_ms()));
            clock.advance(FRAME_MS);
        }
        assert!(!state.complete_spin(clock.wall_ms()));
        assert!(!state.complete_spin(clock.wall_ms()));

        let events = state.drain_events();
        assert_eq!(completions(&events), 1);
        assert_eq!(state.history().len(), 2);
        let captured = state.history().list().next().unwrap().captured_at;
        assert!(captured >= 1_700_000_003_990.0);
    }

    #[test]
    fn test_missing_winners_keeps_running() {
        let mut state = picker(&["A", "B"]);
        state.request_spin(1);
        state.pending.as_mut().unwrap().winners.clear();
        tick(&mut state, &Frame::at(0.0));
        assert!(!state.animation().overdue);
        for t in [10_000.0, 10_016.0, 10_032.0] {
            tick(&mut state, &Frame::at(t));
            assert!(state.animation().overdue);
        }
        assert_eq!(state.phase(), SpinPhase::Running);
        assert!(state.wants_frame());
        assert_eq!(completions(&state.drain_events()), 0);

        // A fresh spin clears the flag
        state.teardown();
        assert!(state.request_spin(1));
        assert!(!state.animation().overdue);
    }

    #[test]
    fn test_flicker_reads_live_pool() {
        let mut state = picker(&["A", "B"]);
        state.request_spin(1);
        // Swap the pool under the running spin (hosts must not, but the
        // animator always reads the current container)
        state.pool = crate::sim::EntryPool::from_labels(1, ["Only", "Others"]);
        tick(&mut state, &Frame::at(0.0));
        assert!(["Only", "Others"].contains(&state.display().label.as_str()));
    }

    #[test]
    fn test_teardown_stops_notifications() {
        let mut state = picker(&["A", "B", "C"]);
        state.request_spin(1);
        tick(&mut state, &Frame::at(0.0));
        tick(&mut state, &Frame::at(2000.0));
        state.teardown();

        tick(&mut state, &Frame::at(4000.0));
        tick(&mut state, &Frame::at(8000.0));
        assert_eq!(state.phase(), SpinPhase::Idle);
        assert_eq!(completions(&state.drain_events()), 0);
        assert!(state.history().is_empty());
        assert!(state.winners().is_empty());
    }

    #[test]
    fn test_teardown_drops_settle_pulse() {
        let mut state = picker(&["A", "B"]);
        state.request_spin(1);
        tick(&mut state, &Frame::at(0.0));
        tick(&mut state, &Frame::at(4000.0));
        state.teardown();
        assert!(!state.wants_frame());
        assert_eq!(state.scale(), 1.0);
        let display = state.display().clone();
        tick(&mut state, &Frame::at(9000.0));
        assert_eq!(state.display(), &display);
        // Already committed before teardown
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_history_integrity_two_spins() {
        let clock = ManualClock::new(0.0, 0.0);
        let mut state = picker(&["A", "B", "C", "D", "E"]);

        state.request_spin(1);
        run_to_settle(&mut state, &clock);
        state.dismiss();
        state.request_spin(3);
        run_to_settle(&mut state, &clock);

        let history = state.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history.batch_count(), 2);
        let batches: Vec<BatchId> = history.list().map(|r| r.batch_id).collect();
        // Newest batch first
        assert_eq!(batches[..3], [BatchId(2); 3]);
        assert_eq!(batches[3], BatchId(1));
    }

    #[test]
    fn test_respin_from_settled() {
        let clock = ManualClock::new(0.0, 0.0);
        let mut state = picker(&["A", "B", "C"]);
        state.request_spin(1);
        run_to_settle(&mut state, &clock);
        assert_eq!(state.winners().len(), 1);

        assert!(state.request_spin(2));
        assert_eq!(state.phase(), SpinPhase::Running);
        assert!(state.winners().is_empty());
        run_to_settle(&mut state, &clock);
        assert_eq!(state.winners().len(), 2);
        assert_eq!(completions(&state.drain_events()), 2);
    }

    #[test]
    fn test_remove_from_pool_keeps_history_snapshots() {
        let clock = ManualClock::new(0.0, 0.0);
        let mut state = picker(&["A", "B", "C", "D"]);
        state.request_spin(2);
        let winners: Vec<Entry> = state.pending.as_ref().unwrap().winners.clone();
        run_to_settle(&mut state, &clock);

        assert_eq!(state.remove_from_pool(), 2);
        assert_eq!(state.phase(), SpinPhase::Idle);
        assert!(state.winners().is_empty());
        assert_eq!(state.pool().len(), 2);
        for w in &winners {
            assert!(!state.pool().contains(&w.id));
            let record = state.history().list().find(|r| r.entry.id == w.id).unwrap();
            assert_eq!(record.entry.label, w.label);
            assert_eq!(record.entry.color, w.color);
        }
        // Remaining entries keep their order
        let kept: Vec<&str> = state.pool().entries().iter().map(|e| e.label.as_str()).collect();
        let mut expected: Vec<&str> = vec!["A", "B", "C", "D"];
        expected.retain(|l| winners.iter().all(|w| w.label != *l));
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let clock = ManualClock::new(0.0, 0.0);
        let mut state = picker(&["A", "B", "C"]);
        state.request_spin(1);
        run_to_settle(&mut state, &clock);

        state.dismiss();
        let phase = state.phase();
        let display = state.display().clone();
        let pool_len = state.pool().len();
        let history_len = state.history().len();

        state.dismiss();
        assert_eq!(state.phase(), phase);
        assert_eq!(state.phase(), SpinPhase::Idle);
        assert_eq!(state.display(), &display);
        assert_eq!(state.pool().len(), pool_len);
        assert_eq!(state.history().len(), history_len);
        assert!(state.winners().is_empty());
    }

    #[test]
    fn test_dismiss_ignored_while_running() {
        let mut state = picker(&["A", "B"]);
        state.request_spin(1);
        state.dismiss();
        assert_eq!(state.remove_from_pool(), 0);
        assert_eq!(state.phase(), SpinPhase::Running);
        assert_eq!(state.pool().len(), 2);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed draw the same winners and flicker alike
        let mut state1 = picker(&["A", "B", "C", "D", "E"]);
        let mut state2 = picker(&["A", "B", "C", "D", "E"]);
        state1.request_spin(2);
        state2.request_spin(2);

        let mut t = 0.0;
        while state1.phase() == SpinPhase::Running {
            tick(&mut state1, &Frame::at(t));
            tick(&mut state2, &Frame::at(t));
            assert_eq!(state1.display(), state2.display());
            t += FRAME_MS;
        }
        assert_eq!(state1.winners(), state2.winners());
    }

    #[derive(Debug, Clone)]
    enum Command {
        Spin(i64),
        Advance(f64),
        Dismiss,
        Remove,
        Complete,
        Teardown,
        Add,
    }

    fn command() -> impl Strategy<Value = Command> {
        prop_oneof![
            (-2i64..6).prop_map(Command::Spin),
            (0.0f64..1500.0).prop_map(Command::Advance),
            Just(Command::Dismiss),
            Just(Command::Remove),
            Just(Command::Complete),
            Just(Command::Teardown),
            Just(Command::Add),
        ]
    }

    proptest! {
        #[test]
        fn prop_state_machine_closure(
            seed in any::<u64>(),
            commands in proptest::collection::vec(command(), 1..60),
        ) {
            let mut state = PickerState::new(seed).with_labels(["A", "B", "C", "D"]);
            let mut now = 0.0;
            let mut started = 0usize;
            let mut completed = 0usize;
            let mut last_spin_start: Option<f64> = None;

            for cmd in commands {
                let before = state.phase();
                match cmd {
                    Command::Spin(n) => {
                        if state.request_spin(n) {
                            prop_assert_ne!(before, SpinPhase::Running);
                            last_spin_start = None;
                        }
                    }
                    Command::Advance(ms) => {
                        now += ms;
                        if before == SpinPhase::Running && last_spin_start.is_none() {
                            last_spin_start = Some(now);
                        }
                        tick(&mut state, &Frame::at(now));
                    }
                    Command::Dismiss => state.dismiss(),
                    Command::Remove => {
                        state.remove_from_pool();
                    }
                    Command::Complete => {
                        state.complete_spin(now);
                    }
                    Command::Teardown => state.teardown(),
                    Command::Add => {
                        state.add("Late");
                    }
                }

                let after = state.phase();
                // Settled is only reachable from Running
                if after == SpinPhase::Settled && before != SpinPhase::Settled {
                    prop_assert_eq!(before, SpinPhase::Running);
                    let start = last_spin_start.unwrap();
                    prop_assert!(now - start >= SPIN_DURATION_MS);
                }
                // Running only while a hidden winner set exists
                if after == SpinPhase::Running {
                    prop_assert!(state.pending.as_ref().is_some_and(|p| !p.winners.is_empty()));
                }

                for event in state.drain_events() {
                    match event {
                        PickerEvent::SpinStarted { winner_count, .. } => {
                            started += 1;
                            prop_assert!(winner_count >= 1);
                        }
                        PickerEvent::SpinComplete { winners, .. } => {
                            completed += 1;
                            prop_assert!(!winners.is_empty());
                        }
                        PickerEvent::SpinCancelled { .. } => {}
                    }
                }
                prop_assert!(completed <= started);
            }
        }
    }
}
