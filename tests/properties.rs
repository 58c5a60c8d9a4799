//! Property-based tests for the timing processors.
//!
//! Uses proptest to check the invariants that must hold for any tempo map,
//! pattern, pulse spacing or event list, not just the hand-picked cases in
//! the unit tests.

use proptest::prelude::*;
use pulse_transport::{
    engine::{EventScheduler, MasterClock, PulseDetector, StepSequencer},
    io::{ClockCommand, DetectorReport, SchedulerCommand, SchedulerReport, SequencerCommand},
    sequencing::{PatternUpdate, Step, TempoMap, TimedEvent},
    EngineConfig, Processor, RenderCtx,
};

const SAMPLE_RATE: f32 = 1_000.0;
const QUANTUM: usize = 128;

fn config() -> EngineConfig {
    EngineConfig::default().with_sample_rate(SAMPLE_RATE)
}

/// Render a sequencer over `pulse`, returning the gate output and the
/// applied step indices.
fn render_sequencer(seq: &mut StepSequencer, start: u64, pulse: &[f32]) -> (Vec<f32>, Vec<usize>) {
    let mut gate = Vec::with_capacity(pulse.len());
    let mut reports = Vec::new();
    for (k, chunk) in pulse.chunks(QUANTUM).enumerate() {
        let ctx = RenderCtx::new(SAMPLE_RATE, start + (k * QUANTUM) as u64, chunk.len());
        let mut cv = vec![0.0f32; chunk.len()];
        let mut g = vec![0.0f32; chunk.len()];
        let mut accent = vec![0.0f32; chunk.len()];
        seq.process(
            &ctx,
            &[chunk],
            &mut [cv.as_mut_slice(), g.as_mut_slice(), accent.as_mut_slice()],
            &mut reports,
        );
        gate.extend(g);
    }
    let steps = reports
        .into_iter()
        .map(|pulse_transport::io::SequencerReport::Step { current_step }| current_step)
        .collect();
    (gate, steps)
}

fn pulses_from_gaps(gaps: &[usize]) -> (Vec<f32>, Vec<usize>) {
    let mut at = Vec::with_capacity(gaps.len() + 1);
    let mut n = 0;
    at.push(0);
    for &gap in gaps {
        n += gap;
        at.push(n);
    }
    let mut signal = vec![0.0f32; n + 1];
    for &i in &at {
        signal[i] = 1.0;
    }
    (signal, at)
}

fn rising_edges(signal: &[f32]) -> Vec<usize> {
    let mut last = 0.0;
    let mut edges = Vec::new();
    for (i, &x) in signal.iter().enumerate() {
        if x >= 0.5 && last < 0.5 {
            edges.push(i);
        }
        last = x;
    }
    edges
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Position never runs backwards while the transport runs.
    #[test]
    fn beats_are_monotonic_while_running(
        changes in prop::collection::vec((0.0f64..60.0, 1.0f64..999.0), 0..40),
        mut times in prop::collection::vec(0.0f64..120.0, 2..20),
    ) {
        let mut clock = MasterClock::from_config(&config());
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, QUANTUM);
        clock.handle_command(ClockCommand::Start { time: 0.0, beat: 0.0 }, &ctx);
        for (time, bpm) in changes {
            clock.handle_command(ClockCommand::ScheduleTempo { time, bpm }, &ctx);
        }

        times.sort_by(f64::total_cmp);
        let beats: Vec<f64> = times.iter().map(|&t| clock.beat_at(t)).collect();
        for pair in beats.windows(2) {
            prop_assert!(pair[1] >= pair[0], "beat went backwards: {:?}", pair);
        }

        let ctx = RenderCtx::new(SAMPLE_RATE, 0, QUANTUM);
        clock.handle_command(ClockCommand::Stop { time: 10.0 }, &ctx);
        let frozen = clock.beat_at(10.0);
        for &t in &times {
            prop_assert_eq!(clock.beat_at(t), frozen);
        }
    }

    /// Tempo commands dated in the past cannot rewrite what was already
    /// played, however they interleave with rendering.
    #[test]
    fn tempo_commands_never_rewind_running_beat(
        commands in prop::collection::vec(
            (0usize..8, -5.0f64..30.0, 1.0f64..999.0, any::<bool>()),
            1..40,
        ),
    ) {
        let mut clock = MasterClock::from_config(&config());
        let mut ctx = RenderCtx::new(SAMPLE_RATE, 0, QUANTUM);
        clock.handle_command(ClockCommand::Start { time: 0.0, beat: 0.0 }, &ctx);

        let mut last = clock.beat_at(ctx.current_time());
        let mut reports = Vec::new();
        for (quanta, time, bpm, immediate) in commands {
            for _ in 0..quanta {
                clock.process(&ctx, &[], &mut [], &mut reports);
                ctx = ctx.next();
            }
            let now = ctx.current_time();
            let before = clock.beat_at(now);
            prop_assert!(before >= last - 1e-9, "beat went backwards: {} -> {}", last, before);

            let command = if immediate {
                ClockCommand::Tempo { time, bpm }
            } else {
                ClockCommand::ScheduleTempo { time, bpm }
            };
            clock.handle_command(command, &ctx);

            let after = clock.beat_at(now);
            prop_assert!((after - before).abs() < 1e-9, "beat jumped: {} -> {}", before, after);
            last = after;
        }
    }

    /// Integrating over a split interval gives the same beats as one span.
    #[test]
    fn tempo_integration_is_additive(
        changes in prop::collection::vec((0.0f64..60.0, 1.0f64..999.0), 0..40),
        a in 0.0f64..60.0,
        b in 0.0f64..60.0,
    ) {
        let mut map = TempoMap::new(120.0);
        for (time, bpm) in changes {
            map.insert(time, bpm);
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mid = (lo + hi) / 2.0;
        let whole = map.beats_between(lo, hi);
        let split = map.beats_between(lo, mid) + map.beats_between(mid, hi);
        prop_assert!((whole - split).abs() < 1e-6 * whole.max(1.0));
    }

    /// After a reset the very next completed step is step 0.
    #[test]
    fn reset_always_lands_on_step_zero(
        division in prop::sample::select(vec![1, 2, 3, 4, 6, 8, 12, 16, 24, 32]),
        before in 0usize..40,
        length in 1usize..=32,
    ) {
        let mut seq = StepSequencer::from_config(&config());
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, QUANTUM);
        let update = PatternUpdate::new(vec![Step::on(1.0); length]).division(division);
        seq.handle_command(SequencerCommand::state(update), &ctx);

        let gaps = vec![20; before];
        let (signal, _) = pulses_from_gaps(&gaps);
        render_sequencer(&mut seq, 0, &signal);

        let start = signal.len() as u64 + 100;
        seq.handle_command(SequencerCommand::Reset, &RenderCtx::new(SAMPLE_RATE, start, QUANTUM));
        let mut after = vec![0.0f32; 20];
        after[5] = 1.0;
        let (_, steps) = render_sequencer(&mut seq, start, &after);

        // the announcement, then the step the pulse completed
        prop_assert!(steps.len() >= 2);
        prop_assert_eq!(steps[0], 0);
        prop_assert_eq!(steps[1], 0);
    }

    /// Without swing every step lands exactly on its triggering pulse.
    #[test]
    fn zero_swing_steps_land_on_pulses(gaps in prop::collection::vec(20usize..40, 100..130)) {
        let steps = vec![Step::on(1.0).with_length(10.0); 16];
        let mut seq = StepSequencer::from_config(&config());
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, QUANTUM);
        seq.handle_command(
            SequencerCommand::state(PatternUpdate::new(steps).division(16).swing(0.0)),
            &ctx,
        );

        let (signal, at) = pulses_from_gaps(&gaps);
        let (gate, applied) = render_sequencer(&mut seq, 0, &signal);
        prop_assert_eq!(applied.len(), at.len());
        prop_assert_eq!(rising_edges(&gate), at);
    }

    /// Gate length follows the measured interval, not the nominal one.
    #[test]
    fn gate_length_tracks_measured_interval(
        interval in 50usize..500,
        pct in 10.0f32..=100.0,
    ) {
        let steps = vec![Step::on(1.0).with_length(pct); 2];
        let mut seq = StepSequencer::from_config(&config());
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, QUANTUM);
        seq.handle_command(SequencerCommand::state(PatternUpdate::new(steps).division(16)), &ctx);

        let (signal, _) = pulses_from_gaps(&[interval, interval]);
        let (gate, _) = render_sequencer(&mut seq, 0, &signal);

        let high = gate[interval..2 * interval].iter().filter(|&&g| g == 1.0).count() as i64;
        let expected = (interval as f64 * pct as f64 / 100.0).round() as i64;
        prop_assert!((high - expected).abs() <= 1, "high {} expected {}", high, expected);
    }

    /// Strictly increasing events come out once each, in order, never late,
    /// followed by exactly one end.
    #[test]
    fn scheduler_round_trip(mut gaps in prop::collection::vec(0.001f64..0.3, 1..50)) {
        let mut t = 0.0;
        for gap in gaps.iter_mut() {
            t += *gap;
            *gap = t;
        }
        let list = gaps.iter().enumerate().map(|(i, &t)| TimedEvent::new(t, i)).collect();

        let mut scheduler = EventScheduler::<usize>::from_config(&config());
        let mut ctx = RenderCtx::new(SAMPLE_RATE, 0, QUANTUM);
        scheduler.handle_command(SchedulerCommand::Events { list }, &ctx);
        scheduler.handle_command(
            SchedulerCommand::Play { start_time: 0.0, position: 0.0, scale: 1.0 },
            &ctx,
        );

        let mut seen = Vec::new();
        let mut ends = 0;
        let quantum = QUANTUM as f64 / SAMPLE_RATE as f64;
        for _ in 0..200 {
            let mut reports = Vec::new();
            scheduler.process(&ctx, &[], &mut [], &mut reports);
            for report in reports {
                match report {
                    SchedulerReport::Event { event, time } => {
                        prop_assert_eq!(ends, 0);
                        prop_assert!(time <= ctx.end_time());
                        prop_assert!(time >= ctx.current_time() - 1e-9);
                        prop_assert!(ctx.end_time() - time <= quantum + 1e-9);
                        seen.push(event);
                    }
                    SchedulerReport::End => ends += 1,
                    SchedulerReport::Retired { .. } => {}
                }
            }
            ctx = ctx.next();
        }

        prop_assert_eq!(seen, (0..gaps.len()).collect::<Vec<_>>());
        prop_assert_eq!(ends, 1);
    }

    /// A crossing followed by chatter inside the cooldown is one pulse.
    #[test]
    fn pulse_detector_rejects_chatter(
        k in 0usize..200,
        chatter in prop::collection::vec(0.3f32..0.7, 0..31),
    ) {
        let mut detector = PulseDetector::from_config(&config());
        let mut signal = vec![0.0f32; 300];
        signal[k] = 1.0;
        for (i, &x) in chatter.iter().enumerate() {
            signal[k + 1 + i] = x;
        }

        let ctx = RenderCtx::new(SAMPLE_RATE, 0, signal.len());
        let mut reports = Vec::new();
        detector.process(&ctx, &[signal.as_slice()], &mut [], &mut reports);
        prop_assert_eq!(reports, vec![DetectorReport::Pulse { time: ctx.time_at(k) }]);
    }
}
