//! Sample-accurate dispatch of a time-sorted event list.
//!
//! Event times are pattern-relative seconds. While playing, an event at
//! pattern time `t` is due at `origin + t * scale`, where `origin` is the
//! absolute time of pattern time 0. Each quantum emits every event due before
//! the quantum ends, so delivery leads the due time by at most one quantum
//! and never lags it.
//!
//! Payloads are cloned into reports on the render thread, so they should be
//! `Copy` or reference counted. A replaced event list is handed back to the
//! control thread in a `retired` report instead of being freed here.

use arrayvec::ArrayVec;

use super::{Processor, ProcessorKind, RenderCtx};
use crate::{
    config::EngineConfig,
    io::{ReportSink, SchedulerCommand, SchedulerReport},
    sequencing::EventList,
};

/// Replaced lists held until the report queue takes them.
const RETIRED_SLOTS: usize = 4;

pub struct EventScheduler<E> {
    events: EventList<E>,
    retired: ArrayVec<EventList<E>, RETIRED_SLOTS>,
    cursor: usize,
    playing: bool,
    origin: f64,
    scale: f64,
}

impl<E> EventScheduler<E> {
    pub fn new() -> Self {
        Self {
            events: EventList::empty(),
            retired: ArrayVec::new(),
            cursor: 0,
            playing: false,
            origin: 0.0,
            scale: 1.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Index of the next event to emit.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn events(&self) -> &EventList<E> {
        &self.events
    }

    /// Pattern position heard at absolute time `now`, while playing.
    pub fn position_at(&self, now: f64) -> f64 {
        ((now - self.origin) / self.scale).max(0.0)
    }

    /// Hand replaced lists back through `reports`. Whatever does not fit
    /// stays queued for the next quantum.
    fn return_retired<S: ReportSink<SchedulerReport<E>>>(&mut self, reports: &mut S) {
        while let Some(list) = self.retired.pop() {
            match reports.try_emit(SchedulerReport::Retired { list }) {
                Ok(()) => {}
                Err(SchedulerReport::Retired { list }) => {
                    let _ = self.retired.try_push(list);
                    break;
                }
                Err(_) => break,
            }
        }
    }

    fn clamp_position(&self, position: f64) -> f64 {
        if position.is_finite() {
            position.clamp(0.0, self.events.duration())
        } else {
            0.0
        }
    }
}

impl<E> Default for EventScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Send + 'static> Processor for EventScheduler<E> {
    type Command = SchedulerCommand<E>;
    type Report = SchedulerReport<E>;

    const KIND: ProcessorKind = ProcessorKind::EventScheduler;
    const INPUTS: usize = 0;
    const OUTPUTS: usize = 0;

    fn from_config(_config: &EngineConfig) -> Self {
        Self::new()
    }

    fn handle_command(&mut self, command: SchedulerCommand<E>, ctx: &RenderCtx) {
        let now = ctx.current_time();
        match command {
            SchedulerCommand::Events { list } => {
                let old = std::mem::replace(&mut self.events, list);
                self.cursor = 0;
                if !old.is_empty() {
                    // Only a burst of replacements inside one quantum can
                    // overflow the slots; the overflow is freed in place.
                    let _ = self.retired.try_push(old);
                }
            }
            SchedulerCommand::Scale { value } => {
                if !value.is_finite() || value <= 0.0 {
                    return;
                }
                if self.playing {
                    let position = self.position_at(now);
                    self.origin = now - position * value;
                }
                self.scale = value;
            }
            SchedulerCommand::Play {
                start_time,
                position,
                scale,
            } => {
                if !start_time.is_finite() {
                    return;
                }
                if scale.is_finite() && scale > 0.0 {
                    self.scale = scale;
                }
                let position = self.clamp_position(position);
                self.cursor = self.events.index_at(position);
                self.origin = start_time;
                self.playing = true;
            }
            SchedulerCommand::Stop => {
                self.playing = false;
            }
            SchedulerCommand::Seek { position } => {
                let position = self.clamp_position(position);
                self.cursor = self.events.index_at(position);
            }
            SchedulerCommand::Reset => {
                self.cursor = 0;
                self.playing = false;
                self.origin = 0.0;
                self.scale = 1.0;
            }
        }
    }

    fn process<S: ReportSink<SchedulerReport<E>>>(
        &mut self,
        ctx: &RenderCtx,
        _inputs: &[&[f32]],
        _outputs: &mut [&mut [f32]],
        reports: &mut S,
    ) {
        self.return_retired(reports);
        if !self.playing {
            return;
        }

        let quantum_end = ctx.end_time();
        while let Some(event) = self.events.get(self.cursor) {
            let due = self.origin + event.time * self.scale;
            if due > quantum_end {
                break;
            }
            reports.emit(SchedulerReport::Event {
                event: event.payload.clone(),
                time: due,
            });
            self.cursor += 1;
        }

        if self.cursor >= self.events.len() {
            self.playing = false;
            reports.emit(SchedulerReport::End);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::TimedEvent;

    const SAMPLE_RATE: f32 = 1_000.0;
    const QUANTUM: usize = 128;

    fn list(times: &[f64]) -> EventList<u32> {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| TimedEvent::new(t, i as u32))
            .collect()
    }

    fn loaded(times: &[f64]) -> (EventScheduler<u32>, RenderCtx) {
        let mut scheduler = EventScheduler::new();
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, QUANTUM);
        scheduler.handle_command(SchedulerCommand::Events { list: list(times) }, &ctx);
        (scheduler, ctx)
    }

    /// Render quanta until the scheduler stops, collecting each report with
    /// the start time of the quantum that produced it.
    fn drain(
        scheduler: &mut EventScheduler<u32>,
        mut ctx: RenderCtx,
    ) -> Vec<(f64, SchedulerReport<u32>)> {
        let mut out = Vec::new();
        for _ in 0..1_000 {
            let mut reports = Vec::new();
            scheduler.process(&ctx, &[], &mut [], &mut reports);
            out.extend(reports.into_iter().map(|r| (ctx.current_time(), r)));
            if !scheduler.is_playing() {
                break;
            }
            ctx = ctx.next();
        }
        out
    }

    fn event_times(reports: &[(f64, SchedulerReport<u32>)]) -> Vec<f64> {
        reports
            .iter()
            .filter_map(|(_, r)| match r {
                SchedulerReport::Event { time, .. } => Some(*time),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn emits_each_event_once_then_end() {
        let (mut scheduler, ctx) = loaded(&[0.0, 0.1, 0.25, 0.5, 0.9]);
        scheduler.handle_command(
            SchedulerCommand::Play {
                start_time: 0.0,
                position: 0.0,
                scale: 1.0,
            },
            &ctx,
        );

        let reports = drain(&mut scheduler, ctx);
        let quantum = QUANTUM as f64 / SAMPLE_RATE as f64;

        let mut payloads = Vec::new();
        for (emitted_at, report) in &reports[..5] {
            let SchedulerReport::Event { event, time } = report else {
                panic!("expected event, got {report:?}");
            };
            assert!(*time >= *emitted_at && *time <= *emitted_at + quantum);
            payloads.push(*event);
        }
        assert_eq!(payloads, vec![0, 1, 2, 3, 4]);
        assert_eq!(reports.len(), 6);
        assert_eq!(reports[5].1, SchedulerReport::End);
    }

    #[test]
    fn play_offsets_and_scales_event_times() {
        let (mut scheduler, ctx) = loaded(&[0.0, 0.5, 1.0]);
        scheduler.handle_command(
            SchedulerCommand::Play {
                start_time: 2.0,
                position: 0.5,
                scale: 2.0,
            },
            &ctx,
        );
        assert_eq!(scheduler.cursor(), 1);

        // origin is pattern time 0, so 0.5 lands at 2 + 0.5 * 2
        let times = event_times(&drain(&mut scheduler, ctx));
        assert_eq!(times, vec![3.0, 4.0]);
    }

    #[test]
    fn stop_keeps_cursor() {
        let (mut scheduler, ctx) = loaded(&[0.0, 0.2, 0.4]);
        scheduler.handle_command(
            SchedulerCommand::Play {
                start_time: 0.0,
                position: 0.0,
                scale: 1.0,
            },
            &ctx,
        );
        let mut reports = Vec::new();
        scheduler.process(&ctx, &[], &mut [], &mut reports);
        assert_eq!(scheduler.cursor(), 1);

        scheduler.handle_command(SchedulerCommand::Stop, &ctx.next());
        scheduler.process(&ctx.next(), &[], &mut [], &mut reports);
        assert_eq!(reports.len(), 1);
        assert_eq!(scheduler.cursor(), 1);
    }

    #[test]
    fn seek_while_playing_only_moves_cursor() {
        let (mut scheduler, ctx) = loaded(&[0.0, 1.0, 2.0, 3.0]);
        scheduler.handle_command(
            SchedulerCommand::Play {
                start_time: 0.0,
                position: 0.0,
                scale: 1.0,
            },
            &ctx,
        );
        let ctx = RenderCtx::new(SAMPLE_RATE, 500, QUANTUM);
        scheduler.handle_command(SchedulerCommand::Seek { position: 2.0 }, &ctx);
        assert_eq!(scheduler.cursor(), 2);
        assert!(scheduler.is_playing());

        let times = event_times(&drain(&mut scheduler, ctx));
        assert_eq!(times, vec![2.0, 3.0]);
    }

    #[test]
    fn seek_is_clamped_to_duration() {
        let (mut scheduler, ctx) = loaded(&[0.0, 1.0]);
        scheduler.handle_command(SchedulerCommand::Seek { position: 99.0 }, &ctx);
        assert_eq!(scheduler.cursor(), 1);
        scheduler.handle_command(SchedulerCommand::Seek { position: -3.0 }, &ctx);
        assert_eq!(scheduler.cursor(), 0);
        assert!(!scheduler.is_playing());
    }

    #[test]
    fn scale_change_keeps_position_continuous() {
        let (mut scheduler, ctx) = loaded(&[0.0, 2.0]);
        scheduler.handle_command(
            SchedulerCommand::Play {
                start_time: 0.0,
                position: 0.0,
                scale: 1.0,
            },
            &ctx,
        );
        // at 1 s the pattern is at 1.0; doubling the scale puts 2.0 at 3 s
        let ctx = RenderCtx::new(SAMPLE_RATE, 1_000, QUANTUM);
        scheduler.handle_command(SchedulerCommand::Scale { value: 2.0 }, &ctx);
        assert!((scheduler.position_at(1.0) - 1.0).abs() < 1e-12);

        scheduler.handle_command(SchedulerCommand::Scale { value: f64::NAN }, &ctx);
        assert_eq!(scheduler.scale(), 2.0);

        let times = event_times(&drain(&mut scheduler, ctx));
        // the never-rendered first event comes out at once, already late
        assert_eq!(times.last().copied(), Some(3.0));
    }

    #[test]
    fn empty_list_ends_immediately() {
        let (mut scheduler, ctx) = loaded(&[]);
        scheduler.handle_command(
            SchedulerCommand::Play {
                start_time: 0.0,
                position: 0.0,
                scale: 1.0,
            },
            &ctx,
        );
        let reports = drain(&mut scheduler, ctx);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].1, SchedulerReport::End);
    }

    #[test]
    fn reset_keeps_events() {
        let (mut scheduler, ctx) = loaded(&[0.0, 1.0]);
        scheduler.handle_command(
            SchedulerCommand::Play {
                start_time: 0.0,
                position: 1.0,
                scale: 3.0,
            },
            &ctx,
        );
        scheduler.handle_command(SchedulerCommand::Reset, &ctx);
        assert_eq!(scheduler.cursor(), 0);
        assert_eq!(scheduler.scale(), 1.0);
        assert!(!scheduler.is_playing());
        assert_eq!(scheduler.events().len(), 2);
    }

    #[test]
    fn replaced_list_is_handed_back() {
        let (mut scheduler, ctx) = loaded(&[0.0, 1.0]);
        scheduler.handle_command(SchedulerCommand::Events { list: list(&[5.0]) }, &ctx);
        assert_eq!(scheduler.events().len(), 1);

        let mut reports = Vec::new();
        scheduler.process(&ctx, &[], &mut [], &mut reports);
        assert_eq!(
            reports,
            vec![SchedulerReport::Retired {
                list: list(&[0.0, 1.0])
            }]
        );

        reports.clear();
        scheduler.process(&ctx.next(), &[], &mut [], &mut reports);
        assert!(reports.is_empty());
    }

    struct FullQueue;

    impl ReportSink<SchedulerReport<u32>> for FullQueue {
        fn emit(&mut self, _report: SchedulerReport<u32>) {}

        fn try_emit(
            &mut self,
            report: SchedulerReport<u32>,
        ) -> Result<(), SchedulerReport<u32>> {
            Err(report)
        }
    }

    #[test]
    fn retired_list_waits_for_queue_space() {
        let (mut scheduler, ctx) = loaded(&[0.0]);
        scheduler.handle_command(SchedulerCommand::Events { list: list(&[1.0]) }, &ctx);

        scheduler.process(&ctx, &[], &mut [], &mut FullQueue);

        let mut reports = Vec::new();
        scheduler.process(&ctx.next(), &[], &mut [], &mut reports);
        assert_eq!(reports, vec![SchedulerReport::Retired { list: list(&[0.0]) }]);
    }
}
