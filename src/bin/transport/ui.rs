//! Front panel - transport readout, step row and keyboard control

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};

use pulse_transport::{
    engine::{GateDetector, MasterClock, StepSequencer},
    io::{ClockCommand, ClockReport, DetectorReport, SequencerCommand, SequencerReport},
    sequencing::Step,
    Handle,
};

const BPM_STEP: f64 = 2.0;

/// Control-side ends of the running graph
pub struct Panel {
    pub clock: Handle<MasterClock>,
    pub sequencer: Handle<StepSequencer>,
    pub gate: Handle<GateDetector>,
    /// Frames rendered so far, published by the audio callback
    pub frame: Arc<AtomicU64>,
    pub sample_rate: f32,
    pub steps: Vec<Step>,
    pub bpm: f64,
}

impl Panel {
    /// Audio-thread time of the last rendered frame.
    fn now(&self) -> f64 {
        self.frame.load(Ordering::Relaxed) as f64 / self.sample_rate as f64
    }
}

pub struct TransportUi {
    panel: Panel,
    beat: f64,
    bpm: f64,
    running: bool,
    step: Option<usize>,
    gate_on: bool,
    should_quit: bool,
}

impl TransportUi {
    pub fn new(panel: Panel) -> Self {
        let bpm = panel.bpm;
        Self {
            panel,
            beat: 0.0,
            bpm,
            running: true,
            step: None,
            gate_on: false,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_reports();
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    fn poll_reports(&mut self) {
        for ClockReport::Tick {
            beat, bpm, running, ..
        } in self.panel.clock.drain()
        {
            self.beat = beat;
            self.bpm = bpm;
            self.running = running;
        }
        for SequencerReport::Step { current_step } in self.panel.sequencer.drain() {
            self.step = Some(current_step);
        }
        for report in self.panel.gate.drain() {
            match report {
                DetectorReport::GateOn { .. } => self.gate_on = true,
                DetectorReport::GateOff { .. } => self.gate_on = false,
                _ => {}
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let time = self.panel.now();
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                let command = if self.running {
                    ClockCommand::Stop { time }
                } else {
                    ClockCommand::Start {
                        time,
                        beat: self.beat,
                    }
                };
                self.panel.clock.send_or_log(command);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let bpm = self.bpm + BPM_STEP;
                self.panel.clock.send_or_log(ClockCommand::Tempo { time, bpm });
            }
            KeyCode::Char('-') => {
                let bpm = self.bpm - BPM_STEP;
                self.panel.clock.send_or_log(ClockCommand::Tempo { time, bpm });
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.panel
                    .clock
                    .send_or_log(ClockCommand::Seek { time, beat: 0.0 });
                self.panel.sequencer.send_or_log(SequencerCommand::Reset);
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Length(4), // Steps
                Constraint::Min(0),
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        self.render_transport(frame, chunks[0]);
        self.render_steps(frame, chunks[1]);

        let help = Paragraph::new(" [Q] Quit  [Space] Start/Stop  [+/-] Tempo  [R] Reset")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }

    fn render_transport(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" transport ").borders(Borders::ALL);

        let bar = (self.beat / 4.0).floor() as i64 + 1;
        let beat_in_bar = self.beat.rem_euclid(4.0).floor() as i64 + 1;
        let (symbol, state) = if self.running {
            ("▶", "Running")
        } else {
            ("⏸", "Stopped")
        };

        let line = Line::from(vec![
            Span::styled(
                format!(" BPM: {:.1}  ", self.bpm),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("{} {}  ", symbol, state),
                Style::default().fg(if self.running {
                    Color::Green
                } else {
                    Color::Yellow
                }),
            ),
            Span::styled(
                format!("Bar {} | Beat {}  ", bar, beat_in_bar),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("{:.3}  ", self.beat),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                "● gate",
                Style::default().fg(if self.gate_on {
                    Color::Red
                } else {
                    Color::DarkGray
                }),
            ),
        ]);

        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_steps(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" steps ").borders(Borders::ALL);

        let cells: Vec<Span> = self
            .panel
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let glyph = match (step.active, step.accent, step.slide) {
                    (false, _, _) => " · ",
                    (true, true, _) => " ▲ ",
                    (true, false, true) => " ~ ",
                    (true, false, false) => " ■ ",
                };
                let mut style = Style::default().fg(if step.active {
                    Color::White
                } else {
                    Color::DarkGray
                });
                if self.step == Some(i) {
                    style = style.bg(Color::Blue).add_modifier(Modifier::BOLD);
                }
                Span::styled(glyph, style)
            })
            .collect();

        frame.render_widget(Paragraph::new(Line::from(cells)).block(block), area);
    }
}
