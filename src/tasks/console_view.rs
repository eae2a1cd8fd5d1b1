//! Terminal view attached to the controller

use std::{
    io::{BufRead, Write},
    sync::Arc,
    thread,
};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{debug, info, warn};

use crate::{
    services::Storage,
    tasks::ControllerHandle,
    view::{Display, Progress, Surface, TimerView},
};

const BAR_WIDTH: usize = 20;

/// A line typed into the console view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Toggle,
    Reset,
    Detach,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "" | "t" | "toggle" => Some(Self::Toggle),
            "r" | "reset" => Some(Self::Reset),
            "q" | "quit" => Some(Self::Detach),
            _ => None,
        }
    }
}

/// Surface that prints one status line per update
pub struct ConsoleSurface<W: Write> {
    out: W,
    running: bool,
    last: Option<Display>,
}

impl<W: Write> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            running: false,
            last: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self) {
        let Some(display) = &self.last else {
            return;
        };
        let line = format_line(display, self.running);
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            debug!("Console write failed: {}", e);
        }
    }
}

impl<W: Write> Surface for ConsoleSurface<W> {
    fn show(&mut self, display: &Display) {
        self.last = Some(display.clone());
        self.draw();
    }

    fn set_running(&mut self, running: bool) {
        if self.running != running {
            self.running = running;
            self.draw();
        }
    }
}

/// `⏸ 1:30 [███████████████·····] 🔄 2`
pub fn format_line(display: &Display, running: bool) -> String {
    let control = if running { "⏸" } else { "▶" };
    let mut line = format!("{} {} [{}]", control, display.readout, ring_bar(display.progress));
    if let Some(badge) = &display.cycle_badge {
        line.push(' ');
        line.push_str(badge);
    }
    line
}

fn ring_bar(progress: Progress) -> String {
    let remaining = match progress {
        Progress::Untouched => BAR_WIDTH,
        Progress::Cleared => 0,
        Progress::Sweep { degrees } => {
            let left = (360.0 - degrees) / 360.0 * BAR_WIDTH as f64;
            (left.round() as usize).min(BAR_WIDTH)
        }
    };
    format!("{}{}", "█".repeat(remaining), "·".repeat(BAR_WIDTH - remaining))
}

/// Run a console view until it is detached or stdin closes
pub async fn console_view_task(controller: ControllerHandle, storage: Arc<dyn Storage>) {
    info!("Attaching console view (enter: toggle, r: reset, q: detach)");

    let mut events = controller.subscribe();
    let mut view = TimerView::attach(controller, storage, ConsoleSurface::new(std::io::stdout()));
    let mut lines = spawn_stdin_reader();

    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(line) => match ConsoleCommand::parse(&line) {
                    Some(ConsoleCommand::Toggle) => view.toggle(),
                    Some(ConsoleCommand::Reset) => view.reset(),
                    Some(ConsoleCommand::Detach) => break,
                    None => warn!("Unknown command {:?} (enter: toggle, r: reset, q: detach)", line),
                },
                None => {
                    debug!("stdin closed");
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(event) => view.handle_event(event),
                Err(RecvError::Lagged(missed)) => {
                    debug!("Console view missed {} events, reloading", missed);
                    view.reload();
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("Console view detached, timer keeps running in the background");
}

/// Read stdin on a plain thread so a pending read never holds up runtime shutdown
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read console input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}
