use log::debug;
use nalgebra::Point3;
use std::fmt;

/// A recording keeps at most this many log lines, dropping the oldest half
/// when full.
const MAX_LOG_LINES: usize = 1024;

/// Debug output for one kart's AI: shapes to draw and values to show.
///
/// Disabled by default, in which case everything sent to it is dropped. The
/// host decides what to do with a recording one (draw it, dump it in a test).
#[derive(Default)]
pub struct Eeg {
    enabled: bool,
    draw_list: Vec<Drawable>,
    log: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Drawable {
    Crosshair(Point3<f32>),
    Line(Point3<f32>, Point3<f32>),
    Print(String),
}

impl Drawable {
    pub fn print(label: &str, value: impl fmt::Debug) -> Self {
        Drawable::Print(format!("{}: {:?}", label, value))
    }
}

impl Eeg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recording() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Called at the start of each tick. Drawings only live for one tick, log
    /// lines accumulate up to `MAX_LOG_LINES`.
    pub fn begin_tick(&mut self) {
        self.draw_list.clear();
    }

    pub fn draw(&mut self, drawable: Drawable) {
        if self.enabled {
            self.draw_list.push(drawable);
        }
    }

    pub fn print_value(&mut self, label: &str, value: impl fmt::Debug) {
        if self.enabled {
            self.draw_list.push(Drawable::print(label, value));
        }
    }

    /// Log a decision. Always forwarded to the `log` facade.
    pub fn log(&mut self, source: &str, message: impl fmt::Display) {
        debug!("{}: {}", source, message);
        if self.enabled {
            if self.log.len() >= MAX_LOG_LINES {
                self.log.drain(..MAX_LOG_LINES / 2);
            }
            self.log.push(format!("{}: {}", source, message));
        }
    }

    pub fn draw_list(&self) -> &[Drawable] {
        &self.draw_list
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }
}
