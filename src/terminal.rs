// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::{Cell, Frame};

/// Colors last sent to the terminal, so unchanged ones are not re-sent.
#[derive(Default)]
struct Pen {
    fg: Option<Option<Color>>,
    bg: Option<Option<Color>>,
}

impl Pen {
    fn apply(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if self.fg != Some(cell.fg) {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = Some(cell.bg);
        }
        Ok(())
    }
}

/// Crossterm writer owning raw mode and the alternate screen for its
/// lifetime.
pub struct Terminal {
    stdout: Stdout,
    /// What the screen currently shows, `None` before the first draw or
    /// after a size change.
    shown: Option<(u16, u16, Vec<Cell>)>,
    run_buf: String,
    row_dirty: Vec<Vec<usize>>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run_buf: String::with_capacity(64),
            row_dirty: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let total = frame.width as usize * frame.height as usize;
        let same_size =
            matches!(&self.shown, Some((w, h, _)) if *w == frame.width && *h == frame.height);
        let dirty_is_large = total > 0 && frame.dirty_indices().len() >= total / 3;

        if !same_size || frame.is_dirty_all() || dirty_is_large {
            self.redraw_all(frame, !same_size)?;
        } else {
            self.redraw_dirty(frame)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn redraw_all(&mut self, frame: &Frame, resized: bool) -> Result<()> {
        if resized {
            self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
        }
        let mut pen = Pen::default();
        let mut shown = Vec::with_capacity(frame.width as usize * frame.height as usize);
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.apply(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
                shown.push(cell);
            }
        }
        self.shown = Some((frame.width, frame.height, shown));
        Ok(())
    }

    /// Rewrites only changed cells, coalescing horizontal runs that share
    /// colors into one print.
    fn redraw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let Some((_, _, shown)) = self.shown.as_mut() else {
            return Ok(());
        };
        let width = frame.width as usize;

        self.row_dirty.resize_with(frame.height as usize, Vec::new);
        for &idx in frame.dirty_indices() {
            if let Some(row) = self.row_dirty.get_mut(idx / width) {
                row.push(idx);
            }
        }

        let mut pen = Pen::default();
        let mut cursor_at: Option<usize> = None;
        for (y, row) in self.row_dirty.iter_mut().enumerate() {
            if row.is_empty() {
                continue;
            }
            row.sort_unstable();

            let mut i = 0;
            while i < row.len() {
                let start = row[i];
                let first = frame.cell_at_index(start);
                if shown[start] == first {
                    i += 1;
                    continue;
                }

                self.run_buf.clear();
                self.run_buf.push(first.ch);
                shown[start] = first;
                let mut end = start;
                let mut j = i + 1;
                while j < row.len() && row[j] == end + 1 {
                    let next = frame.cell_at_index(row[j]);
                    if shown[row[j]] == next || next.fg != first.fg || next.bg != first.bg {
                        break;
                    }
                    self.run_buf.push(next.ch);
                    shown[row[j]] = next;
                    end = row[j];
                    j += 1;
                }

                if cursor_at != Some(start) {
                    self.stdout
                        .queue(cursor::MoveTo((start % width) as u16, y as u16))?;
                }
                pen.apply(&mut self.stdout, &first)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
                cursor_at = ((end + 1) % width != 0).then_some(end + 1);
                i = j;
            }
            row.clear();
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
