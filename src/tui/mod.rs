mod charts;

use crate::motion::{MotionAnalysis, Trajectory};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};

/// Show the distance-over-time chart until the user quits.
pub async fn show_motion(analysis: MotionAnalysis, trajectory: Trajectory) -> Result<()> {
    // The chart runs on a dedicated thread to keep blocking terminal I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(&analysis, &trajectory));

    match tokio::task::spawn_blocking(move || ui_handle.join()).await {
        Ok(Ok(res)) => res,
        Ok(Err(_)) => Err(anyhow::anyhow!("TUI thread panicked")),
        Err(e) => Err(anyhow::anyhow!("TUI join failed: {e}")),
    }
}

/// Run the chart loop on the current thread.
pub fn run_threaded(analysis: &MotionAnalysis, trajectory: &Trajectory) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let res = chart_loop(analysis, trajectory);

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn chart_loop(analysis: &MotionAnalysis, trajectory: &Trajectory) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    loop {
        terminal
            .draw(|f| charts::draw_trajectory(f.area(), f, analysis, trajectory))
            .context("draw chart")?;

        // Redraws on resize happen on the next poll timeout.
        if event::poll(Duration::from_millis(200)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q'))
                    | (_, KeyCode::Esc)
                    | (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}
