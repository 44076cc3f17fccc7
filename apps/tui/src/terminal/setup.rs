use color_eyre::Result;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Write};

/// Put the terminal into raw mode on the alternate screen. Any step that
/// fails undoes the ones before it.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    tracing::debug!(width, height, "setting up terminal");

    if let Err(e) = enable_raw_mode() {
        return Err(color_eyre::eyre::eyre!("Failed to enable raw mode: {e}"));
    }

    let mut stdout = stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(color_eyre::eyre::eyre!(
            "Failed to enter alternate screen: {e}"
        ));
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(term) => term,
        Err(e) => {
            let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            return Err(color_eyre::eyre::eyre!("Failed to create terminal: {e}"));
        }
    };

    // Not fatal
    if let Err(error) = terminal.clear() {
        tracing::warn!(%error, "failed to clear terminal");
    }
    if let Err(error) = execute!(std::io::stdout(), cursor::Hide) {
        tracing::warn!(%error, "failed to hide cursor");
    }

    tracing::info!("terminal ready");
    Ok(terminal)
}

/// Restore the terminal, undoing only what was set up.
pub fn cleanup_terminal_state(raw_mode: bool, alternate_screen: bool) {
    let mut stdout_handle = stdout();

    if let Err(error) = execute!(stdout_handle, cursor::Show) {
        tracing::warn!(%error, "failed to show cursor");
    }

    if alternate_screen {
        if let Err(error) = execute!(stdout_handle, LeaveAlternateScreen) {
            tracing::warn!(%error, "failed to leave alternate screen");
        }
    }

    if raw_mode {
        if let Err(error) = disable_raw_mode() {
            tracing::warn!(%error, "failed to disable raw mode");
        }
    }

    let _ = execute!(stdout_handle, cursor::MoveToNextLine(1));
    let _ = stdout_handle.flush();

    tracing::debug!("terminal restored");
}
