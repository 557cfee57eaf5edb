use crate::areas::signals::SignalMonitor;
use crate::areas::workspace::Workspace;
use crate::artifacts::color::ColorContext;
use crate::artifacts::options::DiffOptions;
use std::cell::{Cell, RefCell, RefMut};
use std::io::{self, Write};

/// One comparison run: the options, the output sink and the terminal state
/// shared by every file compared in the run.
pub struct Session {
    options: DiffOptions,
    writer: RefCell<Box<dyn Write>>,
    workspace: Workspace,
    colors_enabled: bool,
    last_color: Cell<ColorContext>,
    signals: SignalMonitor,
}

impl Session {
    pub fn new(options: DiffOptions, writer: Box<dyn Write>) -> Self {
        Session {
            options,
            writer: RefCell::new(writer),
            workspace: Workspace::default(),
            colors_enabled: false,
            last_color: Cell::new(ColorContext::Reset),
            signals: SignalMonitor::inactive(),
        }
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colors_enabled = enabled;
        self
    }

    /// Record terminating and stop signals instead of dying mid escape
    /// sequence. Only worth doing when colors go to a terminal.
    pub fn with_signal_handlers(mut self) -> Self {
        self.signals = SignalMonitor::install();
        self
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Switch the output to the color of `context`.
    ///
    /// Nothing is written when colors are off or the context is already
    /// active.
    pub fn set_color_context(&self, context: ColorContext) -> io::Result<()> {
        if context != ColorContext::Reset {
            self.process_signals()?;
        }

        if self.colors_enabled && self.last_color.get() != context {
            self.writer()
                .write_all(&self.options.palette.sequence(context))?;
            self.last_color.set(context);
        }

        Ok(())
    }

    /// Act on signals recorded since the last poll, leaving the terminal in
    /// its default color first.
    pub fn process_signals(&self) -> io::Result<()> {
        while let Some(signal) = self.signals.take_pending() {
            tracing::debug!(?signal, "delivering deferred signal");
            self.set_color_context(ColorContext::Reset)?;
            self.writer().flush()?;
            signal.deliver();
        }

        Ok(())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.writer().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SharedBuffer;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn buffer() -> SharedBuffer {
        SharedBuffer::default()
    }

    #[rstest]
    fn colors_off_writes_nothing(buffer: SharedBuffer) {
        let session = Session::new(DiffOptions::default(), Box::new(buffer.clone()));

        session.set_color_context(ColorContext::Add).unwrap();
        session.set_color_context(ColorContext::Reset).unwrap();

        assert_eq!(buffer.contents(), "");
    }

    #[rstest]
    fn repeated_contexts_are_emitted_once(buffer: SharedBuffer) {
        let session = Session::new(DiffOptions::default(), Box::new(buffer.clone())).with_colors(true);

        session.set_color_context(ColorContext::Reset).unwrap();
        session.set_color_context(ColorContext::Delete).unwrap();
        session.set_color_context(ColorContext::Delete).unwrap();
        session.set_color_context(ColorContext::Reset).unwrap();

        assert_eq!(buffer.contents(), "\x1b[31m\x1b[0m");
    }
}
