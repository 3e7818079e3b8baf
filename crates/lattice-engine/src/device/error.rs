/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate the session.
    Fatal,
}

impl SurfaceErrorAction {
    /// Whether the frame can be dropped and the session continued.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, Self::Fatal)
    }
}
