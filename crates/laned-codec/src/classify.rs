/// Where a command sits relative to a transaction.
///
/// The lane manager's pin table uses this to decide when to create and when
/// to remove a caller's lane pin: a `TransactionBegin` command pins the
/// caller to the lane it lands on, a `TransactionEnd` command releases that
/// pin, and `Other` commands are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `WATCH` or `MULTI`: opens (or extends the watch set of) a transaction.
    TransactionBegin,
    /// `EXEC` or `DISCARD`: closes a transaction.
    TransactionEnd,
    /// Anything else, including commands issued outside of a transaction.
    Other,
}

/// Classifies an outgoing command so the lane manager can maintain
/// transaction affinity.
///
/// A driver that already parses its own command representation should
/// implement this directly against that type instead of going through the
/// raw-byte fallback in this crate.
pub trait ClassifyCommand<Cmd: ?Sized> {
    fn classify(&self, command: &Cmd) -> CommandKind;
}
