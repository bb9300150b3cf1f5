use std::{fmt, ops::BitOr};

/// What the classifier concluded about one aspect of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TxKind {
    /// Funds are staked: metadata output plus a committed lock output.
    Lock = 1,
    /// One or more previously locked outputs are spent.
    Unlock = 1 << 1,
    /// Some structural or script check failed.
    Invalid = 1 << 2,
}

impl TxKind {
    pub const ALL: [TxKind; 3] = [TxKind::Lock, TxKind::Unlock, TxKind::Invalid];

    fn bit(self) -> u8 {
        self as u8
    }
}

/// A set of [`TxKind`]s.
///
/// `Invalid` may sit next to `Lock`/`Unlock` for diagnostics, but it always
/// wins: see [`TxKindSet::is_acceptable`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TxKindSet(u8);

impl TxKindSet {
    pub const EMPTY: TxKindSet = TxKindSet(0);

    pub fn insert(&mut self, kind: TxKind) {
        self.0 |= kind.bit();
    }

    pub fn contains(&self, kind: TxKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether the transaction may proceed to review and signing.
    pub fn is_acceptable(&self) -> bool {
        !self.contains(TxKind::Invalid)
    }

    /// Whether the transaction touches the staking protocol at all.
    pub fn is_protocol(&self) -> bool {
        self.contains(TxKind::Lock) || self.contains(TxKind::Unlock)
    }

    /// Both a lock and an unlock, i.e. a restake.
    pub fn is_restake(&self) -> bool {
        self.contains(TxKind::Lock) && self.contains(TxKind::Unlock)
    }

    pub fn iter(&self) -> impl Iterator<Item = TxKind> + '_ {
        TxKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

impl From<TxKind> for TxKindSet {
    fn from(kind: TxKind) -> Self {
        TxKindSet(kind.bit())
    }
}

impl BitOr for TxKindSet {
    type Output = TxKindSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        TxKindSet(self.0 | rhs.0)
    }
}

impl BitOr<TxKind> for TxKindSet {
    type Output = TxKindSet;

    fn bitor(self, rhs: TxKind) -> Self::Output {
        TxKindSet(self.0 | rhs.bit())
    }
}

impl fmt::Debug for TxKindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
