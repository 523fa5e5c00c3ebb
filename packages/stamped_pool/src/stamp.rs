/// A generation tag distinguishing successive occupants of one storage slot.
///
/// Two reserved values mark vacant slots. Every other value is a "live" stamp,
/// drawn from a counter that only moves forward, so no live stamp is ever
/// issued twice by the same pool. The counter is 64 bits wide: issuing one
/// stamp per nanosecond would take centuries to exhaust it, so wraparound is
/// not a reachable state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Stamp(u64);

impl Stamp {
    /// The slot's memory has never held a live object since its block was
    /// allocated.
    pub(crate) const NOT_CONSTRUCTED: Self = Self(0);

    /// The slot previously held a live object that has since been released.
    pub(crate) const FREE: Self = Self(1);

    /// The first value the live-stamp counter issues. Distinct from both
    /// reserved values, so a defaulted handle can never match a live record.
    pub(crate) const ORIGIN: Self = Self(2);

    /// Whether this stamp denotes a live occupant rather than a vacancy.
    #[must_use]
    pub(crate) fn is_live(self) -> bool {
        self != Self::NOT_CONSTRUCTED && self != Self::FREE
    }

    /// The stamp the counter issues after this one.
    #[must_use]
    pub(crate) fn next(self) -> Self {
        Self(self
            .0
            .checked_add(1)
            .expect("a 64-bit stamp counter cannot be exhausted by any realistic call sequence"))
    }
}
