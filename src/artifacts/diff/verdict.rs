/// Outcome of one comparison, or of a whole run once merged.
///
/// Ordered by severity so that merging keeps the worst outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verdict {
    #[default]
    Identical,
    Different,
    /// The inputs could not be compared.
    Trouble,
}

impl Verdict {
    pub fn merge(self, other: Verdict) -> Verdict {
        self.max(other)
    }

    /// Process exit status for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Identical => 0,
            Verdict::Different => 1,
            Verdict::Trouble => 2,
        }
    }
}

impl FromIterator<Verdict> for Verdict {
    fn from_iter<I: IntoIterator<Item = Verdict>>(iter: I) -> Self {
        iter.into_iter().fold(Verdict::Identical, Verdict::merge)
    }
}
