//! Calendar months and month selections

use serde::Deserialize;

/// Calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    /// January
    January,
    /// February
    February,
    /// March
    March,
    /// April
    April,
    /// May
    May,
    /// June
    June,
    /// July
    July,
    /// August
    August,
    /// September
    September,
    /// October
    October,
    /// November
    November,
    /// December
    December,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Zero-based position of the month in the calendar year.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Month at the given zero-based position, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A set of calendar months, always iterated in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthSet {
    mask: u16,
}

impl MonthSet {
    const FULL_MASK: u16 = 0x0FFF;

    /// Every month of the year.
    pub const fn all() -> Self {
        Self {
            mask: Self::FULL_MASK,
        }
    }

    /// No months at all.
    pub const fn empty() -> Self {
        Self { mask: 0 }
    }

    /// Build a selection from any list of months (duplicates are ignored).
    pub fn from_months(months: impl IntoIterator<Item = Month>) -> Self {
        let mask = months.into_iter().fold(0, |mask, month| mask | month.bit());

        Self { mask }
    }

    /// Add a month to the selection.
    #[must_use]
    pub const fn with(self, month: Month) -> Self {
        Self {
            mask: self.mask | month.bit(),
        }
    }

    /// Whether the month is part of the selection.
    pub const fn contains(self, month: Month) -> bool {
        self.mask & month.bit() != 0
    }

    /// Number of selected months.
    pub const fn len(self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Whether no month is selected.
    pub const fn is_empty(self) -> bool {
        self.mask == 0
    }

    /// Iterate the selected months in calendar order.
    pub fn iter(self) -> impl Iterator<Item = Month> {
        Month::ALL
            .into_iter()
            .filter(move |month| self.contains(*month))
    }
}

impl Default for MonthSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Month> for MonthSet {
    fn from_iter<I: IntoIterator<Item = Month>>(iter: I) -> Self {
        Self::from_months(iter)
    }
}
