use crate::timesheet::time::TimeOfDay;
use std::fmt::Display;

/// The four export choices, each an open interval over the extra hours.
///
/// Bounds are exclusive on both ends, so rows at exactly 02:00, 02:59, 03:00,
/// 03:59 or 04:00 fall in no numbered band.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Band {
    /// The whole projected table
    #[default]
    All,
    From2To3,
    From3To4,
    Above4,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::All, Band::From2To3, Band::From3To4, Band::Above4];

    /// Label shown in the export choice
    pub const fn label(&self) -> &'static str {
        match self {
            Self::All => "Filtro padrão",
            Self::From2To3 => "Filtro 2: Horas entre 02:00 e 02:59",
            Self::From3To4 => "Filtro 3: Horas entre 03:00 e 03:59",
            Self::Above4 => "Filtro 4: Horas acima de 04:00",
        }
    }

    /// Base of the exported file name
    pub const fn base_name(&self) -> &'static str {
        match self {
            Self::All => "Tabela_Filtrada",
            Self::From2To3 => "Tabela_Filtrada_2",
            Self::From3To4 => "Tabela_Filtrada_3",
            Self::Above4 => "Tabela_Filtrada_4",
        }
    }

    /// Exclusive (lower, upper) bounds, `None` for unbounded
    pub const fn bounds(&self) -> (Option<TimeOfDay>, Option<TimeOfDay>) {
        match self {
            Self::All => (None, None),
            Self::From2To3 => (Some(TimeOfDay::at(2, 0)), Some(TimeOfDay::at(2, 59))),
            Self::From3To4 => (Some(TimeOfDay::at(3, 0)), Some(TimeOfDay::at(3, 59))),
            Self::Above4 => (Some(TimeOfDay::at(4, 0)), None),
        }
    }

    /// Whether a row with these extra hours belongs to the band.
    ///
    /// A missing value only belongs to [`Band::All`].
    pub fn contains(&self, time: Option<TimeOfDay>) -> bool {
        if *self == Self::All {
            return true;
        }
        let Some(time) = time else {
            return false;
        };
        let (lower, upper) = self.bounds();
        lower.map(|lower| lower < time).unwrap_or(true) && upper.map(|upper| time < upper).unwrap_or(true)
    }

    /// Parses a shell or command line choice: `all`/`1`, `2`, `3`, `4`, or the full label.
    pub fn parse(choice: &str) -> Option<Self> {
        let choice = choice.trim();
        match choice.to_ascii_lowercase().as_str() {
            "all" | "1" | "padrao" | "padrão" => Some(Self::All),
            "2" => Some(Self::From2To3),
            "3" => Some(Self::From3To4),
            "4" => Some(Self::Above4),
            _ => Self::ALL.into_iter().find(|band| band.label() == choice),
        }
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
