//! Static description of the single queryable table.

/// Declared column type. The dataset stores every column as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
}

impl ColumnType {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
        }
    }
}

/// How the model should filter on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStyle {
    /// Free text: `LIKE '%value%'`.
    Fuzzy,
    /// Enumerated status: exact equality.
    Exact,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// Human-readable label used in user-facing messages.
    pub label: &'static str,
    pub column_type: ColumnType,
    pub description: &'static str,
    pub examples: &'static [&'static str],
    pub match_style: MatchStyle,
}

#[derive(Debug)]
pub struct SchemaDescriptor {
    pub table: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl SchemaDescriptor {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// `ORGANISATION, LOCATION, ...` for prompts.
    #[must_use]
    pub fn column_list(&self) -> String {
        self.column_names().collect::<Vec<_>>().join(", ")
    }

    /// `Organisation, Location, ..., or Mission Status` for bot messages.
    #[must_use]
    pub fn readable_field_list(&self) -> String {
        match self.columns.split_last() {
            None => String::new(),
            Some((last, [])) => last.label.to_owned(),
            Some((last, rest)) => {
                let head: Vec<&str> = rest.iter().map(|c| c.label).collect();
                format!("{}, or {}", head.join(", "), last.label)
            },
        }
    }
}

/// Schema of the launch mission dataset.
pub static MISSIONS_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    table: "MISSIONS",
    columns: &[
        ColumnSpec {
            name: "ORGANISATION",
            label: "Organisation",
            column_type: ColumnType::Text,
            description: "The name of the company or agency",
            examples: &["SpaceX", "NASA", "Roscosmos", "ISRO", "ULA", "CASC", "Arianespace"],
            match_style: MatchStyle::Fuzzy,
        },
        ColumnSpec {
            name: "LOCATION",
            label: "Location",
            column_type: ColumnType::Text,
            description: "The launch site location",
            examples: &[
                "LC-39A, Kennedy Space Center, Florida",
                "Plesetsk Cosmodrome, Russia",
                "Baikonur Cosmodrome, Kazakhstan",
                "Satish Dhawan Space Centre, India",
                "Guiana Space Centre, French Guiana",
            ],
            match_style: MatchStyle::Fuzzy,
        },
        ColumnSpec {
            name: "DATE",
            label: "Date",
            column_type: ColumnType::Text,
            description: "The date of the launch (usually 'Day Mon DD, YYYY' format). Treat as text for LIKE comparisons",
            examples: &["Fri Aug 04, 2023"],
            match_style: MatchStyle::Fuzzy,
        },
        ColumnSpec {
            name: "DETAIL",
            label: "Detail",
            column_type: ColumnType::Text,
            description: "A brief description or name of the mission/payload. Often contains rocket type",
            examples: &["Starlink Group 6-20", "Crew-7", "Soyuz MS-24"],
            match_style: MatchStyle::Fuzzy,
        },
        ColumnSpec {
            name: "ROCKET_STATUS",
            label: "Rocket Status",
            column_type: ColumnType::Text,
            description: "The current status of the rocket",
            examples: &["StatusActive", "StatusRetired"],
            match_style: MatchStyle::Exact,
        },
        ColumnSpec {
            name: "MISSION_STATUS",
            label: "Mission Status",
            column_type: ColumnType::Text,
            description: "The outcome of the mission",
            examples: &["Success", "Failure", "Partial Failure"],
            match_style: MatchStyle::Exact,
        },
    ],
};
