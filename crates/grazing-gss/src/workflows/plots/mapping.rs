use super::domain::Indicator;
use super::normalizer::normalize_header;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ColumnRole {
    PlotId,
    Indicator(Indicator),
    Latitude,
    Longitude,
}

impl ColumnRole {
    pub(crate) const REQUIRED: [ColumnRole; 5] = [
        ColumnRole::PlotId,
        ColumnRole::Indicator(Indicator::Biomass),
        ColumnRole::Indicator(Indicator::ShrubCover),
        ColumnRole::Indicator(Indicator::GrazingPressure),
        ColumnRole::Indicator(Indicator::WoodyCount),
    ];

    pub(crate) const fn canonical_name(self) -> &'static str {
        match self {
            ColumnRole::PlotId => "Plot Name",
            ColumnRole::Indicator(indicator) => indicator.column_name(),
            ColumnRole::Latitude => "latitude",
            ColumnRole::Longitude => "longitude",
        }
    }
}

static COLUMN_ALIAS_MAP: OnceLock<HashMap<String, ColumnRole>> = OnceLock::new();

pub(crate) fn role_for_header(header: &str) -> Option<ColumnRole> {
    column_alias_map().get(&normalize_header(header)).copied()
}

fn column_alias_map() -> &'static HashMap<String, ColumnRole> {
    COLUMN_ALIAS_MAP.get_or_init(|| {
        const HEADER_TO_ROLE: &[(&str, ColumnRole)] = &[
            // Identifier
            ("Plot Name", ColumnRole::PlotId),
            ("Plot", ColumnRole::PlotId),
            ("Plot ID", ColumnRole::PlotId),
            ("ID", ColumnRole::PlotId),
            ("Name", ColumnRole::PlotId),
            // Indicators
            ("available_biomass", ColumnRole::Indicator(Indicator::Biomass)),
            ("biomass", ColumnRole::Indicator(Indicator::Biomass)),
            ("Shrub %", ColumnRole::Indicator(Indicator::ShrubCover)),
            ("Shrub%", ColumnRole::Indicator(Indicator::ShrubCover)),
            ("shrub_pct", ColumnRole::Indicator(Indicator::ShrubCover)),
            ("Shrub Percentage", ColumnRole::Indicator(Indicator::ShrubCover)),
            ("shrub", ColumnRole::Indicator(Indicator::ShrubCover)),
            (
                "grazing_pressure",
                ColumnRole::Indicator(Indicator::GrazingPressure),
            ),
            ("pressure", ColumnRole::Indicator(Indicator::GrazingPressure)),
            ("grazing", ColumnRole::Indicator(Indicator::GrazingPressure)),
            (
                "total woody count",
                ColumnRole::Indicator(Indicator::WoodyCount),
            ),
            (
                "total woody plants",
                ColumnRole::Indicator(Indicator::WoodyCount),
            ),
            ("woody_count", ColumnRole::Indicator(Indicator::WoodyCount)),
            ("woody", ColumnRole::Indicator(Indicator::WoodyCount)),
            // Coordinates
            ("latitude", ColumnRole::Latitude),
            ("lat", ColumnRole::Latitude),
            ("longitude", ColumnRole::Longitude),
            ("lon", ColumnRole::Longitude),
            ("lng", ColumnRole::Longitude),
            ("long", ColumnRole::Longitude),
        ];

        let mut map = HashMap::with_capacity(HEADER_TO_ROLE.len());
        for (header, role) in HEADER_TO_ROLE {
            map.insert(normalize_header(header), *role);
        }
        map
    })
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(header: &str) -> Option<ColumnRole> {
    role_for_header(header)
}
