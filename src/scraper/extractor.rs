// extractor.rs
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::{Listing, StationWalk, Ward};
use crate::errors::{ParseError, RecordError, RecordErrorKind};
use crate::geocode::NeighborhoodResolver;
use crate::parsers::{
    parse_age_years, parse_floor, parse_price_yen, parse_square_meters, parse_walk_minutes,
};
use crate::scraper::{CancelToken, TraversalError};

// building
//  ├── .cassetteitem_content-title            title
//  ├── .cassetteitem_detail-col1              neighborhood
//  ├── .cassetteitem_detail-col2              station access, one line each
//  ├── .cassetteitem_detail-col3 > div:first  age
//  └── tr.js-cassette_link                    one per unit
//       ├── td:nth-child(3)                   floor
//       ├── td:nth-child(4) .cassetteitem_price--rent
//       ├── .cassetteitem_madori              layout
//       └── .cassetteitem_menseki             area

/// Listings and per-record failures out of one building (or a whole page).
#[derive(Debug, Default)]
pub struct Extraction {
    pub listings: Vec<Listing>,
    pub failures: Vec<RecordError>,
}

impl Extraction {
    pub fn append(&mut self, other: Extraction) {
        self.listings.extend(other.listings);
        self.failures.extend(other.failures);
    }
}

pub struct DetailExtractor {
    title: Selector,
    neighborhood: Selector,
    access: Selector,
    age: Selector,
    unit: Selector,
    floor: Selector,
    price: Selector,
    layout: Selector,
    area: Selector,
}

pub(crate) fn selector(css: &str) -> Result<Selector, TraversalError> {
    Selector::parse(css).map_err(|e| TraversalError::HtmlParse(format!("{css}: {e}")))
}

fn child_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|child| child.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

impl DetailExtractor {
    pub fn new() -> Result<Self, TraversalError> {
        Ok(Self {
            title: selector(".cassetteitem_content-title")?,
            neighborhood: selector(".cassetteitem_detail-col1")?,
            access: selector(".cassetteitem_detail-col2 .cassetteitem_detail-text")?,
            age: selector(".cassetteitem_detail-col3 > div:first-of-type")?,
            unit: selector("tr.js-cassette_link")?,
            floor: selector("td:nth-child(3)")?,
            price: selector("td:nth-child(4) .cassetteitem_price--rent")?,
            layout: selector(".cassetteitem_madori")?,
            area: selector(".cassetteitem_menseki")?,
        })
    }

    /// Same as `extract`, for a building given as a standalone HTML fragment.
    pub fn extract_fragment(
        &self,
        html: &str,
        ward: &Ward,
        resolver: &dyn NeighborhoodResolver,
        cancel: &CancelToken,
    ) -> Extraction {
        let fragment = Html::parse_fragment(html);
        self.extract(fragment.root_element(), ward, resolver, cancel)
    }

    /// One listing per unit row. The neighborhood is resolved once for the
    /// whole building and its coordinate shared by every unit.
    ///
    /// Age and geocode failures sink the whole building; a bad unit field
    /// only sinks that unit.
    pub fn extract(
        &self,
        building: ElementRef<'_>,
        ward: &Ward,
        resolver: &dyn NeighborhoodResolver,
        cancel: &CancelToken,
    ) -> Extraction {
        let mut out = Extraction::default();

        let units: Vec<ElementRef<'_>> = building.select(&self.unit).collect();
        if units.is_empty() {
            return out;
        }

        let title = child_text(building, &self.title);
        let neighborhood = child_text(building, &self.neighborhood);

        let unit_count = units.len();
        let failure = |unit: Option<usize>, kind: RecordErrorKind| RecordError {
            ward_code: ward.code.clone(),
            ward_name: ward.name.clone(),
            title: title.clone(),
            neighborhood: neighborhood.clone(),
            unit,
            dropped: if unit.is_some() { 1 } else { unit_count },
            kind,
        };

        let age_years = match parse_age_years(&child_text(building, &self.age)) {
            Ok(age) => age,
            Err(e) => {
                out.failures.push(failure(None, e.into()));
                return out;
            }
        };

        let location = match resolver.resolve(&neighborhood, cancel) {
            Ok(coordinate) => coordinate,
            Err(e) => {
                out.failures.push(failure(None, e.into()));
                return out;
            }
        };

        let stations = self.stations(building);

        for (i, unit) in units.into_iter().enumerate() {
            let parsed = self.unit_fields(unit);
            match parsed {
                Ok(fields) => out.listings.push(Listing {
                    title: title.clone(),
                    neighborhood: neighborhood.clone(),
                    location: Some(location),
                    age_years,
                    floor: fields.floor,
                    price_per_month_yen: fields.price,
                    layout: fields.layout,
                    square_meters: fields.square_meters,
                    ward: ward.clone(),
                    direction: None,
                    stations: stations.clone(),
                }),
                Err(e) => out.failures.push(failure(Some(i), e.into())),
            }
        }

        out
    }

    fn unit_fields(&self, unit: ElementRef<'_>) -> Result<UnitFields, ParseError> {
        Ok(UnitFields {
            floor: parse_floor(&child_text(unit, &self.floor))?,
            price: parse_price_yen(&child_text(unit, &self.price))?,
            layout: child_text(unit, &self.layout),
            square_meters: parse_square_meters(&child_text(unit, &self.area))?,
        })
    }

    /// `"ＪＲ京浜東北線/浦和駅 歩10分"` lines. Bus routes and lines without a
    /// walking time are left out.
    fn stations(&self, building: ElementRef<'_>) -> Vec<StationWalk> {
        building
            .select(&self.access)
            .filter_map(|line| {
                let text = line.text().collect::<String>();
                let text = text.trim();
                if text.contains("バス") {
                    return None;
                }
                let (name, walk) = text.rsplit_once(char::is_whitespace)?;
                match parse_walk_minutes(walk) {
                    Ok(minutes) => Some(StationWalk {
                        name: name.trim().to_string(),
                        minutes,
                    }),
                    Err(e) => {
                        debug!("Skipping station line {text:?}: {e}");
                        None
                    }
                }
            })
            .collect()
    }
}

struct UnitFields {
    floor: i32,
    price: u64,
    layout: String,
    square_meters: f32,
}
