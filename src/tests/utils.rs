// Shared fakes and HTML fixtures for the test modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use url::Url;

use crate::domain::{Coordinate, Prefecture, Ward};
use crate::errors::GeocodeError;
use crate::events::{Observer, ProgressEvent};
use crate::geocode::{ExternalGeocoder, NeighborhoodResolver};
use crate::scraper::{CancelToken, PageFetcher, TraversalError};

pub fn test_ward(code: &str) -> Ward {
    Ward {
        name: format!("ward-{code}"),
        code: code.to_string(),
        prefecture: Prefecture::from_code("11").expect("known prefecture"),
    }
}

/// Serves canned pages by URL and records every request.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl PageFetcher for FakeFetcher {
    fn fetch(&self, url: &Url, cancel: &CancelToken) -> Result<String, TraversalError> {
        if cancel.is_cancelled() {
            return Err(TraversalError::Cancelled);
        }
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| TraversalError::Network(format!("HTTP 404 Not Found for {url}")))
    }
}

/// External geocoder answering from a table and counting calls.
#[derive(Default)]
pub struct CountingGeocoder {
    answers: HashMap<String, Vec<Coordinate>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, query: &str, coordinates: Vec<Coordinate>) -> Self {
        self.answers.insert(query.to_string(), coordinates);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExternalGeocoder for CountingGeocoder {
    fn geocode(
        &self,
        query: &str,
        region: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Coordinate>, GeocodeError> {
        assert_eq!(region, "jp");
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            if !cancel.sleep(delay) {
                return Err(GeocodeError::Cancelled {
                    neighborhood: query.to_string(),
                });
            }
        }
        self.answers
            .get(query)
            .cloned()
            .ok_or_else(|| GeocodeError::Lookup {
                neighborhood: query.to_string(),
                message: "service unavailable".to_string(),
            })
    }
}

/// Resolves every neighborhood to the same point and counts calls.
pub struct StaticResolver {
    coordinate: Option<Coordinate>,
    calls: AtomicUsize,
}

impl StaticResolver {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            coordinate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NeighborhoodResolver for StaticResolver {
    fn resolve(&self, neighborhood: &str, _: &CancelToken) -> Result<Coordinate, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.coordinate.ok_or_else(|| GeocodeError::NoResults {
            neighborhood: neighborhood.to_string(),
        })
    }
}

#[derive(Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Observer for CollectingObserver {
    fn on_event(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub struct Unit<'a> {
    pub floor: &'a str,
    pub price: &'a str,
    pub layout: &'a str,
    pub area: &'a str,
}

pub fn unit<'a>(floor: &'a str, price: &'a str, layout: &'a str, area: &'a str) -> Unit<'a> {
    Unit {
        floor,
        price,
        layout,
        area,
    }
}

/// One `<li>` of the listing index, shaped like the real markup.
pub fn building_html(title: &str, neighborhood: &str, age: &str, units: &[Unit<'_>]) -> String {
    let rows: String = units
        .iter()
        .map(|u| {
            format!(
                r#"
                <tr class="js-cassette_link">
                  <td class="ui-text--midium"><input type="checkbox" value="1"></td>
                  <td><img src="x.jpg"></td>
                  <td>
                    {floor}
                  </td>
                  <td>
                    <ul>
                      <li><span class="cassetteitem_price cassetteitem_price--rent"><span class="cassetteitem_other-emphasis ui-text--bold">{price}</span></span></li>
                      <li><span class="cassetteitem_price cassetteitem_price--administration">3000円</span></li>
                    </ul>
                  </td>
                  <td>
                    <ul>
                      <li><span class="cassetteitem_price cassetteitem_price--deposit">-</span></li>
                    </ul>
                  </td>
                  <td>
                    <ul>
                      <li><span class="cassetteitem_madori">{layout}</span></li>
                      <li><span class="cassetteitem_menseki">{area}</span></li>
                    </ul>
                  </td>
                  <td class="ui-text--midium ui-text--bold"><a href="/chintai/jnc_000001/">詳細を見る</a></td>
                </tr>"#,
                floor = u.floor,
                price = u.price,
                layout = u.layout,
                area = u.area,
            )
        })
        .collect();

    format!(
        r#"
        <li>
          <div class="cassetteitem">
            <div class="cassetteitem-detail">
              <div class="cassetteitem_content">
                <div class="cassetteitem_content-title">{title}</div>
              </div>
              <div class="cassetteitem_content-body">
                <ul class="cassetteitem_detail">
                  <li class="cassetteitem_detail-col1">{neighborhood}</li>
                  <li class="cassetteitem_detail-col2">
                    <div class="cassetteitem_detail-text">ＪＲ京浜東北線/浦和駅 歩10分</div>
                    <div class="cassetteitem_detail-text">ＪＲ埼京線/中浦和駅 歩18分</div>
                    <div class="cassetteitem_detail-text">ＪＲ武蔵野線/武蔵浦和駅 バス10分 (バス停)別所 歩2分</div>
                  </li>
                  <li class="cassetteitem_detail-col3">
                    <div>{age}</div>
                    <div>5階建</div>
                  </li>
                </ul>
              </div>
            </div>
            <div class="cassetteitem-item">
              <table class="cassetteitem_other">
                <tbody>{rows}
                </tbody>
              </table>
            </div>
          </div>
        </li>"#
    )
}

/// A listing-index page holding `buildings`, with a "next" link when given.
pub fn index_page(buildings: &[String], next: Option<&str>) -> String {
    let next_link = match next {
        Some(href) => format!(r#"<p class="pagination-parts"><a href="{href}">次へ</a></p>"#),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
        <html>
          <body>
            <div id="js-bukkenList">
              <ul class="l-cassetteitem">{buildings}</ul>
            </div>
            <div class="pagination_set">
              <div class="pagination pagination_set-nav">
                <p class="pagination-parts"><a href="/prev">前へ</a></p>
                <ol class="pagination-parts">
                  <li><a href="/page1">1</a></li>
                </ol>
                {next_link}
              </div>
            </div>
          </body>
        </html>"#,
        buildings = buildings.concat(),
    )
}
