use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::models::NewListing;
use crate::utils::error::{AppError, Result};

struct RowSelectors {
    row: Selector,
    address: Selector,
    gross_rent: Selector,
    rooms: Selector,
    floor: Selector,
    area: Selector,
    move_in_date: Selector,
    zone: Selector,
    apply_link: Selector,
}

impl RowSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            row: parse_selector("table tbody tr")?,
            address: parse_selector("td.publicated_adress")?,
            gross_rent: parse_selector("td.rentalgross")?,
            rooms: parse_selector("td.rooms")?,
            floor: parse_selector("td.floor")?,
            area: parse_selector("td.area")?,
            move_in_date: parse_selector("td.move_in_date")?,
            zone: parse_selector("td.metropolitan")?,
            apply_link: parse_selector("a.apply_button")?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::Parse {
        message: format!("Invalid CSS selector '{}': {:?}", selector, e),
    })
}

/// Fetches the city's apartment publication page and turns its table rows
/// into listings.
pub struct ListingFetcher {
    client: Client,
    listing_url: Url,
    base_url: Url,
    selectors: RowSelectors,
}

impl ListingFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            listing_url: Url::parse(&config.listing_url)?,
            base_url: Url::parse(&config.base_url)?,
            selectors: RowSelectors::new()?,
        })
    }

    /// Downloads the listing page once and parses every row on it.
    ///
    /// A failed request or a non-success status is an error for the whole
    /// run; individual rows that fail to parse are skipped.
    pub async fn fetch(&self) -> Result<Vec<NewListing>> {
        info!("Fetching apartments...");
        debug!("Fetching URL: {}", self.listing_url);

        let response = self.client.get(self.listing_url.clone()).send().await?;

        if !response.status().is_success() {
            warn!("Listing page returned status: {}", response.status());
            return Err(AppError::Scraping(format!(
                "Failed to fetch listing page: {}",
                response.status()
            )));
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());

        let listings = self.parse_listings(&html, Utc::now());
        info!(count = listings.len(), "Fetched apartments");

        if let Some(first) = listings.first() {
            debug!(?first, "First apartment details");
        }

        Ok(listings)
    }

    /// Parses all table body rows in page order, stamping each with
    /// `observed_at`.
    pub fn parse_listings(&self, html: &str, observed_at: DateTime<Utc>) -> Vec<NewListing> {
        let document = Html::parse_document(html);

        document
            .select(&self.selectors.row)
            .enumerate()
            .filter_map(|(index, row)| match self.parse_row(row, observed_at) {
                Ok(Some(listing)) => Some(listing),
                Ok(None) => {
                    debug!(row = index, "Row has no listing cells, skipping");
                    None
                }
                Err(e) => {
                    warn!(row = index, "Error processing row: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Returns `Ok(None)` for rows carrying none of the listing cells, such as
    /// a header row the HTML parser moved into an implied `<tbody>`.
    fn parse_row(&self, row: ElementRef<'_>, observed_at: DateTime<Utc>) -> Result<Option<NewListing>> {
        let s = &self.selectors;

        let address = cell_text(row, &s.address);
        let gross_rent = cell_text(row, &s.gross_rent);
        let rooms = cell_text(row, &s.rooms);
        let floor = cell_text(row, &s.floor);
        let area = cell_text(row, &s.area);
        let move_in_date = cell_text(row, &s.move_in_date);
        let zone = cell_text(row, &s.zone);

        let cells = [&address, &gross_rent, &rooms, &floor, &area, &move_in_date, &zone];
        if cells.iter().all(|cell| cell.is_none()) {
            return Ok(None);
        }

        let application_link = match row.select(&s.apply_link).next() {
            Some(anchor) => {
                let href = anchor.value().attr("href").ok_or_else(|| AppError::Parse {
                    message: "apply_button link has no href".to_string(),
                })?;
                Some(self.base_url.join(href)?.to_string())
            }
            None => None,
        };

        Ok(Some(NewListing {
            address,
            gross_rent,
            rooms,
            floor,
            area,
            move_in_date,
            zone,
            application_link,
            observed_at,
        }))
    }
}

fn cell_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|cell| cell.text().collect::<String>().trim().to_string())
}
