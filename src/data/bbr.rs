//! Basketball-Reference advanced stats pages.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::FetchConfig;
use crate::data::SeasonSource;
use crate::data::html::extract_table;
use crate::domain::{RawTable, Season, season_label};
use crate::error::AppError;

/// Table ids used by the advanced page over the years.
const TABLE_IDS: &[&str] = &["advanced", "advanced_stats"];

/// Extra raw column holding the site's player id.
pub const PLAYER_ID_COLUMN: &str = "player_id";

pub struct BbrSource {
    client: Client,
    base_url: String,
    delay: Duration,
}

impl BbrSource {
    pub fn new(config: &FetchConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;

        let delay = Duration::try_from_secs_f64(config.request_delay_secs).map_err(|e| {
            AppError::new(
                2,
                format!("Invalid request delay {}s: {e}", config.request_delay_secs),
            )
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            delay,
        })
    }

    /// Page URL for a season; pages are keyed by the season's end year.
    pub fn season_url(&self, season: Season) -> String {
        format!("{}/leagues/NBA_{}_advanced.html", self.base_url, season + 1)
    }
}

impl SeasonSource for BbrSource {
    fn name(&self) -> &str {
        "basketball-reference"
    }

    fn fetch_season(&self, season: Season) -> Result<RawTable, AppError> {
        let url = self.season_url(season);
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::new(4, format!("Request for {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Request for {url} failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read response from {url}: {e}")))?;

        table_from_html(season, &body)
    }

    fn request_delay(&self) -> Duration {
        self.delay
    }
}

/// Turn an advanced stats page into a raw table.
///
/// Rows kept are player rows only: repeated header rows and the league
/// average line are dropped. Hall-of-Fame `*` markers are stripped from
/// names and the player id is appended as a `player_id` column.
pub fn table_from_html(season: Season, html: &str) -> Result<RawTable, AppError> {
    let table = extract_table(html, TABLE_IDS).ok_or_else(|| {
        AppError::new(
            4,
            format!("No advanced stats table found for {}.", season_label(season)),
        )
    })?;

    // Blank spacer columns carry no data.
    let keep: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.trim().is_empty())
        .map(|(i, _)| i)
        .collect();

    let player_col = table
        .headers
        .iter()
        .position(|h| h.trim() == "Player")
        .ok_or_else(|| {
            AppError::new(
                4,
                format!("Advanced table for {} has no Player column.", season_label(season)),
            )
        })?;

    let mut headers: Vec<String> = keep.iter().map(|&i| table.headers[i].trim().to_string()).collect();
    headers.push(PLAYER_ID_COLUMN.to_string());

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        if row.class.split_whitespace().any(|c| c == "thead") {
            continue;
        }
        let Some(player_cell) = row.cells.get(player_col) else {
            continue;
        };
        let name = player_cell.text.trim_end_matches('*').trim();
        if name.is_empty() || name == "Player" || name == "League Average" {
            continue;
        }

        let mut out: Vec<String> = keep
            .iter()
            .map(|&i| {
                if i == player_col {
                    name.to_string()
                } else {
                    row.cells.get(i).map(|c| c.text.clone()).unwrap_or_default()
                }
            })
            .collect();
        out.push(player_cell.append_csv.clone().unwrap_or_default());
        rows.push(out);
    }

    if rows.is_empty() {
        return Err(AppError::new(
            4,
            format!("Advanced table for {} has no player rows.", season_label(season)),
        ));
    }

    Ok(RawTable {
        season,
        headers,
        rows,
    })
}
