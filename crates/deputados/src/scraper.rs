use crate::parser::{
    ParseError, SearchForm, parse_current_page, parse_deputy_rows, parse_legislatures,
    parse_results_count, parse_search_form,
};
use crate::types::{Deputy, Legislature};

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use reqwest::Client;
use std::time::Duration;

/// Results per page of the Deputados search grid.
pub const RESULTS_PER_PAGE: u32 = 20;

const SEARCH_PATH: &str = "/DeputadoGP/Paginas/Deputados.aspx?more=1";

/// Postback target of the results grid, used as `__EVENTTARGET` when
/// switching pages (the site wires its pager through `__doPostBack`).
const GRID_TARGET: &str = "ctl00$ctl43$g_4090e9c6_d794_4506_9ff9_3e6f8d30ec2d$ctl00$gvResults";

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
    #[error("Page {requested} is out of range (server answered with page {answered})")]
    PageOutOfRange { requested: u32, answered: u32 },
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    base_url: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: crate::BASE_URL.to_string(),
        })
    }

    /// Legislatures offered by the search page dropdown. With `all` unset,
    /// just the one the site preselects (the legislature in session).
    pub async fn fetch_legislatures(&self, all: bool) -> Result<Vec<Legislature>, ScraperError> {
        let url = self.search_url();
        log::info!("Fetching legislature list...");
        let html = self.get_html(&url).await?;
        Ok(parse_legislatures(&html, !all)?)
    }

    /// All deputies of one legislature: select it in the search form, submit,
    /// then walk every page of the results grid.
    ///
    /// Page walks are sequential because each postback needs the view state
    /// of the previous response.
    pub async fn fetch_deputies(
        &self,
        legislature: Legislature,
    ) -> Result<Vec<Deputy>, ScraperError> {
        let url = self.search_url();
        log::info!("Processing legislature {}...", legislature);

        let landing = self.get_html(&url).await?;
        let form = parse_search_form(&landing)?;

        let mut params = hidden_params(&form);
        params.push((form.legislature_field.clone(), legislature.to_string()));
        params.push((form.search_field.clone(), form.search_value.clone()));
        let mut html = self.post_form(&url, &params).await?;

        let total = parse_results_count(&html)?;
        let pages = total.div_ceil(RESULTS_PER_PAGE).max(1);
        log::info!(
            "Legislature {}: {} deputies across {} page(s)",
            legislature,
            total,
            pages
        );

        let mut deputies = parse_deputy_rows(&html, legislature)?;

        for page in 2..=pages {
            log::debug!("Processing page {}", page);
            let form = parse_search_form(&html)?;
            let mut params = hidden_params(&form);
            params.push(("__EVENTTARGET".to_string(), GRID_TARGET.to_string()));
            params.push(("__EVENTARGUMENT".to_string(), format!("Page${}", page)));
            params.push((form.legislature_field.clone(), legislature.to_string()));

            html = self.post_form(&url, &params).await?;
            if let Some(answered) = parse_current_page(&html)
                && answered != page
            {
                return Err(ScraperError::PageOutOfRange {
                    requested: page,
                    answered,
                });
            }
            deputies.extend(parse_deputy_rows(&html, legislature)?);
        }

        Ok(deputies)
    }

    /// Fetch several legislatures concurrently. Each legislature starts from
    /// its own search submission, so they are independent of each other; a
    /// failure in one does not abort the rest.
    pub async fn fetch_all(
        &self,
        legislatures: &[Legislature],
    ) -> Vec<(Legislature, Result<Vec<Deputy>, ScraperError>)> {
        let mut futs: FuturesUnordered<_> = legislatures
            .iter()
            .map(|&legislature| async move {
                (legislature, self.fetch_deputies(legislature).await)
            })
            .collect();

        let mut results = Vec::with_capacity(legislatures.len());
        while let Some(result) = futs.next().await {
            results.push(result);
        }
        results.sort_by_key(|(legislature, _)| *legislature);
        results
    }

    fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_PATH)
    }

    async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }

    async fn post_form(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String, ScraperError> {
        Ok(self
            .client
            .post(url)
            .form(params)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}

fn hidden_params(form: &SearchForm) -> Vec<(String, String)> {
    let mut params = vec![
        ("__VIEWSTATE".to_string(), form.view_state.clone()),
        ("__EVENTVALIDATION".to_string(), form.event_validation.clone()),
    ];
    if let Some(generator) = &form.view_state_generator {
        params.push(("__VIEWSTATEGENERATOR".to_string(), generator.clone()));
    }
    params
}
