use crate::types::{Deputy, Legislature, LegislatureParseError};

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Could not extract deputy id from href: {0}")]
    IdParse(String),
    #[error("Could not read result count from: {0:?}")]
    CountParse(String),
    #[error(transparent)]
    Legislature(#[from] LegislatureParseError),
}

/// Hidden WebForms state plus the field names needed to replay a search
/// postback against the Deputados page.
#[derive(Debug, Clone)]
pub(crate) struct SearchForm {
    pub view_state: String,
    pub view_state_generator: Option<String>,
    pub event_validation: String,
    pub legislature_field: String,
    pub search_field: String,
    pub search_value: String,
}

fn hidden_input(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("input[name=\"{}\"]", name)).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|elem| elem.value().attr("value"))
        .map(|s| s.to_string())
}

pub(crate) fn parse_search_form(html: &str) -> Result<SearchForm, ParseError> {
    let document = Html::parse_document(html);

    let view_state = hidden_input(&document, "__VIEWSTATE")
        .ok_or_else(|| ParseError::MissingField("__VIEWSTATE".to_string()))?;
    let view_state_generator = hidden_input(&document, "__VIEWSTATEGENERATOR");
    let event_validation = hidden_input(&document, "__EVENTVALIDATION")
        .ok_or_else(|| ParseError::MissingField("__EVENTVALIDATION".to_string()))?;

    let select_selector = Selector::parse("select[id*=\"Legislatura\"]").unwrap();
    let legislature_field = document
        .select(&select_selector)
        .next()
        .and_then(|elem| elem.value().attr("name"))
        .ok_or_else(|| ParseError::MissingField("legislature select".to_string()))?
        .to_string();

    let search_selector = Selector::parse("input[value=\"Pesquisar\"]").unwrap();
    let search = document
        .select(&search_selector)
        .next()
        .ok_or_else(|| ParseError::MissingField("search button".to_string()))?;
    let search_field = search
        .value()
        .attr("name")
        .ok_or_else(|| ParseError::MissingField("search button name".to_string()))?
        .to_string();
    let search_value = search.value().attr("value").unwrap_or("Pesquisar").to_string();

    Ok(SearchForm {
        view_state,
        view_state_generator,
        event_validation,
        legislature_field,
        search_field,
        search_value,
    })
}

/// Total result count from the `lblResults` label, e.g. "Resultados: 230".
pub(crate) fn parse_results_count(html: &str) -> Result<u32, ParseError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("span[id*=\"lblResults\"]").unwrap();

    let text = document
        .select(&selector)
        .next()
        .map(|elem| elem.text().collect::<String>())
        .ok_or_else(|| ParseError::MissingField("lblResults".to_string()))?;

    let number = Regex::new(r"\d+").unwrap();
    number
        .find(&text)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| ParseError::CountParse(text.trim().to_string()))
}

/// Current page number from the pager row. Page links render as anchors, the
/// current page as a bare numeric span.
pub(crate) fn parse_current_page(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("tr.ARLabel span").unwrap();

    document.select(&selector).find_map(|elem| {
        elem.text()
            .collect::<String>()
            .trim()
            .parse::<u32>()
            .ok()
    })
}

/// Legislatures offered by the search page dropdown, in document order.
/// With `only_selected` set, just the option the site preselects (the
/// legislature currently in session).
pub(crate) fn parse_legislatures(
    html: &str,
    only_selected: bool,
) -> Result<Vec<Legislature>, ParseError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("select[id*=\"Legislatura\"] option").unwrap();

    let mut legislatures = Vec::new();
    for option in document.select(&selector) {
        let value = option.value().attr("value").unwrap_or("");
        if value.is_empty() {
            continue;
        }
        if only_selected && option.value().attr("selected").is_none() {
            continue;
        }
        legislatures.push(value.parse::<Legislature>()?);
    }

    if legislatures.is_empty() {
        return Err(ParseError::MissingField("legislature options".to_string()));
    }
    Ok(legislatures)
}

/// Deputy rows from the `gvResults` grid. Rows that cannot be parsed are
/// logged and skipped so one malformed entry does not lose the page.
pub(crate) fn parse_deputy_rows(
    html: &str,
    legislature: Legislature,
) -> Result<Vec<Deputy>, ParseError> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table[id*=\"gvResults\"] tr").unwrap();

    let mut deputies = Vec::new();
    for row in document.select(&row_selector) {
        match parse_deputy_row(row, legislature) {
            Ok(Some(deputy)) => deputies.push(deputy),
            Ok(None) => {} // header or pager row
            Err(e) => log::warn!("Skipping unparseable deputy row: {}", e),
        }
    }
    Ok(deputies)
}

fn parse_deputy_row(
    row: ElementRef,
    legislature: Legislature,
) -> Result<Option<Deputy>, ParseError> {
    let link_selector = Selector::parse("a[id*=\"hplNome\"]").unwrap();
    let Some(link) = row.select(&link_selector).next() else {
        return Ok(None);
    };

    let shortname = link.text().collect::<String>().trim().to_string();
    if shortname.is_empty() {
        return Err(ParseError::MissingField("deputy name".to_string()));
    }

    let href = link
        .value()
        .attr("href")
        .ok_or_else(|| ParseError::MissingField("href attribute".to_string()))?;
    let id = parse_deputy_id(href)?;

    let cell_selector = Selector::parse("td").unwrap();
    let cells: Vec<String> = row
        .select(&cell_selector)
        .map(|td| td.text().collect::<String>().trim().to_string())
        .collect();

    // Grid columns: name, parliamentary group, electoral district.
    let party = cells.get(1).filter(|s| !s.is_empty()).cloned();
    let district = cells.get(2).filter(|s| !s.is_empty()).cloned();

    Ok(Some(Deputy {
        id,
        shortname,
        party,
        district,
        legislature,
        url: absolute_url(href),
    }))
}

/// Biography links look like `/DeputadoGP/Paginas/Biografia.aspx?BID=3`.
fn parse_deputy_id(href: &str) -> Result<u32, ParseError> {
    let digits: String = href
        .split("BID=")
        .nth(1)
        .map(|rest| rest.chars().take_while(|c| c.is_ascii_digit()).collect())
        .unwrap_or_default();

    digits
        .parse()
        .map_err(|_| ParseError::IdParse(href.to_string()))
}

pub(crate) fn absolute_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", crate::BASE_URL, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body>
        <form method="post" action="./Deputados.aspx?more=1">
            <input type="hidden" name="__VIEWSTATE" value="dDwtMTM4NzY1" />
            <input type="hidden" name="__VIEWSTATEGENERATOR" value="CA0B0334" />
            <input type="hidden" name="__EVENTVALIDATION" value="/wEWAgL1" />
            <select name="ctl00$ctl43$g_4090$ctl00$ddlLegislatura"
                    id="ctl00_ctl43_g_4090_ctl00_ddlLegislatura">
                <option value=""></option>
                <option value="XVI" selected="selected">XVI</option>
                <option value="XV">XV</option>
                <option value="XIV">XIV</option>
            </select>
            <input type="submit" name="ctl00$ctl43$g_4090$ctl00$btnPesquisa"
                   value="Pesquisar" />
        </form>
        </body></html>
    "#;

    const RESULTS_PAGE: &str = r#"
        <html><body>
        <span id="ctl00_ctl43_g_4090_ctl00_lblResults">Resultados: 45</span>
        <table id="ctl00_ctl43_g_4090_ctl00_gvResults">
            <tr><th>Nome</th><th>GP</th><th>Círculo</th></tr>
            <tr>
                <td><a id="ctl00_hplNome_0"
                       href="/DeputadoGP/Paginas/Biografia.aspx?BID=3">Maria Silva</a></td>
                <td>PS</td>
                <td>Lisboa</td>
            </tr>
            <tr>
                <td><a id="ctl00_hplNome_1"
                       href="/DeputadoGP/Paginas/Biografia.aspx?BID=1207">João Costa</a></td>
                <td>PSD</td>
                <td>Porto</td>
            </tr>
            <tr class="ARLabel">
                <td><table><tr>
                    <td><span>1</span></td>
                    <td><a href="javascript:__doPostBack('grid','Page$2')">2</a></td>
                    <td><a href="javascript:__doPostBack('grid','Page$3')">3</a></td>
                </tr></table></td>
            </tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_search_form() {
        let form = parse_search_form(SEARCH_PAGE).expect("Failed to parse search form");

        assert_eq!(form.view_state, "dDwtMTM4NzY1");
        assert_eq!(form.view_state_generator.as_deref(), Some("CA0B0334"));
        assert_eq!(form.event_validation, "/wEWAgL1");
        assert_eq!(
            form.legislature_field,
            "ctl00$ctl43$g_4090$ctl00$ddlLegislatura"
        );
        assert_eq!(form.search_field, "ctl00$ctl43$g_4090$ctl00$btnPesquisa");
        assert_eq!(form.search_value, "Pesquisar");
    }

    #[test]
    fn test_parse_search_form_missing_state() {
        let err = parse_search_form("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, ParseError::MissingField(_)));
    }

    #[test]
    fn test_parse_legislatures_all() {
        let legislatures = parse_legislatures(SEARCH_PAGE, false).expect("Failed to parse");
        let numerals: Vec<String> = legislatures.iter().map(|l| l.to_string()).collect();
        assert_eq!(numerals, vec!["XVI", "XV", "XIV"]);
    }

    #[test]
    fn test_parse_legislatures_selected_only() {
        let legislatures = parse_legislatures(SEARCH_PAGE, true).expect("Failed to parse");
        assert_eq!(legislatures.len(), 1);
        assert_eq!(legislatures[0].to_string(), "XVI");
    }

    #[test]
    fn test_parse_results_count() {
        let count = parse_results_count(RESULTS_PAGE).expect("Failed to parse count");
        assert_eq!(count, 45);
    }

    #[test]
    fn test_parse_results_count_missing() {
        let err = parse_results_count("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, ParseError::MissingField(_)));
    }

    #[test]
    fn test_parse_current_page() {
        assert_eq!(parse_current_page(RESULTS_PAGE), Some(1));
        assert_eq!(parse_current_page("<html><body></body></html>"), None);
    }

    #[test]
    fn test_parse_deputy_rows() {
        let legislature: Legislature = "XVI".parse().unwrap();
        let deputies = parse_deputy_rows(RESULTS_PAGE, legislature).expect("Failed to parse");

        assert_eq!(deputies.len(), 2);

        let first = &deputies[0];
        assert_eq!(first.id, 3);
        assert_eq!(first.shortname, "Maria Silva");
        assert_eq!(first.party.as_deref(), Some("PS"));
        assert_eq!(first.district.as_deref(), Some("Lisboa"));
        assert_eq!(first.legislature, legislature);
        assert_eq!(
            first.url,
            "https://www.parlamento.pt/DeputadoGP/Paginas/Biografia.aspx?BID=3"
        );

        assert_eq!(deputies[1].id, 1207);
        assert_eq!(deputies[1].shortname, "João Costa");
    }

    #[test]
    fn test_parse_deputy_rows_skips_malformed() {
        let html = r#"
            <table id="gvResults">
                <tr><td><a id="hplNome_0" href="/DeputadoGP/Paginas/Biografia.aspx">No Bid</a></td></tr>
                <tr><td><a id="hplNome_1" href="/DeputadoGP/Paginas/Biografia.aspx?BID=9">Ana Lopes</a></td></tr>
            </table>
        "#;
        let deputies = parse_deputy_rows(html, "XV".parse().unwrap()).expect("Failed to parse");
        assert_eq!(deputies.len(), 1);
        assert_eq!(deputies[0].id, 9);
    }

    #[test]
    fn test_parse_deputy_id_from_href() {
        assert_eq!(
            parse_deputy_id("/DeputadoGP/Paginas/Biografia.aspx?BID=1207&lg=XVI").unwrap(),
            1207
        );
        assert!(parse_deputy_id("/DeputadoGP/Paginas/Biografia.aspx").is_err());
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("/DeputadoGP/Paginas/Biografia.aspx?BID=3"),
            "https://www.parlamento.pt/DeputadoGP/Paginas/Biografia.aspx?BID=3"
        );
        assert_eq!(absolute_url("https://example.com/x"), "https://example.com/x");
    }
}
