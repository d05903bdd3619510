//! HTML table extraction.
//!
//! The bond site renders each dataset as a plain `<table>`; pages also carry
//! small layout tables, so we always pick the table with the most rows.

use scraper::{ElementRef, Html, Selector};

use crate::domain::Outlook;
use crate::error::AppError;

/// Red dot next to a grade: the agency has a negative outlook / watch.
const DOWNGRADE_ICON: &str = "i.w3-text-red.fa.fa-circle.w3-tiny";
/// Teal dot next to a grade: positive outlook / watch.
const UPGRADE_ICON: &str = "i.w3-text-teal.fa.fa-circle.w3-tiny";

/// A `<td>` cell: whitespace-normalized text plus the outlook indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub outlook: Outlook,
}

/// One `<tr>`. Header rows have `headers` filled and usually no `cells`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    pub headers: Vec<String>,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HtmlTable {
    pub rows: Vec<TableRow>,
}

impl HtmlTable {
    /// `<th>` texts of the first row.
    pub fn header(&self) -> &[String] {
        self.rows.first().map(|r| r.headers.as_slice()).unwrap_or(&[])
    }
}

struct Selectors {
    table: Selector,
    tr: Selector,
    th: Selector,
    td: Selector,
    downgrade: Selector,
    upgrade: Selector,
}

impl Selectors {
    fn new() -> Result<Self, AppError> {
        Ok(Self {
            table: selector("table")?,
            tr: selector("tr")?,
            th: selector("th")?,
            td: selector("td")?,
            downgrade: selector(DOWNGRADE_ICON)?,
            upgrade: selector(UPGRADE_ICON)?,
        })
    }
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::external(format!("Invalid CSS selector '{css}': {e:?}")))
}

/// Parse `html` and return its largest table, or `None` if it has no table.
pub fn parse_largest_table(html: &str) -> Result<Option<HtmlTable>, AppError> {
    let sel = Selectors::new()?;
    let doc = Html::parse_document(html);

    let largest = doc
        .select(&sel.table)
        .max_by_key(|t| t.select(&sel.tr).count());

    Ok(largest.map(|table| HtmlTable {
        rows: table.select(&sel.tr).map(|tr| parse_row(tr, &sel)).collect(),
    }))
}

fn parse_row(tr: ElementRef<'_>, sel: &Selectors) -> TableRow {
    TableRow {
        headers: tr.select(&sel.th).map(element_text).collect(),
        cells: tr
            .select(&sel.td)
            .map(|td| Cell {
                text: element_text(td),
                outlook: cell_outlook(td, sel),
            })
            .collect(),
    }
}

fn cell_outlook(td: ElementRef<'_>, sel: &Selectors) -> Outlook {
    if td.select(&sel.downgrade).next().is_some() {
        Outlook::Downgrade
    } else if td.select(&sel.upgrade).next().is_some() {
        Outlook::Upgrade
    } else {
        Outlook::Stable
    }
}

/// Visible text with runs of whitespace collapsed, like a browser would show it.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <table><tr><td>nav</td></tr></table>
          <table>
            <thead><tr><th>#</th><th>Country</th><th>S&amp;P</th></tr></thead>
            <tbody>
              <tr><td>1</td><td>  Germany </td><td>AAA</td></tr>
              <tr><td>2</td><td>Italy</td>
                  <td>BBB+ <i class="w3-text-teal fa fa-circle w3-tiny"></i></td></tr>
              <tr><td>3</td><td>France</td>
                  <td>AA- <i class="w3-text-red fa fa-circle w3-tiny"></i></td></tr>
            </tbody>
          </table>
        </body></html>"#;

    #[test]
    fn picks_largest_table_and_reads_cells() {
        let table = parse_largest_table(PAGE).unwrap().unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.header(), ["#", "Country", "S&P"]);
        assert_eq!(table.rows[1].cells[1].text, "Germany");
        assert_eq!(table.rows[1].cells[2].outlook, Outlook::Stable);
        assert_eq!(table.rows[2].cells[2].text, "BBB+");
        assert_eq!(table.rows[2].cells[2].outlook, Outlook::Upgrade);
        assert_eq!(table.rows[3].cells[2].outlook, Outlook::Downgrade);
    }

    #[test]
    fn page_without_tables() {
        assert_eq!(parse_largest_table("<p>nothing</p>").unwrap(), None);
    }
}
