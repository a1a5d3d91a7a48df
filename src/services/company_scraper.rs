use scraper::{Html, Selector};

use crate::{
    domain::{company::CompanyRef, stat_record::StatRecord},
    services::scout::PageSource,
};

pub const MAX_EXTRACT_ATTEMPTS: u8 = 3; // Should be > 0

/// Selector-construction parameters for one field. Rendered to a CSS
/// selector only at query time, so the tables below stay backend-agnostic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Locator {
    /// 1-based position among the summary ratio items at the top of the page.
    TopRatio { position: u8 },
    /// 1-based row in the balance sheet table, last cell of the row.
    BalanceSheetRow { row: u8 },
    /// 1-based row in the profit & loss table, cell counted from the end of
    /// the row. The report carries one column per year, newest last.
    ProfitLossCell { row: u8, from_end: u8 },
}

impl Locator {
    pub fn selector(&self) -> String {
        match self {
            Locator::TopRatio { position } => {
                format!("#top-ratios > li:nth-child({}) .number", position)
            }
            Locator::BalanceSheetRow { row } => {
                format!("#balance-sheet tbody tr:nth-child({}) td:last-child", row)
            }
            Locator::ProfitLossCell { row, from_end } => format!(
                "#profit-loss table tbody tr:nth-child({}) td:nth-last-child({})",
                row, from_end
            ),
        }
    }
}

pub struct FieldSpec {
    pub name: &'static str,
    pub locator: Locator,
}

pub struct ExtractionTask {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

pub const BASIC_STATS: ExtractionTask = ExtractionTask {
    name: "basic stats",
    fields: &[
        FieldSpec { name: "marketCap", locator: Locator::TopRatio { position: 1 } },
        FieldSpec { name: "currentPrice", locator: Locator::TopRatio { position: 2 } },
        FieldSpec { name: "stockPE", locator: Locator::TopRatio { position: 4 } },
        FieldSpec { name: "ROCE", locator: Locator::TopRatio { position: 7 } },
        FieldSpec { name: "ROE", locator: Locator::TopRatio { position: 8 } },
    ],
};

pub const ITEM_INVENTORY: ExtractionTask = ExtractionTask {
    name: "item inventory",
    fields: &[
        FieldSpec { name: "reserves", locator: Locator::BalanceSheetRow { row: 2 } },
        FieldSpec { name: "borrowings", locator: Locator::BalanceSheetRow { row: 3 } },
        FieldSpec { name: "totalLiabilities", locator: Locator::BalanceSheetRow { row: 5 } },
        FieldSpec { name: "fixedAssets", locator: Locator::BalanceSheetRow { row: 6 } },
        FieldSpec { name: "investments", locator: Locator::BalanceSheetRow { row: 8 } },
        FieldSpec { name: "totalAssets", locator: Locator::BalanceSheetRow { row: 10 } },
    ],
};

pub const BATTLE_PERFORMANCE: ExtractionTask = ExtractionTask {
    name: "battle performance",
    fields: &[
        FieldSpec { name: "sales2022", locator: Locator::ProfitLossCell { row: 1, from_end: 4 } },
        FieldSpec { name: "netProfit2022", locator: Locator::ProfitLossCell { row: 10, from_end: 4 } },
        FieldSpec { name: "opm2022", locator: Locator::ProfitLossCell { row: 4, from_end: 4 } },
        FieldSpec { name: "eps2022", locator: Locator::ProfitLossCell { row: 11, from_end: 4 } },
        FieldSpec { name: "sales2023", locator: Locator::ProfitLossCell { row: 1, from_end: 3 } },
        FieldSpec { name: "netProfit2023", locator: Locator::ProfitLossCell { row: 10, from_end: 3 } },
        FieldSpec { name: "opm2023", locator: Locator::ProfitLossCell { row: 4, from_end: 3 } },
        FieldSpec { name: "eps2023", locator: Locator::ProfitLossCell { row: 11, from_end: 3 } },
        FieldSpec { name: "sales2024", locator: Locator::ProfitLossCell { row: 1, from_end: 2 } },
        FieldSpec { name: "netProfit2024", locator: Locator::ProfitLossCell { row: 10, from_end: 2 } },
        FieldSpec { name: "opm2024", locator: Locator::ProfitLossCell { row: 4, from_end: 2 } },
        FieldSpec { name: "eps2024", locator: Locator::ProfitLossCell { row: 11, from_end: 2 } },
    ],
};

/// Navigate to the company's profile page and pull the task's fields out of
/// the rendered document. A locator that matches nothing yields `None`; the
/// text of matched elements is kept verbatim apart from trimming.
pub async fn extract_company_stats<P: PageSource>(
    task: &ExtractionTask,
    page: &P,
    company: &CompanyRef,
) -> anyhow::Result<StatRecord> {
    let page_source = page.visit(&company.url).await?;
    let document = Html::parse_document(&page_source);

    let mut record = StatRecord::new(&company.name);
    for field in task.fields {
        let selector = Selector::parse(&field.locator.selector()).unwrap();
        let value = document
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string());
        record.push(field.name, value);
    }

    log::info!(
        "Extracted {} for {}: {:?}",
        task.name,
        company.name,
        record.fields
    );

    Ok(record)
}

/// Bounded retry around one extraction task. Page content can settle a beat
/// after navigation, so an incomplete record is re-extracted from scratch,
/// immediately and without memoization. The last attempt's record is kept
/// even when it still has nulls; an attempt that errored counts as an
/// all-null record rather than aborting the run.
pub async fn extract_with_retries<P: PageSource>(
    task: &ExtractionTask,
    page: &P,
    company: &CompanyRef,
    retries: u8,
) -> StatRecord {
    let mut attempt = 0;
    let mut data = null_record(task, company);

    while attempt < retries {
        data = match extract_company_stats(task, page, company).await {
            Ok(record) => {
                if record.is_complete() {
                    return record;
                }
                record
            }
            Err(e) => {
                log::error!(
                    "Extraction error on {} for {}: {:?}",
                    task.name,
                    company.name,
                    e
                );
                null_record(task, company)
            }
        };
        attempt += 1;
        log::info!("Retrying {} for {}, attempt {}", task.name, company.name, attempt);
    }

    log::error!(
        "Failed to retrieve {} for {} after {} attempts",
        task.name,
        company.name,
        retries
    );

    data
}

fn null_record(task: &ExtractionTask, company: &CompanyRef) -> StatRecord {
    let mut record = StatRecord::new(&company.name);
    for field in task.fields {
        record.push(field.name, None);
    }
    record
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{
        extract_company_stats, extract_with_retries, Locator, BASIC_STATS, BATTLE_PERFORMANCE,
        ITEM_INVENTORY,
    };
    use crate::domain::company::CompanyRef;
    use crate::services::scout::PageSource;

    struct StubPage {
        html: String,
        visits: Cell<u32>,
    }

    impl StubPage {
        fn new(html: String) -> Self {
            StubPage {
                html,
                visits: Cell::new(0),
            }
        }
    }

    impl PageSource for StubPage {
        async fn visit(&self, _url: &str) -> anyhow::Result<String> {
            self.visits.set(self.visits.get() + 1);
            Ok(self.html.clone())
        }
    }

    struct DownPage {
        visits: Cell<u32>,
    }

    impl PageSource for DownPage {
        async fn visit(&self, url: &str) -> anyhow::Result<String> {
            self.visits.set(self.visits.get() + 1);
            Err(anyhow::anyhow!("connection refused: {}", url))
        }
    }

    fn voltas() -> CompanyRef {
        CompanyRef {
            name: "Voltas".to_string(),
            url: "https://www.screener.in/company/VOLTAS".to_string(),
        }
    }

    fn top_ratios_page(values: [Option<&str>; 8]) -> String {
        let items: String = values
            .iter()
            .map(|value| match value {
                Some(v) => format!("<li><span class=\"number\">{}</span></li>", v),
                None => "<li>n/a</li>".to_string(),
            })
            .collect();
        format!("<html><body><ul id=\"top-ratios\">{}</ul></body></html>", items)
    }

    fn balance_sheet_page(rows: u8) -> String {
        let body: String = (1..=rows)
            .map(|r| format!("<tr><td>Row {r}</td><td>mid</td><td>bs{r}</td></tr>"))
            .collect();
        format!(
            "<html><body><section id=\"balance-sheet\"><table><tbody>{}</tbody></table></section></body></html>",
            body
        )
    }

    // Each row carries a label cell then five year columns, newest last;
    // cell text encodes (row, position counted from the end).
    fn profit_loss_page(rows: u8) -> String {
        let body: String = (1..=rows)
            .map(|r| {
                let cells: String = (1..=5)
                    .rev()
                    .map(|from_end| format!("<td>r{r}e{from_end}</td>"))
                    .collect();
                format!("<tr><td>Row {r}</td>{}</tr>", cells)
            })
            .collect();
        format!(
            "<html><body><section id=\"profit-loss\"><table><tbody>{}</tbody></table></section></body></html>",
            body
        )
    }

    #[test]
    fn locators_render_expected_selectors() {
        assert_eq!(
            Locator::TopRatio { position: 4 }.selector(),
            "#top-ratios > li:nth-child(4) .number"
        );
        assert_eq!(
            Locator::BalanceSheetRow { row: 10 }.selector(),
            "#balance-sheet tbody tr:nth-child(10) td:last-child"
        );
        assert_eq!(
            Locator::ProfitLossCell { row: 11, from_end: 2 }.selector(),
            "#profit-loss table tbody tr:nth-child(11) td:nth-last-child(2)"
        );
    }

    #[tokio::test]
    async fn basic_stats_reads_top_ratio_positions() {
        let page = StubPage::new(top_ratios_page([
            Some(" 33,000 "),
            Some("1,000"),
            Some("3.5"),
            Some("65.4"),
            Some("1,200"),
            Some("800"),
            Some("14.2"),
            Some("15.2"),
        ]));

        let record = extract_company_stats(&BASIC_STATS, &page, &voltas())
            .await
            .unwrap();

        assert_eq!(record.company, "Voltas");
        assert_eq!(record.value("marketCap"), Some("33,000".to_string()));
        assert_eq!(record.value("currentPrice"), Some("1,000".to_string()));
        assert_eq!(record.value("stockPE"), Some("65.4".to_string()));
        assert_eq!(record.value("ROCE"), Some("14.2".to_string()));
        assert_eq!(record.value("ROE"), Some("15.2".to_string()));
        assert!(record.is_complete());
    }

    #[tokio::test]
    async fn item_inventory_reads_last_cell_of_each_row() {
        let page = StubPage::new(balance_sheet_page(10));

        let record = extract_company_stats(&ITEM_INVENTORY, &page, &voltas())
            .await
            .unwrap();

        assert_eq!(record.value("reserves"), Some("bs2".to_string()));
        assert_eq!(record.value("borrowings"), Some("bs3".to_string()));
        assert_eq!(record.value("totalLiabilities"), Some("bs5".to_string()));
        assert_eq!(record.value("fixedAssets"), Some("bs6".to_string()));
        assert_eq!(record.value("investments"), Some("bs8".to_string()));
        assert_eq!(record.value("totalAssets"), Some("bs10".to_string()));
    }

    #[tokio::test]
    async fn battle_performance_reads_year_columns_from_row_end() {
        let page = StubPage::new(profit_loss_page(11));

        let record = extract_company_stats(&BATTLE_PERFORMANCE, &page, &voltas())
            .await
            .unwrap();

        assert_eq!(record.value("sales2022"), Some("r1e4".to_string()));
        assert_eq!(record.value("netProfit2022"), Some("r10e4".to_string()));
        assert_eq!(record.value("opm2023"), Some("r4e3".to_string()));
        assert_eq!(record.value("eps2024"), Some("r11e2".to_string()));
        assert!(record.is_complete());
    }

    #[tokio::test]
    async fn missing_rows_extract_as_null() {
        // Only 4 rows present: totalLiabilities (5), fixedAssets (6),
        // investments (8) and totalAssets (10) all miss.
        let page = StubPage::new(balance_sheet_page(4));

        let record = extract_company_stats(&ITEM_INVENTORY, &page, &voltas())
            .await
            .unwrap();

        assert_eq!(record.value("reserves"), Some("bs2".to_string()));
        assert_eq!(record.value("totalLiabilities"), None);
        assert_eq!(record.value("totalAssets"), None);
        assert!(!record.is_complete());
    }

    #[tokio::test]
    async fn complete_record_returns_without_retrying() {
        let page = StubPage::new(top_ratios_page([
            Some("1"),
            Some("2"),
            Some("3"),
            Some("4"),
            Some("5"),
            Some("6"),
            Some("7"),
            Some("8"),
        ]));

        let record = extract_with_retries(&BASIC_STATS, &page, &voltas(), 3).await;

        assert_eq!(page.visits.get(), 1);
        assert!(record.is_complete());
    }

    #[tokio::test]
    async fn incomplete_record_is_retried_then_returned_as_is() {
        // stockPE (position 4) never renders; the other ratios always do.
        let page = StubPage::new(top_ratios_page([
            Some("100"),
            Some("50"),
            Some("3.5"),
            None,
            Some("1,200"),
            Some("800"),
            Some("10"),
            Some("12"),
        ]));

        let record = extract_with_retries(&BASIC_STATS, &page, &voltas(), 3).await;

        assert_eq!(page.visits.get(), 3);
        assert_eq!(record.company, "Voltas");
        assert_eq!(record.value("marketCap"), Some("100".to_string()));
        assert_eq!(record.value("currentPrice"), Some("50".to_string()));
        assert_eq!(record.value("stockPE"), None);
        assert_eq!(record.value("ROCE"), Some("10".to_string()));
        assert_eq!(record.value("ROE"), Some("12".to_string()));
    }

    #[tokio::test]
    async fn extraction_errors_degrade_to_null_record() {
        let page = DownPage {
            visits: Cell::new(0),
        };

        let record = extract_with_retries(&BASIC_STATS, &page, &voltas(), 3).await;

        assert_eq!(page.visits.get(), 3);
        assert_eq!(record.company, "Voltas");
        assert_eq!(record.fields.len(), BASIC_STATS.fields.len());
        assert!(record.fields.iter().all(|(_, v)| v.is_none()));
    }
}
