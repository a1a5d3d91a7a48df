use crate::{
    configuration::{OutputSettings, Settings},
    domain::{
        battle_stats::reshape_battle_stats,
        company::{company_registry, CompanyRef},
        stat_record::StatRecord,
    },
    services::{
        company_scraper::{
            extract_with_retries, ExtractionTask, BASIC_STATS, BATTLE_PERFORMANCE, ITEM_INVENTORY,
            MAX_EXTRACT_ATTEMPTS,
        },
        csv_export::{export_csv, Column},
        scout::Scout,
    },
};

const BASIC_STATS_FILE: &str = "Basic_Pokemon_Stats.csv";
const ITEM_INVENTORY_FILE: &str = "Pokemon_Item_Inventory.csv";
const BATTLE_PERFORMANCE_FILE: &str = "Battle_Performance_Stats.csv";

const BASIC_STATS_COLUMNS: [Column; 6] = [
    Column { id: "company", title: "Company" },
    Column { id: "marketCap", title: "Market Cap" },
    Column { id: "stockPE", title: "Stock P/E" },
    Column { id: "ROCE", title: "ROCE" },
    Column { id: "currentPrice", title: "Current Price" },
    Column { id: "ROE", title: "ROE" },
];

const ITEM_INVENTORY_COLUMNS: [Column; 7] = [
    Column { id: "company", title: "Company" },
    Column { id: "reserves", title: "Reserves" },
    Column { id: "borrowings", title: "Borrowings" },
    Column { id: "totalLiabilities", title: "Total Liabilities" },
    Column { id: "fixedAssets", title: "Fixed Assets" },
    Column { id: "investments", title: "Investments" },
    Column { id: "totalAssets", title: "Total Assets" },
];

const BATTLE_PERFORMANCE_COLUMNS: [Column; 6] = [
    Column { id: "company", title: "Company" },
    Column { id: "year", title: "Year" },
    Column { id: "sales", title: "Sales" },
    Column { id: "netProfit", title: "Net Profit" },
    Column { id: "opm", title: "OPM" },
    Column { id: "eps", title: "EPS" },
];

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let companies = company_registry();

    let scout = Scout::new(&settings.webdriver).await?;
    let result = scrape_all(&scout, &companies, &settings.output).await;

    // Release the browser whether or not the scrape succeeded.
    let quit_result = scout.quit().await;

    result?;
    quit_result
}

async fn scrape_all(
    scout: &Scout,
    companies: &[CompanyRef],
    output: &OutputSettings,
) -> anyhow::Result<()> {
    let basic_stats = scrape_task(&BASIC_STATS, scout, companies).await;
    export_csv(
        &output.file_path(BASIC_STATS_FILE),
        &BASIC_STATS_COLUMNS,
        &basic_stats,
    )?;

    let inventory_stats = scrape_task(&ITEM_INVENTORY, scout, companies).await;
    export_csv(
        &output.file_path(ITEM_INVENTORY_FILE),
        &ITEM_INVENTORY_COLUMNS,
        &inventory_stats,
    )?;

    let battle_stats = scrape_task(&BATTLE_PERFORMANCE, scout, companies).await;
    let battle_rows = reshape_battle_stats(&battle_stats);
    export_csv(
        &output.file_path(BATTLE_PERFORMANCE_FILE),
        &BATTLE_PERFORMANCE_COLUMNS,
        &battle_rows,
    )?;

    Ok(())
}

async fn scrape_task(
    task: &ExtractionTask,
    scout: &Scout,
    companies: &[CompanyRef],
) -> Vec<StatRecord> {
    log::info!("Scraping {} for {} companies", task.name, companies.len());

    let mut records = vec![];
    for company in companies {
        records.push(extract_with_retries(task, scout, company, MAX_EXTRACT_ATTEMPTS).await);
    }
    records
}
