use std::{fs::File, io::Write, path::Path};

use crate::domain::{battle_stats::BattleYearStats, stat_record::StatRecord};

pub struct Column {
    pub id: &'static str,
    pub title: &'static str,
}

/// A row the exporter can serialize: resolve a column id to a cell value.
/// Ids the row does not carry resolve to `None` and are written empty;
/// fields the column spec does not name are never consulted.
pub trait TabularRow {
    fn cell(&self, column_id: &str) -> Option<String>;
}

impl TabularRow for StatRecord {
    fn cell(&self, column_id: &str) -> Option<String> {
        match column_id {
            "company" => Some(self.company.clone()),
            _ => self.value(column_id),
        }
    }
}

impl TabularRow for BattleYearStats {
    fn cell(&self, column_id: &str) -> Option<String> {
        match column_id {
            "company" => Some(self.company.clone()),
            "year" => Some(self.year.to_string()),
            "sales" => self.sales.clone(),
            "netProfit" => self.net_profit.clone(),
            "opm" => self.opm.clone(),
            "eps" => self.eps.clone(),
            _ => None,
        }
    }
}

pub fn write_rows<W: Write, R: TabularRow>(
    writer: W,
    columns: &[Column],
    rows: &[R],
) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(columns.iter().map(|column| column.title))?;
    for row in rows {
        csv_writer.write_record(
            columns
                .iter()
                .map(|column| row.cell(column.id).unwrap_or_default()),
        )?;
    }
    csv_writer.flush()?;

    Ok(())
}

pub fn export_csv<R: TabularRow>(
    path: &Path,
    columns: &[Column],
    rows: &[R],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    write_rows(file, columns, rows)?;

    log::info!("Wrote {} rows to {}", rows.len(), path.display());

    Ok(())
}
