use crate::domain::stat_record::StatRecord;

pub const BATTLE_YEARS: [u16; 3] = [2022, 2023, 2024];

/// Long-form row for one (company, year) pair, re-keyed out of the
/// year-suffixed wide record.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleYearStats {
    pub company: String,
    pub year: u16,
    pub sales: Option<String>,
    pub net_profit: Option<String>,
    pub opm: Option<String>,
    pub eps: Option<String>,
}

/// Wide-to-long reshape: exactly 3 output rows per input record, years
/// ascending within each company. Total: missing or null source fields
/// come through as `None`.
pub fn reshape_battle_stats(records: &[StatRecord]) -> Vec<BattleYearStats> {
    let mut reshaped = vec![];

    for record in records {
        for year in BATTLE_YEARS {
            reshaped.push(BattleYearStats {
                company: record.company.clone(),
                year,
                sales: record.value(&format!("sales{}", year)),
                net_profit: record.value(&format!("netProfit{}", year)),
                opm: record.value(&format!("opm{}", year)),
                eps: record.value(&format!("eps{}", year)),
            });
        }
    }

    reshaped
}
