const BASE_URL: &str = "https://www.screener.in/company/";

// (display name, screener id)
const COMPANIES: [(&str, &str); 7] = [
    ("Voltas", "VOLTAS"),
    ("Blue Star", "BLUESTARCO"),
    ("Crompton", "CROMPTON"),
    ("Orient Electric", "ORIENTELEC"),
    ("Havells", "HAVELLS"),
    ("Symphony", "SYMPHONY"),
    ("Whirlpool", "WHIRLPOOL"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRef {
    pub name: String,
    pub url: String,
}

pub fn company_registry() -> Vec<CompanyRef> {
    COMPANIES
        .iter()
        .map(|(name, id)| CompanyRef {
            name: name.to_string(),
            url: format!("{}{}", BASE_URL, id),
        })
        .collect()
}
