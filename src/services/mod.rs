pub mod company_scraper;
pub mod csv_export;
pub mod scout;

pub use company_scraper::*;
pub use csv_export::*;
pub use scout::*;
