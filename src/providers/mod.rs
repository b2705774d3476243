pub mod cbr;
pub mod frankfurter;
pub mod util;

pub use cbr::CbrProvider;
pub use frankfurter::FrankfurterProvider;
pub use util::HttpFetcher;
