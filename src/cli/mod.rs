pub mod accounts;
pub mod convert;
pub mod loans;
pub mod rates;
pub mod setup;
pub mod total;
pub mod transactions;
pub mod ui;
