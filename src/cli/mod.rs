//! Terminal front end: one module per subcommand plus shared styling

pub mod ads;
pub mod currencies;
pub mod price;
pub mod rates;
pub mod setup;
pub mod ui;
