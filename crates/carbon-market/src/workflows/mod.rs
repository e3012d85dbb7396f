pub mod ledger;
pub mod projects;
