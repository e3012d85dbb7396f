mod common;
mod marketplace;
