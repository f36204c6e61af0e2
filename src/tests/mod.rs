mod config_tests;
mod fetcher_tests;
mod utils;
mod wards_tests;
