pub mod emissions_api;
