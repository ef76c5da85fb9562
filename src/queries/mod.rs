//! Queries over ridership and portfolio data

pub mod portfolio;
pub mod rides;

pub use portfolio::{read_portfolio, read_portfolio_dat, total_cost, Stock};
pub use rides::{
    greatest_increase, people_on_route, rides_between, rides_per_route, route_count, RideRecord,
};
