mod common;
mod compliance;
mod routing;
