//! Derived views of a loaded dataset.
//!
//! Summary statistics, hour/weekday histograms, the recent-activity window
//! and the top-tipped ranking, bundled per refresh in a
//! [`DashboardSnapshot`](snapshot::DashboardSnapshot). Everything here is a
//! pure function of the dataset.

pub mod activity;
pub mod histogram;
pub mod insights;
pub mod snapshot;
pub mod summary;
pub mod utility;
