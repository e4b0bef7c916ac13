pub mod bin_spec;
pub mod binning;
pub mod column;
pub mod error;
pub mod histogram;
pub mod roc;
pub mod rows;
pub mod scatter;
pub mod source;
pub mod sql;
