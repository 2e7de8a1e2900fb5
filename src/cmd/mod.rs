pub mod check;
pub mod inject;
