pub mod extract;
pub mod labels;
