pub mod issue;
pub mod scan;
