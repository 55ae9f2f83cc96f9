/// Page configuration (JSON).
pub mod page;
