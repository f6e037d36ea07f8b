pub mod agui;
pub mod backend;
pub mod errors;
pub mod models;
pub mod toolsets;
pub mod translate;
