mod epidemic;
mod teacup;

pub use epidemic::{epidemic_model, EpidemicParameters};
pub use teacup::{teacup_model, TeacupParameters};
