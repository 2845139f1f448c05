pub mod attempt;
pub mod base;
pub mod mastery;

pub use attempt::AttemptDao;
pub use base::BaseDao;
pub use mastery::MasteryDao;
