pub mod form;
pub mod question;
pub mod skip;

pub use form::{BranchPolicy, FormSpec, SkipPolicy, TargetAddressing};
pub use question::{QuestionId, QuestionSpec, QuestionType};
pub use skip::{SkipCondition, SkipRule, SkipTarget};
