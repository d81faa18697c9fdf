#![deny(unsafe_code)]

pub mod error;
pub mod repository;
pub mod resolve;
pub mod rules;
pub mod syncback;
pub mod transform;
pub mod utils;

pub use error::{MapError, TransformError};
pub use repository::{RULES_VERSION, RulesRepository, RulesSummary, StoredRules};
pub use resolve::{Resolution, Resolver};
pub use rules::{IdPatternRule, MappingRules, TitleRule, TransformSpec};
pub use syncback::plan_writes;
pub use transform::{
    DateTransform, FlagTransform, ListTransform, NumberTransform, TextTransform,
    TransformerRegistry, ValueTransform, coerce_override, parse_date, parse_flag,
};
pub use utils::{normalize_title, title_matches};
