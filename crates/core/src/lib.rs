pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod reference;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use cpq::{QuoteComposer, QuoteRuntime, TableQuoteComposer};
pub use domain::budget::BudgetTier;
pub use domain::input::ParsedInput;
pub use domain::location::Country;
pub use domain::quote::{Quote, TaskPricing};
pub use domain::tax::{VatCategory, VatConditions};
pub use domain::task::{ComplexityFactor, SkillLevel, TaskKind};
pub use errors::{ApplicationError, DomainError};
pub use reference::{ReferenceTableError, ReferenceTables};
