//! Pricing providers and the quote composer that runs them.
//!
//! Each concern sits behind a `Send + Sync` trait so the composer can be
//! assembled from reference tables or from test doubles.

pub mod cities;
pub mod composer;
pub mod confidence;
pub mod labor;
pub mod margin;
pub mod materials;
pub mod rounding;
pub mod vat;

pub use self::cities::CityMultiplierProvider;
pub use self::composer::{QuoteComposer, QuoteRuntime, TableQuoteComposer};
pub use self::confidence::{ConfidenceContext, ConfidencePolicy, ConfidenceRule};
pub use self::labor::{LaborCostBreakdown, LaborCostProvider};
pub use self::margin::{margin_protection_min, DynamicMarginPolicy, MarginPolicy};
pub use self::materials::MaterialCostProvider;
pub use self::vat::{VatBreakdown, VatGroup, VatRateProvider, VatResolution, VatSummary};
