use renoquote_core::config::{AppConfig, LoadOptions};
use renoquote_core::cpq::{DynamicMarginPolicy, QuoteComposer, TableQuoteComposer};
use renoquote_core::errors::ApplicationError;
use renoquote_core::reference::ReferenceTables;
use tracing::info;

/// Validated configuration plus the reference tables it points at.
#[derive(Clone, Debug)]
pub struct PricingRuntime {
    pub config: AppConfig,
    pub tables: ReferenceTables,
}

impl PricingRuntime {
    pub fn composer(&self) -> TableQuoteComposer<'_> {
        QuoteComposer::from_tables(&self.tables)
            .with_margin(DynamicMarginPolicy::new(self.config.pricing.base_margin))
            .with_vat_country(self.config.pricing.vat_country.clone())
    }
}

pub fn load_config(options: &LoadOptions) -> Result<AppConfig, ApplicationError> {
    Ok(AppConfig::load(options.clone())?)
}

pub fn bootstrap(options: &LoadOptions) -> Result<PricingRuntime, ApplicationError> {
    let config = load_config(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<PricingRuntime, ApplicationError> {
    let tables = ReferenceTables::resolve(config.pricing.reference_tables.as_deref())?;
    let source = config
        .pricing
        .reference_tables
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());

    info!(
        event_name = "system.bootstrap.ready",
        reference_tables = %source,
        vat_country = %config.pricing.vat_country,
        base_margin = %config.pricing.base_margin,
        "pricing runtime ready"
    );

    Ok(PricingRuntime { config, tables })
}
