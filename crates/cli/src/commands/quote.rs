use chrono::{DateTime, Local};
use renoquote_core::config::LoadOptions;
use renoquote_core::domain::quote::Quote;
use serde::Serialize;

use crate::bootstrap::bootstrap;
use crate::commands::input::read_parsed_input;
use crate::commands::CommandResult;

const COMMAND: &str = "quote";

/// A composed quote with its identifier and generation time.
#[derive(Debug, Serialize)]
pub struct StampedQuote<'a> {
    pub quote_id: String,
    pub generated_at: DateTime<Local>,
    #[serde(flatten)]
    pub quote: &'a Quote,
}

pub fn quote_id(at: &DateTime<Local>) -> String {
    format!("QTE-{}", at.format("%Y%m%d-%H%M%S"))
}

pub fn stamp(quote: &Quote, at: DateTime<Local>) -> StampedQuote<'_> {
    StampedQuote { quote_id: quote_id(&at), generated_at: at, quote }
}

pub fn run(options: &LoadOptions, input: &str, pretty: bool) -> CommandResult {
    let runtime = match bootstrap(options) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let parsed = match read_parsed_input(input) {
        Ok(parsed) => parsed,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    match runtime.composer().compose(&parsed) {
        Ok(quote) => {
            let stamped = stamp(&quote, Local::now());
            tracing::info!(
                event_name = "cli.quote.generated",
                quote_id = %stamped.quote_id,
                total_price = %quote.pricing.summary.total_price,
                "quote generated"
            );
            CommandResult::document(COMMAND, &stamped, pretty)
        }
        Err(error) => CommandResult::from_error(COMMAND, &error.into()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::quote_id;

    #[test]
    fn quote_id_encodes_local_timestamp() {
        let at = Local.with_ymd_and_hms(2026, 3, 4, 9, 5, 7).single().expect("unambiguous time");
        assert_eq!(quote_id(&at), "QTE-20260304-090507");
    }
}
