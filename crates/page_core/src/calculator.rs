use shared::{
    domain::{SavingsRecord, SystemTier},
    protocol::{Target, UiCommand},
};
use tracing::{debug, warn};

use crate::{
    config::CalculatorSettings,
    format::{format_currency, format_number},
    PageController, Reaction, TimerAction,
};

pub const PRODUCTION_ID: &str = "annualProduction";
pub const SAVINGS_ID: &str = "annualSavings";
pub const TOTAL_SAVINGS_ID: &str = "totalSavings";
pub const CO2_ID: &str = "co2Savings";

const SIZE_BUTTON_SELECTOR: &str = ".size-btn";

/// Rendered calculator outputs for one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavingsDisplay {
    pub production: String,
    pub savings: String,
    pub total_savings: String,
    pub co2: String,
}

impl SavingsDisplay {
    pub fn render(record: &SavingsRecord, settings: &CalculatorSettings) -> Self {
        let grouping = settings.grouping;
        let symbol = settings.currency_symbol.as_str();
        Self {
            production: format_number(record.production, grouping),
            savings: format_currency(symbol, record.savings, grouping),
            total_savings: format_currency(
                symbol,
                record.savings.saturating_mul(settings.lifetime_years),
                grouping,
            ),
            co2: format_number(record.co2, grouping),
        }
    }

    fn by_element(&self) -> [(&'static str, &str); 4] {
        [
            (PRODUCTION_ID, self.production.as_str()),
            (SAVINGS_ID, self.savings.as_str()),
            (TOTAL_SAVINGS_ID, self.total_savings.as_str()),
            (CO2_ID, self.co2.as_str()),
        ]
    }
}

pub fn parse_tier(data_size: &str) -> Option<SystemTier> {
    data_size.trim().parse::<u8>().ok().map(SystemTier)
}

impl PageController {
    pub(crate) fn init_calculator(&mut self, reaction: &mut Reaction) {
        self.render_savings(self.state.current_tier, reaction);
    }

    pub(crate) fn on_size_button(&mut self, data_size: &str, reaction: &mut Reaction) {
        let Some(tier) = parse_tier(data_size) else {
            warn!(data_size, "size button carries no usable tier");
            return;
        };
        self.select_system_size(tier, reaction);
    }

    pub fn select_system_size(&mut self, tier: SystemTier, reaction: &mut Reaction) {
        if self.config.calculator.savings_for(tier).is_none() {
            warn!(%tier, "no savings record for tier; selection ignored");
            return;
        }
        self.state.current_tier = tier;

        reaction.push(UiCommand::RemoveClass {
            target: Target::all(SIZE_BUTTON_SELECTOR),
            class: "active".into(),
        });
        reaction.push(UiCommand::AddClass {
            target: Target::all(format!("{SIZE_BUTTON_SELECTOR}[data-size=\"{tier}\"]")),
            class: "active".into(),
        });
        self.render_savings(tier, reaction);
    }

    fn render_savings(&mut self, tier: SystemTier, reaction: &mut Reaction) {
        let Some(record) = self.config.calculator.savings_for(tier) else {
            return;
        };
        let rendered = SavingsDisplay::render(&record, &self.config.calculator);
        debug!(%tier, production = %rendered.production, "rendering savings");

        let mut settled = Vec::new();
        for (id, text) in rendered.by_element() {
            let target = Target::id(id);
            reaction.push(UiCommand::SetStyle {
                target: target.clone(),
                property: "transform".into(),
                value: "scale(1.1)".into(),
            });
            reaction.push(UiCommand::SetStyle {
                target: target.clone(),
                property: "color".into(),
                value: "var(--color-primary)".into(),
            });
            settled.push(UiCommand::SetText {
                target: target.clone(),
                text: text.to_string(),
            });
            settled.push(UiCommand::SetStyle {
                target,
                property: "transform".into(),
                value: "scale(1)".into(),
            });
        }

        let settle_ms = self.config.animation.value_settle_ms;
        self.schedule(settle_ms, TimerAction::Apply(settled), reaction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{format::NumberGrouping, SiteConfig};

    #[test]
    fn tier_two_renders_expected_figures() {
        let config = SiteConfig::builtin().expect("builtin");
        let record = config
            .calculator
            .savings_for(SystemTier(2))
            .expect("tier 2");
        let display = SavingsDisplay::render(&record, &config.calculator);
        assert_eq!(
            display,
            SavingsDisplay {
                production: "2,920".into(),
                savings: "₹20,440".into(),
                total_savings: "₹511,000".into(),
                co2: "2,700".into(),
            }
        );
    }

    #[test]
    fn indian_grouping_changes_lifetime_total() {
        let mut config = SiteConfig::builtin().expect("builtin");
        config.calculator.grouping = NumberGrouping::Indian;
        let record = config
            .calculator
            .savings_for(SystemTier(2))
            .expect("tier 2");
        let display = SavingsDisplay::render(&record, &config.calculator);
        assert_eq!(display.total_savings, "₹5,11,000");
    }

    #[test]
    fn parses_data_size_attribute() {
        assert_eq!(parse_tier("3"), Some(SystemTier(3)));
        assert_eq!(parse_tier(" 1 "), Some(SystemTier(1)));
        assert_eq!(parse_tier("large"), None);
    }
}
