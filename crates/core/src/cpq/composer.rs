use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::cpq::cities::CityMultiplierProvider;
use crate::cpq::confidence::{ConfidenceContext, ConfidencePolicy};
use crate::cpq::labor::{estimated_days, LaborCostProvider};
use crate::cpq::margin::{margin_protection_min, DynamicMarginPolicy, MarginPolicy};
use crate::cpq::materials::MaterialCostProvider;
use crate::cpq::rounding::{round_money, round_rate};
use crate::cpq::vat::{VatRateProvider, VatSummary};
use crate::domain::input::ParsedInput;
use crate::domain::location::Country;
use crate::domain::quote::{
    ClientInfo, PricingSummary, ProjectDetails, Quote, QuotePricing, TaskPricing, ZonePricing,
};
use crate::domain::tax::{VatCategory, VatConditions};
use crate::domain::task::{SkillLevel, TaskKind};
use crate::errors::DomainError;
use crate::reference::{CityTable, LaborTable, MaterialTable, ReferenceTables, VatTable};

pub trait QuoteRuntime: Send + Sync {
    fn compose(&self, input: &ParsedInput) -> Result<Quote, DomainError>;
}

/// Exact, unrounded figures for one task before the city multiplier.
#[derive(Clone, Debug, PartialEq, Eq)]
struct TaskComputation {
    task: TaskKind,
    materials_cost: Decimal,
    labor_hours: Decimal,
    labor_rate: Decimal,
    labor_cost: Decimal,
    skill_level: SkillLevel,
    subtotal: Decimal,
    margin_rate: Decimal,
    margin_amount: Decimal,
    vat_rate: Decimal,
    vat_category: VatCategory,
    vat_amount: Decimal,
    total_price: Decimal,
}

impl TaskComputation {
    fn taxable_base(&self) -> Decimal {
        self.subtotal + self.margin_amount
    }

    fn check_invariants(&self) -> Result<(), DomainError> {
        if self.margin_rate < margin_protection_min() {
            return Err(DomainError::InvariantViolation(format!(
                "margin rate {} for `{}` is below the protection floor {}",
                self.margin_rate,
                self.task,
                margin_protection_min()
            )));
        }

        let amounts = [
            ("materials_cost", self.materials_cost),
            ("labor_cost", self.labor_cost),
            ("margin_amount", self.margin_amount),
            ("vat_amount", self.vat_amount),
        ];
        for (field, amount) in amounts {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(DomainError::InvariantViolation(format!(
                    "{field} for `{}` is negative ({amount})",
                    self.task
                )));
            }
        }

        Ok(())
    }

    fn into_pricing(self, city_multiplier: Decimal) -> TaskPricing {
        TaskPricing {
            task_name: self.task,
            materials_cost: round_money(self.materials_cost),
            labor_hours: self.labor_hours,
            labor_rate: round_money(self.labor_rate),
            labor_cost: round_money(self.labor_cost),
            skill_level: self.skill_level,
            subtotal: round_money(self.subtotal),
            margin_rate: round_rate(self.margin_rate),
            margin_amount: round_money(self.margin_amount),
            vat_rate: round_rate(self.vat_rate),
            vat_category: self.vat_category,
            vat_amount: round_money(self.vat_amount),
            total_price: round_money(self.total_price * city_multiplier),
            city_multiplier,
            estimated_duration_days: estimated_days(self.labor_hours),
        }
    }
}

/// Single-pass quote pipeline over the providers.
///
/// Each task runs materials, labor, margin and VAT in that order; the city
/// multiplier scales the finished totals. The composer holds no state
/// between calls.
pub struct QuoteComposer<M, L, G, V, C> {
    materials: M,
    labor: L,
    margin: G,
    vat: V,
    cities: C,
    confidence: ConfidencePolicy,
    vat_country: Country,
}

/// Composer wired directly to a loaded set of reference tables.
pub type TableQuoteComposer<'a> = QuoteComposer<
    &'a MaterialTable,
    &'a LaborTable,
    DynamicMarginPolicy,
    &'a VatTable,
    &'a CityTable,
>;

impl<'a> TableQuoteComposer<'a> {
    pub fn from_tables(tables: &'a ReferenceTables) -> Self {
        Self::new(
            &tables.materials,
            &tables.labor,
            DynamicMarginPolicy::default(),
            &tables.vat,
            &tables.cities,
        )
    }
}

impl<M, L, G, V, C> QuoteComposer<M, L, G, V, C> {
    pub fn new(materials: M, labor: L, margin: G, vat: V, cities: C) -> Self {
        Self {
            materials,
            labor,
            margin,
            vat,
            cities,
            confidence: ConfidencePolicy::default(),
            vat_country: Country::France,
        }
    }

    pub fn with_margin<G2>(self, margin: G2) -> QuoteComposer<M, L, G2, V, C> {
        QuoteComposer {
            materials: self.materials,
            labor: self.labor,
            margin,
            vat: self.vat,
            cities: self.cities,
            confidence: self.confidence,
            vat_country: self.vat_country,
        }
    }

    pub fn with_vat_country(mut self, country: Country) -> Self {
        self.vat_country = country;
        self
    }

    pub fn with_confidence_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.confidence = policy;
        self
    }
}

impl<M, L, G, V, C> QuoteComposer<M, L, G, V, C>
where
    M: MaterialCostProvider,
    L: LaborCostProvider,
    G: MarginPolicy,
    V: VatRateProvider,
    C: CityMultiplierProvider,
{
    fn price_task(&self, task: &TaskKind, input: &ParsedInput) -> TaskComputation {
        let tier = input.budget_preference.resolved();

        let materials_cost = self.materials.cost(task, input.room_size, &tier);
        let labor_hours =
            self.labor.labor_hours(task, input.room_size, &input.complexity_factors);
        let labor_rate = self.labor.hourly_rate(&input.location, task);
        let labor_cost = labor_hours * labor_rate;

        let subtotal = materials_cost + labor_cost;
        let margin_rate = self.margin.margin_rate(task, &tier, subtotal);
        let margin_amount = subtotal * margin_rate;

        let vat = self.vat.resolve(task, &self.vat_country, &input.vat_conditions);
        let vat_amount = (subtotal + margin_amount) * vat.rate;

        TaskComputation {
            task: task.clone(),
            materials_cost,
            labor_hours,
            labor_rate,
            labor_cost,
            skill_level: self.labor.skill_level(task),
            subtotal,
            margin_rate,
            margin_amount,
            vat_rate: vat.rate,
            vat_category: vat.category,
            vat_amount,
            total_price: subtotal + margin_amount + vat_amount,
        }
    }

    fn price_tasks(&self, input: &ParsedInput) -> Result<Vec<TaskComputation>, DomainError> {
        input.validate()?;

        input
            .distinct_tasks()
            .iter()
            .map(|task| -> Result<TaskComputation, DomainError> {
                let computation = self.price_task(task, input);
                computation.check_invariants()?;
                debug!(
                    event_name = "pricing.task.priced",
                    task = %task,
                    subtotal = %computation.subtotal,
                    margin_rate = %computation.margin_rate,
                    vat_rate = %computation.vat_rate,
                    total_price = %computation.total_price,
                    "task priced"
                );
                Ok(computation)
            })
            .collect()
    }

    fn confidence_context(&self, input: &ParsedInput) -> ConfidenceContext {
        ConfidenceContext {
            flag_count: input.confidence_flags.len(),
            task_count: input.tasks.len(),
            room_size: input.room_size,
            known_city: self.cities.is_known_city(&input.location),
        }
    }

    pub fn confidence_score(&self, input: &ParsedInput) -> Decimal {
        self.confidence.score(&self.confidence_context(input))
    }

    /// VAT summary over the quote's tasks, using each task's pre-VAT price
    /// (subtotal plus margin) as the taxable base.
    pub fn vat_summary(
        &self,
        input: &ParsedInput,
        country: &Country,
        conditions: &VatConditions,
    ) -> Result<VatSummary, DomainError> {
        let bases: Vec<(TaskKind, Decimal)> = self
            .price_tasks(input)?
            .into_iter()
            .map(|computation| {
                let base = computation.taxable_base();
                (computation.task, base)
            })
            .collect();

        Ok(self.vat.vat_summary_by_tasks(&bases, country, conditions))
    }

    pub fn compose(&self, input: &ParsedInput) -> Result<Quote, DomainError> {
        let computations = self.price_tasks(input)?;
        let city_multiplier = self.cities.city_multiplier(&input.location).unwrap_or(Decimal::ONE);

        let mut total_materials = Decimal::ZERO;
        let mut total_labor = Decimal::ZERO;
        let mut total_vat = Decimal::ZERO;
        let mut total_price = Decimal::ZERO;
        let mut margin_sum = Decimal::ZERO;
        for computation in &computations {
            total_materials += computation.materials_cost;
            total_labor += computation.labor_cost;
            total_vat += computation.vat_amount;
            total_price += computation.total_price;
            margin_sum += computation.margin_rate;
        }

        let average_margin = if computations.is_empty() {
            Decimal::ZERO
        } else {
            round_rate(margin_sum / Decimal::from(computations.len()))
        };

        let summary = PricingSummary {
            total_materials: round_money(total_materials * city_multiplier),
            total_labor: round_money(total_labor * city_multiplier),
            subtotal_before_vat: round_money((total_materials + total_labor) * city_multiplier),
            total_vat: round_money(total_vat * city_multiplier),
            total_price: round_money(total_price * city_multiplier),
            city_multiplier,
            average_margin,
        };

        let zone = ZonePricing {
            tasks: computations
                .into_iter()
                .map(|computation| computation.into_pricing(city_multiplier))
                .collect(),
            zone_total: summary.total_price,
        };

        let mut zones = BTreeMap::new();
        zones.insert(input.room_type.clone(), zone);

        let quote = Quote {
            client_info: ClientInfo {
                location: input.location.clone(),
                budget_preference: input.budget_preference.clone(),
            },
            project_details: ProjectDetails {
                zone: input.room_type.clone(),
                room_size: input.room_size,
                tasks: input.tasks.clone(),
            },
            pricing: QuotePricing { zones, summary },
            confidence_score: self.confidence_score(input),
            confidence_flags: input.confidence_flags.clone(),
        };

        info!(
            event_name = "pricing.quote.composed",
            zone = %quote.project_details.zone,
            location = %quote.client_info.location,
            task_count = quote.zone().map_or(0, |zone| zone.tasks.len()),
            total_price = %quote.pricing.summary.total_price,
            city_multiplier = %city_multiplier,
            confidence_score = %quote.confidence_score,
            confidence_adjustments = ?self.confidence.adjustments(&self.confidence_context(input)),
            "quote composed"
        );

        Ok(quote)
    }
}

impl<M, L, G, V, C> QuoteRuntime for QuoteComposer<M, L, G, V, C>
where
    M: MaterialCostProvider,
    L: LaborCostProvider,
    G: MarginPolicy,
    V: VatRateProvider,
    C: CityMultiplierProvider,
{
    fn compose(&self, input: &ParsedInput) -> Result<Quote, DomainError> {
        QuoteComposer::compose(self, input)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use super::{QuoteComposer, QuoteRuntime};
    use crate::cpq::confidence::{ConfidencePolicy, ConfidenceRule};
    use crate::cpq::margin::{DynamicMarginPolicy, MarginPolicy};
    use crate::domain::budget::BudgetTier;
    use crate::domain::input::ParsedInput;
    use crate::domain::location::Country;
    use crate::domain::tax::{VatCategory, VatConditions};
    use crate::domain::task::TaskKind;
    use crate::errors::DomainError;
    use crate::reference::ReferenceTables;

    fn input(location: &str, room_size: i64, tasks: Vec<TaskKind>) -> ParsedInput {
        ParsedInput {
            location: location.to_string(),
            budget_preference: BudgetTier::Standard,
            room_type: "bathroom".to_string(),
            room_size: Decimal::new(room_size, 0),
            tasks,
            confidence_flags: BTreeSet::new(),
            complexity_factors: Vec::new(),
            vat_conditions: VatConditions::default(),
        }
    }

    #[test]
    fn paris_painting_matches_reference_breakdown() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);

        let quote = composer
            .compose(&input("paris", 10, vec![TaskKind::Painting]))
            .expect("quote should compose");
        let zone = quote.zone().expect("bathroom zone");
        let painting = zone.task(&TaskKind::Painting).expect("painting priced");

        assert_eq!(painting.labor_hours, Decimal::new(81, 1));
        assert_eq!(painting.labor_rate, Decimal::new(45, 0));
        assert_eq!(painting.labor_cost, Decimal::new(3645, 1));
        assert_eq!(painting.materials_cost, Decimal::new(120, 0));
        assert_eq!(painting.subtotal, Decimal::new(4845, 1));
        assert_eq!(painting.margin_rate, Decimal::new(20, 2));
        assert_eq!(painting.margin_amount, Decimal::new(969, 1));
        assert_eq!(painting.vat_rate, Decimal::new(10, 2));
        assert_eq!(painting.vat_category, VatCategory::Reduced);
        assert_eq!(painting.vat_amount, Decimal::new(5814, 2));
        assert_eq!(painting.city_multiplier, Decimal::new(125, 2));
        assert_eq!(painting.total_price, Decimal::new(79943, 2));
        assert_eq!(painting.estimated_duration_days, Decimal::ONE);

        assert_eq!(zone.zone_total, Decimal::new(79943, 2));
        let summary = &quote.pricing.summary;
        assert_eq!(summary.total_materials, Decimal::new(150, 0));
        assert_eq!(summary.total_labor, Decimal::new(45563, 2));
        assert_eq!(summary.subtotal_before_vat, Decimal::new(60563, 2));
        assert_eq!(summary.total_vat, Decimal::new(7268, 2));
        assert_eq!(summary.total_price, Decimal::new(79943, 2));
        assert_eq!(summary.average_margin, Decimal::new(20, 2));
        // one task (-0.10), known city (+0.05)
        assert_eq!(quote.confidence_score, Decimal::new(95, 2));
    }

    #[test]
    fn unknown_task_is_priced_through_fallbacks() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);

        let quote = composer
            .compose(&input("marseille", 6, vec![TaskKind::from("demolition_extra")]))
            .expect("fallbacks never fail");
        let task = quote
            .zone()
            .and_then(|zone| zone.task(&TaskKind::from("demolition_extra")))
            .expect("unknown task priced");

        assert_eq!(task.labor_hours, Decimal::new(12, 0));
        assert_eq!(task.materials_cost, Decimal::new(300, 0));
        assert_eq!(task.vat_category, VatCategory::Standard);
        // (300 + 12 * 35) * 1.2 * 1.2
        assert_eq!(task.total_price, Decimal::new(10368, 1));
    }

    #[test]
    fn empty_task_list_is_a_zero_total_quote() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);

        let quote = composer.compose(&input("paris", 10, Vec::new())).expect("empty quote");
        let zone = quote.zone().expect("zone is still present");

        assert!(zone.tasks.is_empty());
        assert_eq!(zone.zone_total, Decimal::ZERO);
        assert_eq!(quote.pricing.summary.total_price, Decimal::ZERO);
        assert_eq!(quote.pricing.summary.average_margin, Decimal::ZERO);
        assert_eq!(quote.confidence_score, Decimal::new(95, 2));
    }

    #[test]
    fn non_positive_room_size_is_rejected_before_pricing() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);

        let error = composer
            .compose(&input("paris", 0, vec![TaskKind::Painting]))
            .expect_err("zero room size must fail");
        assert_eq!(error, DomainError::InvalidRoomSize { room_size: Decimal::ZERO });
    }

    #[test]
    fn oversized_room_is_rejected_instead_of_overflowing() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);

        let mut request = input("paris", 1, vec![TaskKind::from("demolition_extra")]);
        request.budget_preference = BudgetTier::Premium;
        request.room_size = Decimal::from_i128_with_scale(5 * 10_i128.pow(27), 0);

        let error = composer.compose(&request).expect_err("oversized room must fail");
        assert!(matches!(error, DomainError::RoomSizeTooLarge { .. }));
        assert!(composer.vat_summary(&request, &Country::France, &VatConditions::default()).is_err());
    }

    #[test]
    fn duplicate_tasks_are_priced_once() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);

        let quote = composer
            .compose(&input(
                "lyon",
                8,
                vec![TaskKind::Painting, TaskKind::Plumbing, TaskKind::Painting],
            ))
            .expect("quote");

        let zone = quote.zone().expect("zone");
        let names: Vec<_> = zone.tasks.iter().map(|task| task.task_name.clone()).collect();
        assert_eq!(names, vec![TaskKind::Painting, TaskKind::Plumbing]);
        assert_eq!(quote.project_details.tasks.len(), 3);
    }

    #[test]
    fn unknown_city_uses_neutral_multiplier_and_no_bonus() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);

        let quote = composer
            .compose(&input(
                "Lille",
                10,
                vec![TaskKind::Painting, TaskKind::Plumbing, TaskKind::TileRemoval],
            ))
            .expect("quote");

        assert_eq!(quote.pricing.summary.city_multiplier, Decimal::ONE);
        assert_eq!(quote.confidence_score, Decimal::ONE);
    }

    #[test]
    fn pre_multiplier_total_is_subtotal_with_margin_and_vat() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);
        let tasks = vec![
            TaskKind::TileRemoval,
            TaskKind::Plumbing,
            TaskKind::ToiletReplacement,
            TaskKind::VanityInstallation,
            TaskKind::Painting,
            TaskKind::FloorInstallation,
            TaskKind::GeneralRenovation,
            TaskKind::from("sauna"),
        ];

        for tier in ["budget_conscious", "standard", "premium"] {
            let mut request = input("nice", 17, tasks.clone());
            request.budget_preference = BudgetTier::parse(tier);

            for computation in composer.price_tasks(&request).expect("priced") {
                let expected = computation.subtotal
                    * (Decimal::ONE + computation.margin_rate)
                    * (Decimal::ONE + computation.vat_rate);
                assert_eq!(computation.total_price, expected, "{}", computation.task);
            }

            let quote = composer.compose(&request).expect("quote");
            for task in &quote.zone().expect("zone").tasks {
                assert!(task.margin_rate >= Decimal::new(15, 2));
                assert!(task.total_price >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn configured_vat_country_and_conditions_flow_into_pricing() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables).with_vat_country(Country::Germany);

        let mut request = input("paris", 10, vec![TaskKind::Painting]);
        let quote = composer.compose(&request).expect("quote");
        let painting = quote.zone().and_then(|zone| zone.task(&TaskKind::Painting)).expect("task");
        assert_eq!(painting.vat_rate, Decimal::new(19, 2));

        request.vat_conditions.energy_efficiency = true;
        let quote = composer.compose(&request).expect("quote");
        let painting = quote.zone().and_then(|zone| zone.task(&TaskKind::Painting)).expect("task");
        assert_eq!(painting.vat_rate, Decimal::new(7, 2));
    }

    #[test]
    fn custom_margin_and_confidence_policies_are_injected() {
        struct FlatMargin;

        impl MarginPolicy for FlatMargin {
            fn margin_rate(&self, _: &TaskKind, _: &BudgetTier, _: Decimal) -> Decimal {
                Decimal::new(30, 2)
            }
        }

        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables)
            .with_margin(FlatMargin)
            .with_confidence_policy(ConfidencePolicy::new(vec![ConfidenceRule::KnownCityBonus {
                bonus: Decimal::new(5, 2),
            }]));

        let quote = composer.compose(&input("paris", 10, vec![TaskKind::Painting])).expect("quote");
        assert_eq!(quote.pricing.summary.average_margin, Decimal::new(30, 2));
        assert_eq!(quote.confidence_score, Decimal::ONE);
    }

    #[test]
    fn margin_below_floor_is_an_invariant_violation() {
        struct Underpriced;

        impl MarginPolicy for Underpriced {
            fn margin_rate(&self, _: &TaskKind, _: &BudgetTier, _: Decimal) -> Decimal {
                Decimal::new(5, 2)
            }
        }

        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables).with_margin(Underpriced);

        let error = composer
            .compose(&input("paris", 10, vec![TaskKind::Painting]))
            .expect_err("floor breach must fail");
        assert!(matches!(error, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn base_margin_is_configurable() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables)
            .with_margin(DynamicMarginPolicy::new(Decimal::new(25, 2)));

        let quote = composer.compose(&input("paris", 10, vec![TaskKind::Painting])).expect("quote");
        assert_eq!(quote.pricing.summary.average_margin, Decimal::new(25, 2));
    }

    #[test]
    fn vat_summary_uses_subtotal_plus_margin_as_base() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);

        let summary = composer
            .vat_summary(
                &input("paris", 10, vec![TaskKind::Painting]),
                &Country::France,
                &VatConditions::default(),
            )
            .expect("summary");

        assert_eq!(summary.total_base_amount, Decimal::new(5814, 1));
        assert_eq!(summary.total_vat_amount, Decimal::new(5814, 2));
        assert_eq!(summary.vat_groups.len(), 1);
    }

    #[test]
    fn identical_requests_serialize_identically() {
        let tables = ReferenceTables::builtin();
        let composer = QuoteComposer::from_tables(&tables);
        let runtime: &dyn QuoteRuntime = &composer;
        let request = input(
            "bordeaux",
            12,
            vec![TaskKind::TileRemoval, TaskKind::FloorInstallation, TaskKind::Painting],
        );

        let first = serde_json::to_string(&runtime.compose(&request).expect("quote")).expect("json");
        let second =
            serde_json::to_string(&runtime.compose(&request).expect("quote")).expect("json");
        assert_eq!(first, second);
    }
}
