//! Built-in attribute plan modifiers
//!
//! Plan modifiers run during PlanResourceChange, after defaults have been
//! applied and computed attributes without configuration marked unknown.
//! They can replace the planned value or flag the resource for replacement.

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::types::Dynamic;

fn unchanged(request: PlanModifierRequest) -> PlanModifierResponse {
    PlanModifierResponse {
        plan_value: request.plan_value,
        requires_replace: false,
        diagnostics: vec![],
    }
}

/// Whether a planned value differs from the prior state in a way that is
/// already known. Creation (null state) and unknown plans never count.
fn is_known_change(state: &Dynamic, plan: &Dynamic) -> bool {
    if state.is_null() || !plan.is_fully_known() {
        return false;
    }
    !values_equal(state, plan)
}

/// Marks the resource for replacement when the attribute changes
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "changing this value forces replacement of the resource".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let requires_replace =
            is_known_change(&request.state_value.value, &request.plan_value.value);

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: vec![],
        }
    }
}

/// Marks the resource for replacement when the attribute changes and the
/// predicate over (state, plan) holds
pub struct RequiresReplaceIf<F>
where
    F: Fn(&Dynamic, &Dynamic) -> bool + Send + Sync,
{
    predicate: F,
    description: String,
}

impl<F> RequiresReplaceIf<F>
where
    F: Fn(&Dynamic, &Dynamic) -> bool + Send + Sync,
{
    pub fn new(predicate: F, description: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            predicate,
            description: description.into(),
        })
    }
}

impl<F> PlanModifier for RequiresReplaceIf<F>
where
    F: Fn(&Dynamic, &Dynamic) -> bool + Send + Sync,
{
    fn description(&self) -> String {
        self.description.clone()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let state = &request.state_value.value;
        let plan = &request.plan_value.value;
        let requires_replace = is_known_change(state, plan) && (self.predicate)(state, plan);

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: vec![],
        }
    }
}

/// Copies the prior state value into the plan when the planned value is
/// unknown, so computed values that never change are not shown as
/// "(known after apply)" on every update
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "once set, the value of this attribute in state will not change".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        if !request.plan_value.is_unknown() || request.state_value.is_null() {
            return unchanged(request);
        }

        PlanModifierResponse {
            plan_value: request.state_value,
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}

/// Structural equality treating lists as multisets when element order is
/// the only difference
pub fn values_equal(a: &Dynamic, b: &Dynamic) -> bool {
    match (a, b) {
        (Dynamic::Null, Dynamic::Null) => true,
        (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
        (Dynamic::Number(a), Dynamic::Number(b)) => (a - b).abs() < f64::EPSILON,
        (Dynamic::String(a), Dynamic::String(b)) => a == b,
        (Dynamic::List(a), Dynamic::List(b)) => {
            a.len() == b.len()
                && (a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
                    || same_elements(a, b))
        }
        (Dynamic::Map(a), Dynamic::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|v2| values_equal(v, v2)))
        }
        _ => false,
    }
}

/// Every element of `a` pairs with a distinct equal element of `b`
fn same_elements(a: &[Dynamic], b: &[Dynamic]) -> bool {
    let mut matched = vec![false; b.len()];
    a.iter().all(|x| {
        let found = b
            .iter()
            .enumerate()
            .find(|(i, y)| !matched[*i] && values_equal(x, y))
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                matched[i] = true;
                true
            }
            None => false,
        }
    })
}
