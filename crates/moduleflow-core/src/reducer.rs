//! Root reducer
//!
//! Applies the framework's update records to `State`. Any other action type
//! leaves the state untouched.

use crate::action::{Action, ActionPayload, LOADING_ACTION, NAVIGATION_PREVENTION_ACTION};
use crate::state::{LoadingState, RouterState, State};
use serde_json::{Map, Value};

/// Apply one action to the root state
pub fn root_reducer(state: &mut State, action: &Action) {
    set_state_reducer(&mut state.app, action);
    loading_reducer(&mut state.loading, action);
    navigation_prevention_reducer(&mut state.navigation_prevented, action);
    router_reducer(&mut state.router, action);
}

/// Shallow merge of a partial state into a module slice
fn set_state_reducer(app: &mut Map<String, Value>, action: &Action) {
    if !action.is_set_state() {
        return;
    }
    let ActionPayload::SetState { module, state } = &action.payload else {
        return;
    };

    let slice = app
        .entry(module.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    match (slice, state) {
        (Value::Object(existing), Value::Object(partial)) => {
            for (key, value) in partial {
                existing.insert(key.clone(), value.clone());
            }
        }
        (slot, replacement) => *slot = replacement.clone(),
    }
}

fn loading_reducer(loading: &mut LoadingState, action: &Action) {
    if action.action_type != LOADING_ACTION {
        return;
    }
    if let ActionPayload::Loading { identifier, show } = &action.payload {
        let count = loading.entry(identifier.clone()).or_insert(0);
        *count += if *show { 1 } else { -1 };
    }
}

fn navigation_prevention_reducer(navigation_prevented: &mut bool, action: &Action) {
    if action.action_type != NAVIGATION_PREVENTION_ACTION {
        return;
    }
    if let ActionPayload::NavigationPrevention { is_prevented } = &action.payload {
        *navigation_prevented = *is_prevented;
    }
}

fn router_reducer(router: &mut RouterState, action: &Action) {
    if let ActionPayload::LocationChange { location } = &action.payload {
        router.location = Some(location.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{
        loading_action, location_change_action, navigation_prevention_action, set_state_action,
    };
    use crate::state::Location;
    use serde_json::json;

    #[test]
    fn test_set_state_merges_shallowly() {
        let mut state = State::default();
        root_reducer(
            &mut state,
            &set_state_action("user", json!({"name": "a", "age": 3}), "@@user/@@init"),
        );
        root_reducer(
            &mut state,
            &set_state_action("user", json!({"age": 4}), "@@user/setState[age]"),
        );

        assert_eq!(state.app["user"], json!({"name": "a", "age": 4}));
    }

    #[test]
    fn test_set_state_leaves_other_modules_untouched() {
        let mut state = State::default();
        root_reducer(&mut state, &set_state_action("a", json!({"x": 1}), "@@a/@@init"));
        root_reducer(&mut state, &set_state_action("b", json!({"y": 2}), "@@b/@@init"));

        assert_eq!(state.app["a"], json!({"x": 1}));
        assert_eq!(state.app["b"], json!({"y": 2}));
    }

    #[test]
    fn test_handler_action_with_module_like_type_is_ignored() {
        let mut state = State::default();
        root_reducer(&mut state, &Action::new("cart/addItem", vec![json!("sku")]));
        assert!(state.app.is_empty());
    }

    #[test]
    fn test_loading_counts_up_and_down() {
        let mut state = State::default();
        root_reducer(&mut state, &loading_action(true, "global"));
        root_reducer(&mut state, &loading_action(true, "global"));
        root_reducer(&mut state, &loading_action(false, "global"));

        assert_eq!(state.loading_count("global"), 1);
        assert_eq!(state.loading_count("table"), 0);
    }

    #[test]
    fn test_navigation_prevention_and_location_change() {
        let mut state = State::default();
        root_reducer(&mut state, &navigation_prevention_action(true));
        assert!(state.navigation_prevented);
        root_reducer(&mut state, &navigation_prevention_action(false));
        assert!(!state.navigation_prevented);

        root_reducer(&mut state, &location_change_action(Location::new("/home")));
        assert_eq!(state.router.location.unwrap().pathname, "/home");
    }
}
