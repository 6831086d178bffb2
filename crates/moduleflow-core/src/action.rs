//! Actions and update records
//!
//! Every change to the store travels as an `Action`. Module handlers are
//! addressed by `"<module>/<method>"` actions whose payload is the argument
//! list; the framework's own updates use the tags defined below.

use crate::errors::{Exception, FrameworkError, FrameworkResult};
use crate::state::Location;
use core::fmt;
use core::marker::PhantomData;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

// ----------------------------------------------------------------------------
// Framework Tags
// ----------------------------------------------------------------------------

/// Carried in `Action::name` by every set-state update; `type` stays free for tracing
pub const SET_STATE_ACTION: &str = "@@framework/setState";
pub const LOADING_ACTION: &str = "@@framework/loading";
pub const NAVIGATION_PREVENTION_ACTION: &str = "@@framework/navigation-prevention";
pub const ERROR_ACTION_TYPE: &str = "@@framework/error";
pub const HISTORY_PUSH_ACTION: &str = "@@router/CALL_HISTORY_METHOD";
pub const LOCATION_CHANGE_ACTION: &str = "@@router/LOCATION_CHANGE";

// ----------------------------------------------------------------------------
// Action
// ----------------------------------------------------------------------------

/// Payload of an action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionPayload {
    /// Argument list of a module handler invocation
    Args(Vec<Value>),
    SetState { module: String, state: Value },
    Loading { identifier: String, show: bool },
    NavigationPrevention { is_prevented: bool },
    HistoryPush { url: String, state: Option<Value> },
    LocationChange { location: Location },
    Error(Exception),
}

/// A dispatched update record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub payload: ActionPayload,
}

impl Action {
    /// Create a handler action carrying an argument list
    pub fn new<T: Into<String>>(action_type: T, args: Vec<Value>) -> Self {
        Self {
            action_type: action_type.into(),
            name: None,
            payload: ActionPayload::Args(args),
        }
    }

    /// Argument list if this is a handler action
    pub fn args(&self) -> Option<&[Value]> {
        match &self.payload {
            ActionPayload::Args(args) => Some(args),
            _ => None,
        }
    }

    pub fn exception(&self) -> Option<&Exception> {
        match &self.payload {
            ActionPayload::Error(exception) => Some(exception),
            _ => None,
        }
    }

    pub fn is_set_state(&self) -> bool {
        self.name.as_deref() == Some(SET_STATE_ACTION)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action_type)
    }
}

/// Set-state update merging `state` into the slice of `module`.
///
/// `tag` becomes the action type; it only matters for tracing, the reducer
/// keys off `name`.
pub fn set_state_action<M: Into<String>, T: Into<String>>(module: M, state: Value, tag: T) -> Action {
    Action {
        action_type: tag.into(),
        name: Some(SET_STATE_ACTION.to_string()),
        payload: ActionPayload::SetState {
            module: module.into(),
            state,
        },
    }
}

pub fn loading_action<I: Into<String>>(show: bool, identifier: I) -> Action {
    Action {
        action_type: LOADING_ACTION.to_string(),
        name: None,
        payload: ActionPayload::Loading {
            identifier: identifier.into(),
            show,
        },
    }
}

pub fn navigation_prevention_action(is_prevented: bool) -> Action {
    Action {
        action_type: NAVIGATION_PREVENTION_ACTION.to_string(),
        name: None,
        payload: ActionPayload::NavigationPrevention { is_prevented },
    }
}

pub fn error_action(exception: Exception) -> Action {
    Action {
        action_type: ERROR_ACTION_TYPE.to_string(),
        name: None,
        payload: ActionPayload::Error(exception),
    }
}

pub fn history_push_action<U: Into<String>>(url: U, state: Option<Value>) -> Action {
    Action {
        action_type: HISTORY_PUSH_ACTION.to_string(),
        name: None,
        payload: ActionPayload::HistoryPush {
            url: url.into(),
            state,
        },
    }
}

pub fn location_change_action(location: Location) -> Action {
    Action {
        action_type: LOCATION_CHANGE_ACTION.to_string(),
        name: None,
        payload: ActionPayload::LocationChange { location },
    }
}

// ----------------------------------------------------------------------------
// Typed Arguments
// ----------------------------------------------------------------------------

/// Argument tuple of a handler, convertible to and from an action payload.
///
/// Missing trailing arguments decode as `null`, so `Option` parameters may be
/// omitted by the caller. Extra arguments are ignored.
pub trait ActionArgs: Sized + Send + 'static {
    fn into_payload(self) -> FrameworkResult<Vec<Value>>;
    fn from_payload(payload: &[Value]) -> FrameworkResult<Self>;
}

impl ActionArgs for () {
    fn into_payload(self) -> FrameworkResult<Vec<Value>> {
        Ok(Vec::new())
    }

    fn from_payload(_payload: &[Value]) -> FrameworkResult<Self> {
        Ok(())
    }
}

macro_rules! impl_action_args {
    ($($ty:ident => $idx:tt),+) => {
        impl<$($ty),+> ActionArgs for ($($ty,)+)
        where
            $($ty: Serialize + DeserializeOwned + Send + 'static),+
        {
            fn into_payload(self) -> FrameworkResult<Vec<Value>> {
                Ok(vec![$(serde_json::to_value(self.$idx)?),+])
            }

            fn from_payload(payload: &[Value]) -> FrameworkResult<Self> {
                Ok(($(
                    serde_json::from_value::<$ty>(payload.get($idx).cloned().unwrap_or(Value::Null))
                        .map_err(|e| FrameworkError::invalid_payload(
                            format!("argument {}", $idx),
                            e.to_string(),
                        ))?,
                )+))
            }
        }
    };
}

impl_action_args!(A => 0);
impl_action_args!(A => 0, B => 1);
impl_action_args!(A => 0, B => 1, C => 2);
impl_action_args!(A => 0, B => 1, C => 2, D => 3);

/// Method name of a module handler together with its argument type
pub struct ActionKey<A> {
    method: &'static str,
    _args: PhantomData<fn(A)>,
}

impl<A> ActionKey<A> {
    pub const fn new(method: &'static str) -> Self {
        Self {
            method,
            _args: PhantomData,
        }
    }

    pub fn method(&self) -> &'static str {
        self.method
    }
}

impl<A> Clone for ActionKey<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for ActionKey<A> {}

impl<A> fmt::Debug for ActionKey<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionKey").field(&self.method).finish()
    }
}
