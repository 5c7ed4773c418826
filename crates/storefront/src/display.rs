//! Shared display state.
//!
//! Flows write their latest result here; a later write simply replaces an earlier
//! one, even when the two flows ran concurrently.

use common::UserId;
use domain::models::{Cart, Order, Profile};
use domain::{Affordances, SessionState};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum CartDisplay {
    /// Anonymous default: prompt to sign in.
    #[default]
    SignIn,
    Cart(Cart),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum OrdersDisplay {
    #[default]
    SignIn,
    List(Vec<Order>),
    /// A single order, as the server last returned it.
    Order(Order),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ProfileDisplay {
    #[default]
    SignIn,
    Profile(Profile),
}

/// What a front end shows right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub affordances: Affordances,
    pub cart: CartDisplay,
    pub orders: OrdersDisplay,
    pub profile: ProfileDisplay,
    /// The outcome message of the last action.
    pub notice: Option<String>,
    /// The user the cart, order and profile displays belong to.
    #[serde(skip)]
    owner: Option<UserId>,
}

impl DisplayState {
    /// Defaults for a signed-out visitor.
    pub fn anonymous() -> Self {
        Self::for_session(&SessionState::Anonymous)
    }

    pub fn for_session(state: &SessionState) -> Self {
        Self {
            affordances: state.affordances(),
            cart: CartDisplay::default(),
            orders: OrdersDisplay::default(),
            profile: ProfileDisplay::default(),
            notice: None,
            owner: state.session().map(|session| session.user_id),
        }
    }

    /// Follows a session transition. Leaving a session, or switching to another
    /// user, resets everything the previous session owned.
    pub fn on_session_change(&mut self, state: &SessionState) {
        let owner = state.session().map(|session| session.user_id);
        if owner.is_some() && owner == self.owner {
            self.affordances = state.affordances();
        } else {
            let notice = self.notice.take();
            *self = Self::for_session(state);
            self.notice = notice;
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::anonymous()
    }
}
