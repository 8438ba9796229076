use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::database::models::analytics::RATING_RANGE;
use crate::database::models::{BusinessId, Tenant};

pub const ACKNOWLEDGE_MESSAGE: &str = "Thank you for your rating!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Rating must be between 1 and 5")]
    OutOfRange(i64),

    #[error("Rating must be a whole number between 1 and 5")]
    NotWhole(String),
}

/// Narrow a client-supplied rating to a star count
pub fn star_rating(raw: i64) -> Result<u8, GateError> {
    u8::try_from(raw)
        .ok()
        .filter(|r| RATING_RANGE.contains(r))
        .ok_or(GateError::OutOfRange(raw))
}

/// Narrow a rating as it arrives in a JSON body: an integer, a
/// whole-valued float such as `3.0`, or a numeric string
pub fn json_rating(raw: &Value) -> Result<u8, GateError> {
    let whole = match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= 1e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    whole.ok_or_else(|| GateError::NotWhole(raw.to_string())).and_then(star_rating)
}

/// Where a visitor goes after choosing a star rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GateDecision {
    /// Satisfied visitor, sent to the public review site
    Redirect { url: String },
    /// Satisfied visitor, but the tenant has no review site configured
    Acknowledge { message: String },
    /// Below the threshold: captured internally and sent to the thank-you page
    ThankYou {
        rating: u8,
        #[serde(rename = "businessNumber")]
        business_number: BusinessId,
        location: String,
    },
}

impl GateDecision {
    /// Whether the rating should be counted as an internal review
    pub fn captures_review(&self) -> bool {
        matches!(self, GateDecision::ThankYou { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GateState {
    Idle,
    Decided,
}

/// Per-visit rating flow. Only the first valid selection counts.
#[derive(Debug, Clone)]
pub struct RatingGate {
    business_number: BusinessId,
    minimum_rating: u8,
    review_url: Option<String>,
    state: GateState,
}

pub fn thank_you_location(rating: u8, business_number: &BusinessId) -> String {
    format!("/thank-you?rating={}&BIS={}", rating, business_number)
}

impl RatingGate {
    pub fn new(business_number: BusinessId, minimum_rating: u8, review_url: Option<String>) -> Self {
        Self {
            business_number,
            minimum_rating,
            review_url: review_url.filter(|url| !url.trim().is_empty()),
            state: GateState::Idle,
        }
    }

    pub fn for_tenant(tenant: &Tenant) -> Self {
        Self::new(tenant.business_number.clone(), tenant.minimum_rating, tenant.review_url.clone())
    }

    pub fn is_decided(&self) -> bool {
        self.state == GateState::Decided
    }

    /// Decide on `rating`. Returns `Ok(None)` once a decision has already
    /// been made; out-of-range ratings are rejected without locking the gate.
    pub fn select(&mut self, rating: u8) -> Result<Option<GateDecision>, GateError> {
        if self.is_decided() {
            return Ok(None);
        }
        if !RATING_RANGE.contains(&rating) {
            return Err(GateError::OutOfRange(rating.into()));
        }
        self.state = GateState::Decided;

        let decision = if rating >= self.minimum_rating {
            match &self.review_url {
                Some(url) => GateDecision::Redirect { url: url.clone() },
                None => GateDecision::Acknowledge {
                    message: ACKNOWLEDGE_MESSAGE.to_string(),
                },
            }
        } else {
            GateDecision::ThankYou {
                rating,
                business_number: self.business_number.clone(),
                location: thank_you_location(rating, &self.business_number),
            }
        };
        Ok(Some(decision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(minimum: u8, url: Option<&str>) -> RatingGate {
        RatingGate::new("BIS00004".parse().unwrap(), minimum, url.map(str::to_string))
    }

    #[test]
    fn at_threshold_redirects_to_review_site() {
        let mut g = gate(4, Some("https://g.page/r/abc"));
        assert_eq!(
            g.select(4).unwrap(),
            Some(GateDecision::Redirect { url: "https://g.page/r/abc".to_string() })
        );
    }

    #[test]
    fn below_threshold_goes_to_thank_you() {
        let mut g = gate(4, Some("https://g.page/r/abc"));
        let decision = g.select(3).unwrap().unwrap();
        assert!(decision.captures_review());
        match decision {
            GateDecision::ThankYou { location, .. } => assert_eq!(location, "/thank-you?rating=3&BIS=BIS00004"),
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn missing_review_url_acknowledges() {
        let mut g = gate(3, Some("   "));
        assert!(matches!(g.select(5).unwrap(), Some(GateDecision::Acknowledge { .. })));
    }

    #[test]
    fn zero_threshold_always_passes() {
        let mut g = gate(0, Some("https://example.com"));
        assert!(!g.select(1).unwrap().unwrap().captures_review());
    }

    #[test]
    fn only_first_selection_counts() {
        let mut g = gate(4, None);
        assert!(g.select(2).unwrap().is_some());
        assert!(g.is_decided());
        assert_eq!(g.select(5).unwrap(), None);
    }

    #[test]
    fn out_of_range_does_not_lock() {
        let mut g = gate(4, None);
        assert_eq!(g.select(0), Err(GateError::OutOfRange(0)));
        assert_eq!(g.select(6), Err(GateError::OutOfRange(6)));
        assert!(!g.is_decided());
        assert!(g.select(5).unwrap().is_some());
    }

    #[test]
    fn star_rating_bounds() {
        assert_eq!(star_rating(1), Ok(1));
        assert_eq!(star_rating(5), Ok(5));
        assert_eq!(star_rating(0), Err(GateError::OutOfRange(0)));
        assert_eq!(star_rating(-3), Err(GateError::OutOfRange(-3)));
        assert_eq!(star_rating(300), Err(GateError::OutOfRange(300)));
    }

    #[test]
    fn json_ratings_accept_whole_numbers_only() {
        use serde_json::json;

        assert_eq!(json_rating(&json!(3)), Ok(3));
        assert_eq!(json_rating(&json!(3.0)), Ok(3));
        assert_eq!(json_rating(&json!("4")), Ok(4));
        assert_eq!(json_rating(&json!(7.0)), Err(GateError::OutOfRange(7)));
        assert!(matches!(json_rating(&json!(2.5)), Err(GateError::NotWhole(_))));
        assert!(matches!(json_rating(&json!("three")), Err(GateError::NotWhole(_))));
        assert!(matches!(json_rating(&json!(true)), Err(GateError::NotWhole(_))));
    }

    #[test]
    fn decisions_serialize_with_action_tag() {
        let json = serde_json::to_value(GateDecision::ThankYou {
            rating: 2,
            business_number: "BIS00004".parse().unwrap(),
            location: thank_you_location(2, &"BIS00004".parse().unwrap()),
        })
        .unwrap();
        assert_eq!(json["action"], "thank_you");
        assert_eq!(json["businessNumber"], "BIS00004");
    }
}
